//! Trip CSV ingest/emit and multi-trip splitting.

pub mod codec;
pub mod columns;
pub mod splitter;

pub use codec::{read_all, read_window, write_trajectory};
pub use columns::{FieldNames, TripColumns};
pub use splitter::{TripExtent, TripSplitter, compose_uid};
