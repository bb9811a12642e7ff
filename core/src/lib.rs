//! Shape graph and trajectory codecs for de-identifying vehicle trip data.
//!
//! This crate covers the geometric and I/O core shared by the batch
//! de-identification tool and its desktop front end: parsing a road-graph
//! shape file into a [`graph::ShapeRegistry`], reading and writing
//! trajectory CSV files, splitting a multi-trip file into per-trip byte
//! extents, and the configuration record the numerical passes consume.
//! Those numerical passes (map-fitting, turnaround detection, stop
//! detection, privacy-interval selection) live outside this crate.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod shape;
pub mod trajectory;
pub mod trip;

pub use config::SanitizerConfig;
pub use diagnostics::{Diagnostic, DiagnosticSink};
pub use graph::ShapeRegistry;
pub use trajectory::{Interval, Trajectory, TripPoint};
