use thiserror::Error;

/// Failures raised while loading or emitting a shape file.
///
/// Most variants are recoverable: the parser reports them on a
/// [`crate::diagnostics::DiagnosticSink`] and continues with the next line
/// rather than aborting the whole file. [`ShapeError::Io`] and
/// [`ShapeError::MissingHeader`] are the only fatal ones.
#[derive(Error, Debug)]
pub enum ShapeError {
    #[error("could not open shape file: {0}")]
    Io(#[from] std::io::Error),

    #[error("shape file missing header")]
    MissingHeader,

    #[error("line {line}: wrong field count ({found}; expected 3 or 4)")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: insufficient components to create a {kind}: {found}; requires 3")]
    TooFewComponents {
        line: usize,
        kind: &'static str,
        found: usize,
    },

    #[error("line {line}: too many or too few points to define an edge: {found}")]
    WrongPointCount { line: usize, found: usize },

    #[error("line {line}: too many or too few elements to define a point: {found}")]
    WrongPointFieldCount { line: usize, found: usize },

    #[error("line {line}: geo::Grid missing row/col fields")]
    GridMissingRowCol { line: usize },

    #[error("line {line}: geo::Grid missing bounds data")]
    GridMissingBounds { line: usize },

    #[error("line {line}: interval missing right/left fields")]
    IntervalMissingFields { line: usize },

    #[error("line {line}: bad latitude: {lat}")]
    BadLatitude { line: usize, lat: f64 },

    #[error("line {line}: bad longitude: {lon}")]
    BadLongitude { line: usize, lon: f64 },

    #[error("line {line}: bad radius: {radius}")]
    BadRadius { line: usize, radius: f64 },

    #[error("line {line}: the identifiers for the edge's points are the same")]
    DuplicateEdgeEndpoint { line: usize },

    #[error("line {line}: could not parse {field} as a number: {source}")]
    BadNumber {
        line: usize,
        field: &'static str,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("line {line}: could not parse {field} as an integer: {source}")]
    BadInteger {
        line: usize,
        field: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Failures raised while reading or writing trip (trajectory) CSV records.
#[derive(Error, Debug)]
pub enum TripError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("trip header is missing required field: {0}")]
    MissingField(String),

    #[error("line {line}: could not parse field {field}: {source}")]
    BadNumber {
        line: usize,
        field: &'static str,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("line {line}: could not parse field {field}: {source}")]
    BadInteger {
        line: usize,
        field: &'static str,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("requested window [{start}, {end}] starts past end of file")]
    WindowOutOfRange { start: u64, end: u64 },
}

/// Failures raised while configuring or running the trip splitter.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("header is missing requested uid field: {0}")]
    InvalidFields(String),

    #[error("splitter requires a non-empty header")]
    EmptyHeader,
}

/// Failures raised while validating a [`crate::config::SanitizerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field}: min ({min}) must not exceed max ({max})")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: u32 },
}
