//! Header-driven column resolution for trip files, grounded on
//! `CSVFactory::map_index_fields`.

use crate::error::TripError;

/// Names of the five logical fields the trip codec must be able to locate
/// in a trip file's header.
#[derive(Debug, Clone)]
pub struct FieldNames {
    pub lat: String,
    pub lon: String,
    pub heading: String,
    pub speed: String,
    pub gentime: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            lat: "Latitude".to_string(),
            lon: "Longitude".to_string(),
            heading: "Heading".to_string(),
            speed: "Speed".to_string(),
            gentime: "Gentime".to_string(),
        }
    }
}

/// Header names of the optional columns, matching `CSVFactory`'s
/// `TX_DEV`/`TX_RANDOM`/`MSG_COUNT`/`DSECONDS`/`ELEVATION`/`AX`/`AY`/`AZ`/
/// `YAW_RATE`/`PATH_COUNT`/`RADIUS_OF_CURVE`/`CONFIDENCE` indices. Unlike
/// the five required fields, these are not configurable per call: the
/// source only parameterizes the required field names and looks up the
/// optional ones by their fixed header spelling.
const OPTIONAL_FIELDS: [&str; 12] = [
    "TxDevice",
    "TxRandom",
    "MsgCount",
    "DSecond",
    "Elevation",
    "Ax",
    "Ay",
    "Az",
    "Yawrate",
    "PathCount",
    "RadiusOfCurve",
    "Confidence",
];

/// Resolves the five required logical fields, plus whichever optional
/// columns are present, to column indices within a trip file's header.
/// Failure to locate a required field is fatal: the file cannot be
/// processed without knowing where its coordinates live. An absent
/// optional column is not an error; its index is left `None`, a sentinel
/// meaning "not present in this file".
#[derive(Debug, Clone)]
pub struct TripColumns {
    pub(crate) header: Vec<String>,
    pub(crate) lat: usize,
    pub(crate) lon: usize,
    pub(crate) heading: usize,
    pub(crate) speed: usize,
    pub(crate) gentime: usize,
    pub(crate) tx_device: Option<usize>,
    pub(crate) tx_random: Option<usize>,
    pub(crate) msg_count: Option<usize>,
    pub(crate) dsecond: Option<usize>,
    pub(crate) elevation: Option<usize>,
    pub(crate) ax: Option<usize>,
    pub(crate) ay: Option<usize>,
    pub(crate) az: Option<usize>,
    pub(crate) yawrate: Option<usize>,
    pub(crate) path_count: Option<usize>,
    pub(crate) radius_of_curve: Option<usize>,
    pub(crate) confidence: Option<usize>,
}

impl TripColumns {
    /// # Errors
    /// Returns [`TripError::MissingField`] naming the first required field
    /// that cannot be found in `header`.
    pub fn resolve(header: &str, fields: &FieldNames) -> Result<Self, TripError> {
        let columns: Vec<String> = header.split(',').map(str::trim).map(str::to_string).collect();
        let find = |name: &str| -> Result<usize, TripError> {
            columns
                .iter()
                .position(|c| c == name)
                .ok_or_else(|| TripError::MissingField(name.to_string()))
        };
        let find_optional = |name: &str| columns.iter().position(|c| c == name);
        Ok(Self {
            lat: find(&fields.lat)?,
            lon: find(&fields.lon)?,
            heading: find(&fields.heading)?,
            speed: find(&fields.speed)?,
            gentime: find(&fields.gentime)?,
            tx_device: find_optional(OPTIONAL_FIELDS[0]),
            tx_random: find_optional(OPTIONAL_FIELDS[1]),
            msg_count: find_optional(OPTIONAL_FIELDS[2]),
            dsecond: find_optional(OPTIONAL_FIELDS[3]),
            elevation: find_optional(OPTIONAL_FIELDS[4]),
            ax: find_optional(OPTIONAL_FIELDS[5]),
            ay: find_optional(OPTIONAL_FIELDS[6]),
            az: find_optional(OPTIONAL_FIELDS[7]),
            yawrate: find_optional(OPTIONAL_FIELDS[8]),
            path_count: find_optional(OPTIONAL_FIELDS[9]),
            radius_of_curve: find_optional(OPTIONAL_FIELDS[10]),
            confidence: find_optional(OPTIONAL_FIELDS[11]),
            header: columns,
        })
    }

    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }
}
