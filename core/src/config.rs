//! The configuration record consumed by the (external) de-identification
//! passes, grounded on `DIConfig`.
//!
//! The source models configuration as a class with a setter and getter per
//! field, mutated in place by the desktop binding. That surface is a
//! historical accident of how the desktop shell wires options in one at a
//! time; a single validated, immutable record is a better fit once
//! construction and use are no longer interleaved. [`SanitizerConfigBuilder`]
//! keeps the familiar per-field setter names as a builder so call sites
//! assembling a config from, say, parsed CLI flags read the same way the
//! source's setter calls did.

use crate::error::ConfigError;
use crate::geometry::{Bounds, Point};

/// Immutable, validated configuration for a de-identification run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SanitizerConfig {
    pub lat_field: String,
    pub lon_field: String,
    pub heading_field: String,
    pub speed_field: String,
    pub gentime_field: String,
    pub uid_fields: String,

    pub quad_sw: (f64, f64),
    pub quad_ne: (f64, f64),

    pub plot_kml: bool,

    pub fit_ext: f64,
    pub scale_map_fit: bool,
    pub map_fit_scale: f64,
    pub n_heading_groups: u32,
    pub min_edge_trip_points: u32,

    pub ta_max_q_size: u32,
    pub ta_area_width: f64,
    pub ta_max_speed: f64,
    pub ta_heading_delta: f64,

    pub stop_max_time: f64,
    pub stop_min_distance: f64,
    pub stop_max_speed: f64,

    pub min_direct_distance: f64,
    pub max_direct_distance: f64,
    pub min_manhattan_distance: f64,
    pub max_manhattan_distance: f64,

    pub min_out_degree: u32,
    pub max_out_degree: u32,

    pub rand_direct_distance: f64,
    pub rand_manhattan_distance: f64,
    pub rand_out_degree: f64,
}

impl SanitizerConfig {
    #[must_use]
    pub fn quad_bounds(&self) -> Bounds {
        Bounds::new(
            Point::new(self.quad_sw.0, self.quad_sw.1),
            Point::new(self.quad_ne.0, self.quad_ne.1),
        )
    }

    #[must_use]
    pub fn builder() -> SanitizerConfigBuilder {
        SanitizerConfigBuilder::default()
    }

    /// Serializes this configuration as a JSON snapshot, e.g. for logging
    /// the exact parameters a run used alongside its output.
    ///
    /// # Errors
    /// Returns an error if serialization fails (it cannot, for this type,
    /// but the signature stays fallible to match `serde_json`'s API).
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parses a configuration previously written by [`to_json`](Self::to_json).
    ///
    /// # Errors
    /// Returns an error if `json` is not a valid `SanitizerConfig` document.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Default for SanitizerConfig {
    /// Defaults taken from `DIConfig`'s field initializers, originally
    /// tuned against the Ann Arbor Safety Pilot dataset's column names and
    /// study-area bounding box.
    fn default() -> Self {
        Self {
            lat_field: "Latitude".to_string(),
            lon_field: "Longitude".to_string(),
            heading_field: "Heading".to_string(),
            speed_field: "Speed".to_string(),
            gentime_field: "Gentime".to_string(),
            uid_fields: "RxDevice,FileId".to_string(),

            quad_sw: (42.17, -83.91),
            quad_ne: (42.431, -83.54),

            plot_kml: false,

            fit_ext: 5.0,
            scale_map_fit: false,
            map_fit_scale: 1.0,
            n_heading_groups: 36,
            min_edge_trip_points: 50,

            ta_max_q_size: 20,
            ta_area_width: 30.0,
            ta_max_speed: 15.0,
            ta_heading_delta: 90.0,

            stop_max_time: 120.0,
            stop_min_distance: 15.0,
            stop_max_speed: 3.0,

            min_direct_distance: 500.0,
            max_direct_distance: 2500.0,
            min_manhattan_distance: 650.0,
            max_manhattan_distance: 3000.0,

            min_out_degree: 8,
            max_out_degree: 16,

            rand_direct_distance: 0.0,
            rand_manhattan_distance: 0.0,
            rand_out_degree: 0.0,
        }
    }
}

/// Builds a [`SanitizerConfig`], validating cross-field invariants at
/// [`build`](SanitizerConfigBuilder::build) time rather than on every
/// individual setter call.
#[derive(Debug, Clone)]
pub struct SanitizerConfigBuilder {
    config: SanitizerConfig,
}

impl Default for SanitizerConfigBuilder {
    fn default() -> Self {
        Self {
            config: SanitizerConfig::default(),
        }
    }
}

macro_rules! field_setter {
    ($name:ident: $ty:ty) => {
        #[must_use]
        pub fn $name(mut self, value: $ty) -> Self {
            self.config.$name = value;
            self
        }
    };
}

impl SanitizerConfigBuilder {
    field_setter!(lat_field: String);
    field_setter!(lon_field: String);
    field_setter!(heading_field: String);
    field_setter!(speed_field: String);
    field_setter!(gentime_field: String);
    field_setter!(uid_fields: String);
    field_setter!(plot_kml: bool);
    field_setter!(fit_ext: f64);
    field_setter!(scale_map_fit: bool);
    field_setter!(map_fit_scale: f64);
    field_setter!(n_heading_groups: u32);
    field_setter!(min_edge_trip_points: u32);
    field_setter!(ta_max_q_size: u32);
    field_setter!(ta_area_width: f64);
    field_setter!(ta_max_speed: f64);
    field_setter!(ta_heading_delta: f64);
    field_setter!(stop_max_time: f64);
    field_setter!(stop_min_distance: f64);
    field_setter!(stop_max_speed: f64);
    field_setter!(min_out_degree: u32);
    field_setter!(max_out_degree: u32);
    field_setter!(rand_direct_distance: f64);
    field_setter!(rand_manhattan_distance: f64);
    field_setter!(rand_out_degree: f64);

    #[must_use]
    pub fn quad_sw(mut self, lat: f64, lon: f64) -> Self {
        self.config.quad_sw = (lat, lon);
        self
    }

    #[must_use]
    pub fn quad_ne(mut self, lat: f64, lon: f64) -> Self {
        self.config.quad_ne = (lat, lon);
        self
    }

    #[must_use]
    pub fn direct_distance_range(mut self, min: f64, max: f64) -> Self {
        self.config.min_direct_distance = min;
        self.config.max_direct_distance = max;
        self
    }

    #[must_use]
    pub fn manhattan_distance_range(mut self, min: f64, max: f64) -> Self {
        self.config.min_manhattan_distance = min;
        self.config.max_manhattan_distance = max;
        self
    }

    /// # Errors
    /// Returns the first [`ConfigError`] found: an inverted min/max range,
    /// a negative distance, or a non-positive heading-group count.
    pub fn build(self) -> Result<SanitizerConfig, ConfigError> {
        let c = &self.config;

        check_range("direct_distance", c.min_direct_distance, c.max_direct_distance)?;
        check_range(
            "manhattan_distance",
            c.min_manhattan_distance,
            c.max_manhattan_distance,
        )?;
        check_range(
            "out_degree",
            f64::from(c.min_out_degree),
            f64::from(c.max_out_degree),
        )?;

        check_non_negative("fit_ext", c.fit_ext)?;
        check_non_negative("ta_area_width", c.ta_area_width)?;
        check_non_negative("stop_min_distance", c.stop_min_distance)?;

        if c.n_heading_groups == 0 {
            return Err(ConfigError::NotPositive {
                field: "n_heading_groups",
                value: c.n_heading_groups,
            });
        }

        Ok(self.config)
    }
}

fn check_range(field: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min > max {
        return Err(ConfigError::InvertedRange { field, min, max });
    }
    Ok(())
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_implementation() {
        let config = SanitizerConfig::default();
        assert_eq!(config.uid_fields, "RxDevice,FileId");
        assert_eq!(config.quad_sw, (42.17, -83.91));
        assert_eq!(config.n_heading_groups, 36);
        assert_eq!(config.min_out_degree, 8);
        assert_eq!(config.max_out_degree, 16);
    }

    #[test]
    fn builder_round_trips_custom_values() {
        let config = SanitizerConfig::builder()
            .lat_field("lat".to_string())
            .direct_distance_range(100.0, 200.0)
            .build()
            .unwrap();
        assert_eq!(config.lat_field, "lat");
        assert_eq!(config.min_direct_distance, 100.0);
        assert_eq!(config.max_direct_distance, 200.0);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = SanitizerConfig::builder()
            .direct_distance_range(500.0, 100.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvertedRange { .. }));
    }

    #[test]
    fn zero_heading_groups_is_rejected() {
        let err = SanitizerConfig::builder()
            .n_heading_groups(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { .. }));
    }
}
