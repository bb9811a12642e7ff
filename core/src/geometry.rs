//! Geometric primitives shared by the shape graph and the trajectory model.

use crate::error::ShapeError;

/// Tolerance used when comparing two coordinates for equality.
pub const GPS_EPSILON: f64 = 1e-7;

pub fn are_close(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() <= epsilon
}

/// Validates a latitude against the study area's permitted range.
///
/// # Errors
/// Returns [`ShapeError::BadLatitude`] if `lat` falls outside `[-84.0, 80.0]`.
pub fn validate_latitude(lat: f64, line: usize) -> Result<(), ShapeError> {
    if lat > 80.0 || lat < -84.0 {
        return Err(ShapeError::BadLatitude { line, lat });
    }
    Ok(())
}

/// Validates a longitude against the study area's permitted range.
///
/// # Errors
/// Returns [`ShapeError::BadLongitude`] if `lon` falls outside `(-180.0, 180.0)`.
pub fn validate_longitude(lon: f64, line: usize) -> Result<(), ShapeError> {
    if lon >= 180.0 || lon <= -180.0 {
        return Err(ShapeError::BadLongitude { line, lon });
    }
    Ok(())
}

/// A bare geographic coordinate. Validity is enforced at the codec's entry
/// points, not here: a `Point` is also used as a plain math value once its
/// coordinates are already known good (e.g. an edge endpoint).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
}

impl Point {
    #[must_use]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    #[must_use]
    pub fn approx_eq(&self, other: &Point) -> bool {
        are_close(self.lat, other.lat, GPS_EPSILON) && are_close(self.lon, other.lon, GPS_EPSILON)
    }
}

/// A south-west / north-east bounding rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub sw: Point,
    pub ne: Point,
}

impl Bounds {
    #[must_use]
    pub fn new(sw: Point, ne: Point) -> Self {
        Self { sw, ne }
    }
}

/// A circular exclusion or inclusion zone used by the privacy passes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub uid: u64,
    pub radius_m: f64,
}

impl Circle {
    /// # Errors
    /// Returns [`ShapeError::BadRadius`] if `radius_m` is negative.
    pub fn new(center: Point, uid: u64, radius_m: f64, line: usize) -> Result<Self, ShapeError> {
        if radius_m < 0.0 {
            return Err(ShapeError::BadRadius {
                line,
                radius: radius_m,
            });
        }
        Ok(Self {
            center,
            uid,
            radius_m,
        })
    }
}

/// An immutable cell of the study-area grid, addressed by `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub bounds: Bounds,
    pub row: u32,
    pub col: u32,
}

impl Grid {
    #[must_use]
    pub fn new(bounds: Bounds, row: u32, col: u32) -> Self {
        Self { bounds, row, col }
    }
}

/// Road classification attached to an explicit edge.
///
/// The canonical name is the lowercase string used both as the `way_type`
/// attribute value on ingest and the name written back out; an unrecognized
/// attribute value falls back to [`Highway::Other`], and an unrecognized
/// enumerator (there should be none) falls back to the literal `"unknown"`
/// on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Highway {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Unclassified,
    #[default]
    Other,
}

impl Highway {
    /// Looks up a highway class from its lowercase `way_type` name,
    /// falling back to [`Highway::Other`] for anything unrecognized.
    #[must_use]
    pub fn from_way_type(name: &str) -> Self {
        match name {
            "motorway" => Highway::Motorway,
            "trunk" => Highway::Trunk,
            "primary" => Highway::Primary,
            "secondary" => Highway::Secondary,
            "tertiary" => Highway::Tertiary,
            "residential" => Highway::Residential,
            "service" => Highway::Service,
            "unclassified" => Highway::Unclassified,
            _ => Highway::Other,
        }
    }

    /// The name written back out for the `way_type` attribute.
    ///
    /// `Other` is a recognized enumerator, so it writes `"other"`; the
    /// `"unknown"` literal is reserved for an enumerator absent from this
    /// match altogether (kept for parity with the reverse-map lookup in the
    /// source implementation, which falls back to `"unknown"` on a failed
    /// lookup rather than on the `OTHER` value specifically).
    #[must_use]
    pub fn way_type_name(self) -> &'static str {
        match self {
            Highway::Motorway => "motorway",
            Highway::Trunk => "trunk",
            Highway::Primary => "primary",
            Highway::Secondary => "secondary",
            Highway::Tertiary => "tertiary",
            Highway::Residential => "residential",
            Highway::Service => "service",
            Highway::Unclassified => "unclassified",
            Highway::Other => "other",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitude_bounds() {
        assert!(validate_latitude(80.0, 1).is_ok());
        assert!(validate_latitude(-84.0, 1).is_ok());
        assert!(validate_latitude(80.0001, 1).is_err());
        assert!(validate_latitude(-84.0001, 1).is_err());
    }

    #[test]
    fn longitude_bounds() {
        assert!(validate_longitude(179.9999, 1).is_ok());
        assert!(validate_longitude(-179.9999, 1).is_ok());
        assert!(validate_longitude(180.0, 1).is_err());
        assert!(validate_longitude(-180.0, 1).is_err());
    }

    #[test]
    fn unknown_way_type_falls_back_to_other() {
        assert_eq!(Highway::from_way_type("cowpath"), Highway::Other);
        assert_eq!(Highway::from_way_type("residential"), Highway::Residential);
    }
}
