//! The trajectory model: an ordered sequence of trip fixes and the
//! half-open intervals computed over them.

use std::collections::{BTreeSet, HashMap};

/// A single GPS fix from a trip file.
///
/// The five fields below are required and therefore parsed eagerly and
/// typed; a file missing any of them cannot be processed at all. The
/// twelve fields after them are optional per `CSVFactory`'s column table
/// (`TX_DEV`, `TX_RANDOM`, `MSG_COUNT`, `DSECONDS`, `ELEVATION`, `AX`,
/// `AY`, `AZ`, `YAW_RATE`, `PATH_COUNT`, `RADIUS_OF_CURVE`, `CONFIDENCE`):
/// when their column is absent from the header, or its token is missing or
/// unparseable on a given record, the field is left at its type's default
/// rather than failing the record. Every column is additionally preserved
/// verbatim in `raw` so that a trajectory can be re-emitted with an output
/// header different from its input header without losing data the caller
/// never asked to change.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPoint {
    pub gentime: f64,
    pub lat: f64,
    pub lon: f64,
    pub heading: f64,
    pub speed: f64,

    pub tx_device: u64,
    pub tx_random: u64,
    pub msg_count: u32,
    pub dsecond: i32,
    pub elevation: f64,
    pub ax: f64,
    pub ay: f64,
    pub az: f64,
    pub yawrate: f64,
    pub path_count: u32,
    pub radius_of_curve: f64,
    pub confidence: u32,

    pub raw: HashMap<String, String>,
}

impl TripPoint {
    #[must_use]
    pub fn new(gentime: f64, lat: f64, lon: f64, heading: f64, speed: f64) -> Self {
        Self {
            gentime,
            lat,
            lon,
            heading,
            speed,
            tx_device: 0,
            tx_random: 0,
            msg_count: 0,
            dsecond: 0,
            elevation: 0.0,
            ax: 0.0,
            ay: 0.0,
            az: 0.0,
            yawrate: 0.0,
            path_count: 0,
            radius_of_curve: 0.0,
            confidence: 0,
            raw: HashMap::new(),
        }
    }
}

/// An append-only, positionally-indexed sequence of trip fixes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<TripPoint>,
}

impl Trajectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, point: TripPoint) {
        self.points.push(point);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&TripPoint> {
        self.points.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripPoint> {
        self.points.iter()
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TripPoint;
    type IntoIter = std::slice::Iter<'a, TripPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// A half-open index range `[left, right)` over a [`Trajectory`], tagged
/// with an id and an optional set of auxiliary labels.
///
/// Aux tokens are kept in a [`BTreeSet`] rather than a hash set so
/// [`Interval::aux_str`] always emits them in a deterministic,
/// lexicographically sorted order without needing a separate sort step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub id: u64,
    pub left: usize,
    pub right: usize,
    pub aux: BTreeSet<String>,
}

impl Interval {
    #[must_use]
    pub fn new(id: u64, left: usize, right: usize) -> Self {
        Self {
            id,
            left,
            right,
            aux: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_aux(id: u64, left: usize, right: usize, aux: BTreeSet<String>) -> Self {
        Self {
            id,
            left,
            right,
            aux,
        }
    }

    /// Joins the aux tokens with `;`, producing an empty string when there
    /// are none.
    #[must_use]
    pub fn aux_str(&self) -> String {
        self.aux.iter().cloned().collect::<Vec<_>>().join(";")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aux_str_is_sorted_and_joined() {
        let mut aux = BTreeSet::new();
        aux.insert("work".to_string());
        aux.insert("home".to_string());
        let interval = Interval::with_aux(3, 100, 250, aux);
        assert_eq!(interval.aux_str(), "home;work");
    }

    #[test]
    fn empty_aux_str_is_empty() {
        let interval = Interval::new(1, 0, 10);
        assert_eq!(interval.aux_str(), "");
    }
}
