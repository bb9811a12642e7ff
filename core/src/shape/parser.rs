//! Shape file ingest: turns the line-oriented shape CSV into a
//! [`ShapeRegistry`].
//!
//! Grounded on `CSVInputFactory` (`make_edge`, `make_circle`, `make_grid`,
//! `make_critical_interval`, `make_privacy_interval`, `make_shapes`): each
//! shape is parsed independently, and a failure on one line is reported and
//! skipped rather than aborting the file. The only fatal failures are an
//! unreadable file and a missing header.

use std::collections::BTreeSet;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::ShapeError;
use crate::geometry::{Circle, Grid, Highway, Point, validate_latitude, validate_longitude};
use crate::graph::{Edge, ShapeRegistry};
use crate::trajectory::Interval;

/// Parses a shape file from `path` into a fresh [`ShapeRegistry`].
///
/// # Errors
/// Returns [`ShapeError::Io`] if the file cannot be opened, or
/// [`ShapeError::MissingHeader`] if it is empty. Per-line failures are
/// reported to `sink` and do not abort the parse.
pub fn load(path: impl AsRef<Path>, sink: &dyn DiagnosticSink) -> Result<ShapeRegistry, ShapeError> {
    let file = std::fs::File::open(path)?;
    load_from_reader(file, sink)
}

/// Parses a shape file from an arbitrary reader. See [`load`].
///
/// # Errors
/// Returns [`ShapeError::MissingHeader`] if the stream has no first line.
pub fn load_from_reader<R: Read>(
    reader: R,
    sink: &dyn DiagnosticSink,
) -> Result<ShapeRegistry, ShapeError> {
    let mut lines = BufReader::new(reader).lines();

    // Header is required but its contents are not otherwise validated; the
    // shape format's columns are fixed and carry no field-name mapping.
    lines.next().ok_or(ShapeError::MissingHeader)??;

    let mut registry = ShapeRegistry::new();

    for (offset, line) in lines.enumerate() {
        let line_no = offset + 2; // 1 for the header, 1 for 1-based counting.
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 3 || parts.len() > 4 {
            sink.record(Diagnostic::new(
                line_no,
                format!(
                    "too few or too many elements in shape specification: {} fields",
                    parts.len()
                ),
            ));
            continue;
        }

        let result = match parts[0] {
            "circle" => make_circle(&mut registry, &parts, line_no),
            "edge" => make_edge(&mut registry, &parts, line_no),
            "implicit_edge" => make_implicit_edge(&mut registry, &parts, line_no),
            "grid" => make_grid(&mut registry, &parts, line_no),
            "critical_interval" => {
                make_interval(&parts, line_no).map(|i| registry.critical_intervals.push(i))
            }
            "privacy_interval" => {
                make_interval(&parts, line_no).map(|i| registry.privacy_intervals.push(i))
            }
            _ => Ok(()), // unrecognized type: silently skipped.
        };

        if let Err(e) = result {
            sink.record(Diagnostic::new(line_no, format!("failed to make shape: {e}")));
        }
    }

    Ok(registry)
}

fn parse_u64(s: &str, line: usize, field: &'static str) -> Result<u64, ShapeError> {
    s.parse().map_err(|source| ShapeError::BadInteger { line, field, source })
}

fn parse_f64(s: &str, line: usize, field: &'static str) -> Result<f64, ShapeError> {
    s.parse().map_err(|source| ShapeError::BadNumber { line, field, source })
}

fn parse_point_triple(s: &str, line: usize) -> Result<(u64, Point), ShapeError> {
    let fields: Vec<&str> = s.split(';').collect();
    if fields.len() != 3 {
        return Err(ShapeError::WrongPointFieldCount {
            line,
            found: fields.len(),
        });
    }
    let uid = parse_u64(fields[0], line, "point uid")?;
    let lat = parse_f64(fields[1], line, "point lat")?;
    let lon = parse_f64(fields[2], line, "point lon")?;
    Ok((uid, Point::new(lat, lon)))
}

/// way_type=<name>:way_id=<uid> — only `way_type` is interpreted; any other
/// key is accepted and ignored (it round-trips through `way_id` on write,
/// which is derived from the edge uid rather than stored).
fn parse_way_type(attrs: &str) -> Highway {
    for kv in attrs.split(':') {
        let Some((key, value)) = kv.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            continue;
        }
        if key == "way_type" {
            return Highway::from_way_type(&value.to_lowercase());
        }
    }
    Highway::Other
}

fn make_circle(registry: &mut ShapeRegistry, parts: &[&str], line: usize) -> Result<(), ShapeError> {
    let uid = parse_u64(parts[1], line, "circle uid")?;
    let fields: Vec<&str> = parts[2].split(':').collect();
    if fields.len() != 3 {
        return Err(ShapeError::WrongPointFieldCount {
            line,
            found: fields.len(),
        });
    }
    let lat = parse_f64(fields[0], line, "circle lat")?;
    validate_latitude(lat, line)?;
    let lon = parse_f64(fields[1], line, "circle lon")?;
    validate_longitude(lon, line)?;
    let radius = parse_f64(fields[2], line, "circle radius")?;
    let circle = Circle::new(Point::new(lat, lon), uid, radius, line)?;
    registry.circles.push(circle);
    Ok(())
}

fn make_edge(registry: &mut ShapeRegistry, parts: &[&str], line: usize) -> Result<(), ShapeError> {
    let way_type = if parts.len() > 3 {
        parse_way_type(parts[3])
    } else {
        Highway::Other
    };

    let edge_id = parse_u64(parts[1], line, "edge uid")?;
    let geo_parts: Vec<&str> = parts[2].split(':').collect();
    if geo_parts.len() != 2 {
        return Err(ShapeError::WrongPointCount {
            line,
            found: geo_parts.len(),
        });
    }

    let mut endpoints = [None, None];
    for (i, geo) in geo_parts.iter().enumerate() {
        let (uid, point) = parse_point_triple(geo, line)?;
        let id = if let Some(existing_id) = registry.vertex_uid(uid) {
            let existing = registry.vertex(existing_id).point;
            if !existing.approx_eq(&point) {
                tracing::warn!(uid, "identical vertex id with different coordinates");
            }
            existing_id
        } else {
            validate_latitude(point.lat, line)?;
            validate_longitude(point.lon, line)?;
            registry.intern_vertex(uid, point).0
        };
        endpoints[i] = Some(id);
    }
    let (v1, v2) = (endpoints[0].unwrap(), endpoints[1].unwrap());

    if registry.vertex(v1).uid == registry.vertex(v2).uid {
        return Err(ShapeError::DuplicateEdgeEndpoint { line });
    }

    registry.push_edge(Edge {
        v1,
        v2,
        uid: edge_id,
        way_type,
        explicit: true,
    });
    Ok(())
}

fn make_implicit_edge(
    registry: &mut ShapeRegistry,
    parts: &[&str],
    line: usize,
) -> Result<(), ShapeError> {
    let edge_id = parse_u64(parts[1], line, "edge uid")?;
    let geo_parts: Vec<&str> = parts[2].split(':').collect();
    if geo_parts.len() != 2 {
        return Err(ShapeError::WrongPointCount {
            line,
            found: geo_parts.len(),
        });
    }

    let mut endpoints = [None, None];
    for (i, geo) in geo_parts.iter().enumerate() {
        let (uid, point) = parse_point_triple(geo, line)?;
        let id = if let Some(existing_id) = registry.implicit_vertex_uid(uid) {
            existing_id
        } else {
            validate_latitude(point.lat, line)?;
            validate_longitude(point.lon, line)?;
            registry.intern_implicit_vertex(uid, point).0
        };
        endpoints[i] = Some(id);
    }
    let (v1, v2) = (endpoints[0].unwrap(), endpoints[1].unwrap());

    registry.push_implicit_edge(Edge {
        v1,
        v2,
        uid: edge_id,
        way_type: Highway::Other,
        explicit: false,
    });
    Ok(())
}

fn make_grid(registry: &mut ShapeRegistry, parts: &[&str], line: usize) -> Result<(), ShapeError> {
    let id_parts: Vec<&str> = parts[1].split('_').collect();
    if id_parts.len() != 2 {
        return Err(ShapeError::GridMissingRowCol { line });
    }
    let row = id_parts[0]
        .parse::<u32>()
        .map_err(|source| ShapeError::BadInteger { line, field: "row", source })?;
    let col = id_parts[1]
        .parse::<u32>()
        .map_err(|source| ShapeError::BadInteger { line, field: "col", source })?;

    let geo_parts: Vec<&str> = parts[2].split(':').collect();
    if geo_parts.len() != 4 {
        return Err(ShapeError::GridMissingBounds { line });
    }
    let sw_lat = parse_f64(geo_parts[0], line, "grid sw_lat")?;
    let sw_lon = parse_f64(geo_parts[1], line, "grid sw_lon")?;
    let ne_lat = parse_f64(geo_parts[2], line, "grid ne_lat")?;
    let ne_lon = parse_f64(geo_parts[3], line, "grid ne_lon")?;
    validate_latitude(sw_lat, line)?;
    validate_longitude(sw_lon, line)?;
    validate_latitude(ne_lat, line)?;
    validate_longitude(ne_lon, line)?;

    let bounds = crate::geometry::Bounds::new(Point::new(sw_lat, sw_lon), Point::new(ne_lat, ne_lon));
    registry.grids.push(Grid::new(bounds, row, col));
    Ok(())
}

fn make_interval(parts: &[&str], line: usize) -> Result<Interval, ShapeError> {
    let id = parse_u64(parts[1], line, "interval id")?;
    let range_parts: Vec<&str> = parts[2].split(';').collect();
    if range_parts.len() < 2 {
        return Err(ShapeError::IntervalMissingFields { line });
    }
    let left = parse_u64(range_parts[0], line, "interval left")? as usize;
    let right = parse_u64(range_parts[1], line, "interval right")? as usize;

    if parts.len() < 4 {
        return Ok(Interval::new(id, left, right));
    }

    let aux: BTreeSet<String> = parts[3]
        .split(';')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    Ok(Interval::with_aux(id, left, right, aux))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::VecDiagnosticSink;

    const HEADER: &str = "type,id,geography,attributes\n";

    #[test]
    fn parses_an_edge_with_way_type() {
        let input = format!(
            "{HEADER}edge,42,1;42.3061;-83.6889:2;42.3064;-83.6890,way_type=residential:way_id=42\n"
        );
        let sink = VecDiagnosticSink::new();
        let reg = load_from_reader(input.as_bytes(), &sink).unwrap();
        assert!(sink.snapshot().is_empty());
        assert_eq!(reg.edges().len(), 1);
        let edge = reg.edges()[0];
        assert_eq!(edge.uid, 42);
        assert_eq!(edge.way_type, Highway::Residential);
        assert_eq!(reg.vertex(edge.v1).uid, 1);
        assert_eq!(reg.vertex(edge.v2).uid, 2);
    }

    #[test]
    fn reuses_vertex_across_edges() {
        let input = format!(
            "{HEADER}edge,42,1;42.3061;-83.6889:2;42.3064;-83.6890,way_type=residential:way_id=42\n\
             edge,43,2;42.3064;-83.6890:3;42.3070;-83.6895\n"
        );
        let sink = VecDiagnosticSink::new();
        let reg = load_from_reader(input.as_bytes(), &sink).unwrap();
        assert_eq!(reg.edges().len(), 2);
        let e1 = reg.edges()[0];
        let e2 = reg.edges()[1];
        assert_eq!(e1.v2, e2.v1);
        assert_eq!(reg.vertex(e1.v2).incident_edges().len(), 2);
    }

    #[test]
    fn bad_latitude_is_reported_and_skipped() {
        let input = format!("{HEADER}circle,7,95.0:-83.0:50\n");
        let sink = VecDiagnosticSink::new();
        let reg = load_from_reader(input.as_bytes(), &sink).unwrap();
        assert!(reg.circles().is_empty());
        let diagnostics = sink.into_inner();
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("bad latitude"));
    }

    #[test]
    fn privacy_interval_with_aux() {
        let input = format!("{HEADER}privacy_interval,3,100;250,home;work\n");
        let sink = VecDiagnosticSink::new();
        let reg = load_from_reader(input.as_bytes(), &sink).unwrap();
        let interval = &reg.privacy_intervals()[0];
        assert_eq!(interval.id, 3);
        assert_eq!(interval.left, 100);
        assert_eq!(interval.right, 250);
        assert_eq!(interval.aux_str(), "home;work");
    }

    #[test]
    fn duplicate_edge_endpoint_is_rejected() {
        let input = format!("{HEADER}edge,1,5;1.0;1.0:5;1.0;1.0\n");
        let sink = VecDiagnosticSink::new();
        let reg = load_from_reader(input.as_bytes(), &sink).unwrap();
        assert!(reg.edges().is_empty());
        assert!(sink.into_inner()[0].message.contains("identifiers"));
    }

    #[test]
    fn missing_header_is_fatal() {
        let sink = VecDiagnosticSink::new();
        let result = load_from_reader(&b""[..], &sink);
        assert!(matches!(result, Err(ShapeError::MissingHeader)));
    }
}
