//! Shape file emission, grounded on `CSVOutputFactory::write_shapes` and its
//! per-type `write_*` helpers.

use std::io::Write;

use crate::error::ShapeError;
use crate::graph::{Edge, ShapeRegistry};
use crate::trajectory::Interval;

const HEADER: &str = "type,id,geography,attributes";

/// Writes `registry`'s circles, edges, and grids as a shape file.
///
/// Mirrors the source's `write_shapes()`, which only ever emits those three
/// shape kinds: critical and privacy intervals are not part of the road
/// graph file and are written separately by
/// [`write_critical_intervals`]/[`write_privacy_intervals`] when a caller
/// actually wants them alongside it.
///
/// Floating point fields are written with 16 digits past the decimal point
/// (more than `f64` carries), matching the spirit of the source's
/// `std::setprecision(16)` formatting, so a write-then-parse round trip is
/// lossless.
///
/// # Errors
/// Propagates any I/O failure from `out`.
pub fn write_shapes<W: Write>(out: &mut W, registry: &ShapeRegistry) -> Result<(), ShapeError> {
    writeln!(out, "{HEADER}")?;

    for circle in registry.circles() {
        writeln!(
            out,
            "circle,{},{:.16}:{:.16}:{:.16}",
            circle.uid, circle.center.lat, circle.center.lon, circle.radius_m
        )?;
    }

    for edge in registry.edges() {
        write_edge(out, registry, edge)?;
    }

    for grid in registry.grids() {
        writeln!(
            out,
            "grid,{}_{},{:.16}:{:.16}:{:.16}:{:.16}",
            grid.row,
            grid.col,
            grid.bounds.sw.lat,
            grid.bounds.sw.lon,
            grid.bounds.ne.lat,
            grid.bounds.ne.lon
        )?;
    }

    Ok(())
}

fn write_edge<W: Write>(out: &mut W, registry: &ShapeRegistry, edge: &Edge) -> Result<(), ShapeError> {
    let v1 = registry.vertex(edge.v1);
    let v2 = registry.vertex(edge.v2);
    writeln!(
        out,
        "edge,{},{};{:.16};{:.16}:{};{:.16};{:.16},way_type={}:way_id={}",
        edge.uid,
        v1.uid,
        v1.point.lat,
        v1.point.lon,
        v2.uid,
        v2.point.lat,
        v2.point.lon,
        edge.way_type.way_type_name(),
        edge.uid,
    )?;
    Ok(())
}

/// Writes each of `intervals` as a `critical_interval` line, the way
/// `CSVOutputFactory::write_critical_interval` writes one at a time rather
/// than as part of `write_shapes`.
///
/// # Errors
/// Propagates any I/O failure from `out`.
pub fn write_critical_intervals<'a, W: Write>(
    out: &mut W,
    intervals: impl IntoIterator<Item = &'a Interval>,
) -> Result<(), ShapeError> {
    for interval in intervals {
        write_interval(out, "critical_interval", interval)?;
    }
    Ok(())
}

/// Writes each of `intervals` as a `privacy_interval` line. See
/// [`write_critical_intervals`].
///
/// # Errors
/// Propagates any I/O failure from `out`.
pub fn write_privacy_intervals<'a, W: Write>(
    out: &mut W,
    intervals: impl IntoIterator<Item = &'a Interval>,
) -> Result<(), ShapeError> {
    for interval in intervals {
        write_interval(out, "privacy_interval", interval)?;
    }
    Ok(())
}

fn write_interval<W: Write>(out: &mut W, kind: &str, interval: &Interval) -> Result<(), ShapeError> {
    let aux = interval.aux_str();
    if aux.is_empty() {
        writeln!(out, "{kind},{},{};{}", interval.id, interval.left, interval.right)?;
    } else {
        writeln!(
            out,
            "{kind},{},{};{},{aux}",
            interval.id, interval.left, interval.right
        )?;
    }
    Ok(())
}
