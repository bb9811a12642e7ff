//! Reading and writing trip CSV records, grounded on
//! `CSVFactory::make_point` / `make_trajectory` / `write_trajectory`.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::TripError;
use crate::trajectory::{Trajectory, TripPoint};
use crate::trip::columns::TripColumns;

fn parse_required(record: &csv::StringRecord, idx: usize, line: usize, field: &'static str) -> Result<f64, TripError> {
    let token = record
        .get(idx)
        .ok_or_else(|| TripError::MissingField(field.to_string()))?;
    token
        .trim()
        .parse::<f64>()
        .map_err(|source| TripError::BadNumber { line, field, source })
}

/// Parses an optional column, leaving the result at `T::default()` if the
/// column is absent from this file (`idx` is `None`), its token is missing
/// or blank, or the token fails to parse. Unlike the five required fields,
/// a bad optional value never fails the record.
fn parse_optional<T: std::str::FromStr + Default>(record: &csv::StringRecord, idx: Option<usize>) -> T {
    idx.and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<T>().ok())
        .unwrap_or_default()
}

fn make_point(
    columns: &TripColumns,
    record: &csv::StringRecord,
    line: usize,
) -> Result<TripPoint, TripError> {
    let gentime = parse_required(record, columns.gentime, line, "gentime")?;
    let lat = parse_required(record, columns.lat, line, "lat")?;
    let lon = parse_required(record, columns.lon, line, "lon")?;
    let heading = parse_required(record, columns.heading, line, "heading")?;
    let speed = parse_required(record, columns.speed, line, "speed")?;

    let mut point = TripPoint::new(gentime, lat, lon, heading, speed);
    point.tx_device = parse_optional(record, columns.tx_device);
    point.tx_random = parse_optional(record, columns.tx_random);
    point.msg_count = parse_optional(record, columns.msg_count);
    point.dsecond = parse_optional(record, columns.dsecond);
    point.elevation = parse_optional(record, columns.elevation);
    point.ax = parse_optional(record, columns.ax);
    point.ay = parse_optional(record, columns.ay);
    point.az = parse_optional(record, columns.az);
    point.yawrate = parse_optional(record, columns.yawrate);
    point.path_count = parse_optional(record, columns.path_count);
    point.radius_of_curve = parse_optional(record, columns.radius_of_curve);
    point.confidence = parse_optional(record, columns.confidence);

    for (name, value) in columns.header().iter().zip(record.iter()) {
        point.raw.insert(name.clone(), value.to_string());
    }
    Ok(point)
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.get(0).is_none_or(str::is_empty)
}

/// Reads every record in `reader` (which must already be positioned just
/// past the header line) into a fresh [`Trajectory`].
///
/// # Errors
/// Returns [`TripError::BadNumber`] on the first record with an
/// unparseable required field, or [`TripError::Csv`]/[`TripError::Io`] on a
/// malformed or unreadable stream.
pub fn read_all<R: Read>(reader: R, columns: &TripColumns) -> Result<Trajectory, TripError> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(false).from_reader(reader);
    let mut trajectory = Trajectory::new();
    let mut record = csv::StringRecord::new();
    while csv_reader.read_record(&mut record)? {
        if is_blank(&record) {
            continue;
        }
        let line = csv_reader.position().line() as usize;
        trajectory.push(make_point(columns, &record, line)?);
    }
    Ok(trajectory)
}

/// Reads the records in `[start, end]` (both byte offsets, both inclusive)
/// of `reader` into a fresh [`Trajectory`].
///
/// A record belongs to the window iff its starting byte offset satisfies
/// `start <= record_start <= end`; `end` is therefore always the starting
/// offset of the last record in the window, never one past it. This makes
/// windows produced by [`crate::trip::splitter::TripSplitter`] directly
/// consumable here with no adjustment.
///
/// # Errors
/// Returns [`TripError::WindowOutOfRange`] if `start > end`. Same as
/// [`read_all`] otherwise, plus [`TripError::Io`] if `start` cannot be
/// seeked to.
pub fn read_window<R: Read + Seek>(
    mut reader: R,
    columns: &TripColumns,
    start: u64,
    end: u64,
) -> Result<Trajectory, TripError> {
    if start > end {
        return Err(TripError::WindowOutOfRange { start, end });
    }
    reader.seek(SeekFrom::Start(start))?;
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(false).from_reader(reader);
    let mut trajectory = Trajectory::new();
    let mut record = csv::StringRecord::new();
    loop {
        let record_start = start + csv_reader.position().byte();
        if record_start > end {
            break;
        }
        if !csv_reader.read_record(&mut record)? {
            break;
        }
        if is_blank(&record) {
            continue;
        }
        let line = csv_reader.position().line() as usize;
        trajectory.push(make_point(columns, &record, line)?);
    }
    Ok(trajectory)
}

/// Resolves a single output column by name against `point`'s raw column
/// map, falling back to the typed field (case-insensitively matched on its
/// canonical name) for the five required columns when `point.raw` has no
/// entry under that name — which happens for a `TripPoint` assembled by
/// hand rather than parsed from a record. Any other unmatched name is
/// written empty.
fn resolve_field(point: &TripPoint, name: &str) -> String {
    if let Some(value) = point.raw.get(name) {
        return value.clone();
    }
    match name.to_ascii_lowercase().as_str() {
        "latitude" => format!("{:.16}", point.lat),
        "longitude" => format!("{:.16}", point.lon),
        "heading" => format!("{:.16}", point.heading),
        "speed" => format!("{:.16}", point.speed),
        "gentime" => format!("{:.16}", point.gentime),
        _ => String::new(),
    }
}

/// Writes `header` as the first line, then every point of `trajectory` as a
/// CSV row, resolving each output column by name against the point's raw
/// column map (falling back to the typed field for the five recognized
/// columns, see [`resolve_field`]). Columns named in `header` but absent
/// from a point are written empty; columns present on a point but absent
/// from `header` are dropped.
///
/// # Errors
/// Propagates any I/O failure from `out`.
pub fn write_trajectory<W: Write>(
    out: &mut W,
    header: &str,
    trajectory: &Trajectory,
) -> Result<(), TripError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    writer.write_record(&columns)?;
    for point in trajectory {
        let fields: Vec<String> = columns.iter().map(|name| resolve_field(point, name)).collect();
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::columns::FieldNames;
    use std::io::Cursor;

    fn columns() -> TripColumns {
        TripColumns::resolve(
            "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed",
            &FieldNames::default(),
        )
        .unwrap()
    }

    #[test]
    fn inverted_window_is_rejected() {
        let err = read_window(Cursor::new(Vec::new()), &columns(), 10, 5).unwrap_err();
        assert!(matches!(err, TripError::WindowOutOfRange { start: 10, end: 5 }));
    }

    #[test]
    fn reads_all_records() {
        let body = "1,1,100.0,42.30,-83.68,90.0,12.5\n1,1,100.5,42.31,-83.69,91.0,12.6\n";
        let traj = read_all(body.as_bytes(), &columns()).unwrap();
        assert_eq!(traj.len(), 2);
        assert_eq!(traj.get(0).unwrap().lat, 42.30);
    }

    #[test]
    fn absent_optional_column_leaves_field_at_its_default() {
        let body = "1,1,100.0,42.30,-83.68,90.0,12.5\n";
        let traj = read_all(body.as_bytes(), &columns()).unwrap();
        let point = traj.get(0).unwrap();
        assert_eq!(point.elevation, 0.0);
        assert_eq!(point.confidence, 0);
    }

    #[test]
    fn present_optional_column_is_parsed_and_a_blank_token_falls_back_to_default() {
        let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed,Elevation,Confidence";
        let columns = TripColumns::resolve(header, &FieldNames::default()).unwrap();
        let body = "1,1,100.0,42.30,-83.68,90.0,12.5,305.2,87\n1,1,100.5,42.31,-83.69,91.0,12.6,,\n";
        let traj = read_all(body.as_bytes(), &columns).unwrap();
        assert_eq!(traj.get(0).unwrap().elevation, 305.2);
        assert_eq!(traj.get(0).unwrap().confidence, 87);
        assert_eq!(traj.get(1).unwrap().elevation, 0.0);
        assert_eq!(traj.get(1).unwrap().confidence, 0);
    }

    #[test]
    fn windowed_read_matches_full_parse_filtered_by_uid() {
        let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed\n";
        let trip1_first = "1,1,100.0,42.30,-83.68,90.0,12.5\n";
        let trip1_second = "1,1,100.5,42.31,-83.69,91.0,12.6\n";
        let trip2 = "2,1,200.0,42.40,-83.70,10.0,9.0\n";
        let body = format!("{header}{trip1_first}{trip1_second}{trip2}");

        let trip1_start = header.len() as u64;
        let trip1_last_record_start = trip1_start + trip1_first.len() as u64;

        let cursor = Cursor::new(body.into_bytes());
        let traj = read_window(cursor, &columns(), trip1_start, trip1_last_record_start).unwrap();
        assert_eq!(traj.len(), 2);
    }

    #[test]
    fn write_then_read_round_trips_required_fields() {
        let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed";
        let traj = read_all(
            "1,1,100.0,42.30,-83.68,90.0,12.5\n".as_bytes(),
            &columns(),
        )
        .unwrap();
        let mut out = Vec::new();
        write_trajectory(&mut out, header, &traj).unwrap();
        let written = String::from_utf8(out).unwrap();
        let reparsed = read_all(written.lines().nth(1).unwrap().as_bytes(), &columns()).unwrap();
        assert_eq!(reparsed.get(0).unwrap().lat, 42.30);
    }

    #[test]
    fn write_trajectory_falls_back_to_the_typed_field_when_raw_is_empty() {
        let header = "Gentime,Latitude,Longitude,Heading,Speed";
        let mut traj = Trajectory::new();
        traj.push(TripPoint::new(100.0, 42.30, -83.68, 90.0, 12.5));

        let mut out = Vec::new();
        write_trajectory(&mut out, header, &traj).unwrap();
        let written = String::from_utf8(out).unwrap();
        let row = written.lines().nth(1).unwrap();
        let expected = format!(
            "{:.16},{:.16},{:.16},{:.16},{:.16}",
            100.0, 42.30, -83.68, 90.0, 12.5
        );
        assert_eq!(row, expected);
    }
}
