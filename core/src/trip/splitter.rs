//! Splits a multi-trip CSV file into per-trip byte extents, grounded on
//! `CSVSplitter`.

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};

use crate::error::SplitError;

/// Default UID field list, matching `DIConfig`'s `uid_fields_` default.
pub const DEFAULT_UID_FIELDS: &str = "RxDevice,FileId";

/// A single trip's identity and byte extent within the file it was scanned
/// from. `end` is the starting byte offset of the trip's last record, never
/// one past it (see [`crate::trip::codec::read_window`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripExtent {
    pub uid: String,
    pub start: u64,
    pub end: u64,
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.get(0).is_none_or(str::is_empty)
}

/// Joins the values at `indices` with `_`.
///
/// Underscore was chosen over the file's own field delimiter because the
/// default UID fields (`RxDevice`, `FileId`) are plain numeric identifiers
/// that cannot themselves contain an underscore, so the join is
/// unambiguous and reversible.
fn uid_from_record(record: &csv::StringRecord, indices: &[usize]) -> String {
    indices
        .iter()
        .map(|&i| record.get(i).unwrap_or(""))
        .collect::<Vec<_>>()
        .join("_")
}

fn resolve_uid_indices(header: &str, uid_fields: &str, delimiter: char) -> Result<Vec<usize>, SplitError> {
    let columns: Vec<&str> = header.split(delimiter).map(str::trim).collect();
    uid_fields
        .split(',')
        .map(|name| {
            let name = name.trim();
            columns
                .iter()
                .position(|c| *c == name)
                .ok_or_else(|| SplitError::InvalidFields(name.to_string()))
        })
        .collect()
}

/// Composes the UID for a single trip record given its header, without
/// constructing a [`TripSplitter`]. Useful for callers that already have a
/// header and a line in hand (e.g. a diagnostic tool).
///
/// # Errors
/// Returns [`SplitError::InvalidFields`] if a name in `uid_fields` is not
/// present in `header`.
pub fn compose_uid(header: &str, line: &str, uid_fields: &str, delimiter: char) -> Result<String, SplitError> {
    let indices = resolve_uid_indices(header, uid_fields, delimiter)?;
    let values: Vec<&str> = line.split(delimiter).collect();
    Ok(indices
        .iter()
        .map(|&i| values.get(i).copied().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("_"))
}

fn read_header_line<R: Read>(reader: R) -> Result<(String, BufReader<R>, u64), SplitError> {
    let mut buffered = BufReader::new(reader);
    let mut header = String::new();
    let n = buffered.read_line(&mut header)?;
    if n == 0 {
        return Err(SplitError::EmptyHeader);
    }
    let header = header.trim_end_matches(['\n', '\r']).to_string();
    let pos = n as u64;
    Ok((header, buffered, pos))
}

/// Scans a trip file one trip at a time, yielding `(uid, start, end)`
/// extents that [`crate::trip::codec::read_window`] can ingest
/// independently, including in parallel.
#[derive(Debug)]
pub struct TripSplitter<R> {
    reader: BufReader<R>,
    uid_indices: Vec<usize>,
    header: String,
    size: u64,
    pos: u64,
}

impl<R: Read + Seek> TripSplitter<R> {
    /// Reads the header as the first line of `reader`, resolves
    /// `uid_fields` (a comma-joined list of header names) against it, and
    /// prepares to scan the remaining `size - header_len` bytes.
    ///
    /// Grounded on `CSVSplitter`'s `(stream, size, uid_fields, has_header,
    /// delimiter)` overload with `has_header` fixed to `true`.
    ///
    /// # Errors
    /// Returns [`SplitError::EmptyHeader`] if the stream has no first line,
    /// or [`SplitError::InvalidFields`] if a uid field name is not present
    /// in the header.
    pub fn new(reader: R, size: u64, uid_fields: &str, delimiter: char) -> Result<Self, SplitError> {
        let (header, buffered, pos) = read_header_line(reader)?;
        let uid_indices = resolve_uid_indices(&header, uid_fields, delimiter)?;
        Ok(Self {
            reader: buffered,
            uid_indices,
            header,
            size,
            pos,
        })
    }

    /// Convenience constructor using the default UID fields `RxDevice,FileId`.
    ///
    /// Grounded on `CSVSplitter`'s `(stream, size, delimiter)` overload.
    ///
    /// # Errors
    /// See [`TripSplitter::new`].
    pub fn with_default_uid_fields(reader: R, size: u64, delimiter: char) -> Result<Self, SplitError> {
        Self::new(reader, size, DEFAULT_UID_FIELDS, delimiter)
    }

    /// Reads the header as the first line of `reader`, like [`TripSplitter::new`],
    /// but takes the UID columns as explicit indices rather than resolving
    /// names against the header.
    ///
    /// Grounded on `CSVSplitter`'s `(stream, uid_indices, size, has_header,
    /// delimiter)` overload with `has_header` fixed to `true`.
    ///
    /// # Errors
    /// Returns [`SplitError::EmptyHeader`] if the stream has no first line.
    pub fn with_uid_indices(reader: R, size: u64, uid_indices: &[usize], _delimiter: char) -> Result<Self, SplitError> {
        let (header, buffered, pos) = read_header_line(reader)?;
        Ok(Self {
            reader: buffered,
            uid_indices: uid_indices.to_vec(),
            header,
            size,
            pos,
        })
    }

    /// Builds a splitter for a stream that does not itself contain a header
    /// line; `header` is supplied externally and `reader` is assumed to
    /// start directly at the first record.
    ///
    /// Grounded on `CSVSplitter`'s `(stream, size, header, uid_fields,
    /// delimiter)` overload.
    ///
    /// # Errors
    /// Returns [`SplitError::InvalidFields`] if a uid field name is not
    /// present in `header`.
    pub fn with_header(reader: R, size: u64, header: &str, uid_fields: &str, delimiter: char) -> Result<Self, SplitError> {
        let uid_indices = resolve_uid_indices(header, uid_fields, delimiter)?;
        Ok(Self {
            reader: BufReader::new(reader),
            uid_indices,
            header: header.to_string(),
            size,
            pos: 0,
        })
    }

    /// Like [`TripSplitter::with_header`], using the default UID fields
    /// `RxDevice,FileId`.
    ///
    /// Grounded on `CSVSplitter`'s `(stream, size, header, delimiter)`
    /// overload.
    ///
    /// # Errors
    /// See [`TripSplitter::with_header`].
    pub fn with_header_and_default_uid_fields(reader: R, size: u64, header: &str, delimiter: char) -> Result<Self, SplitError> {
        Self::with_header(reader, size, header, DEFAULT_UID_FIELDS, delimiter)
    }

    #[must_use]
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Finds the end of the current trip and returns its UID and byte
    /// extent, advancing past it. Returns `Ok(None)` once the file is
    /// exhausted. Blank lines are skipped without ending the run.
    ///
    /// # Errors
    /// Propagates [`SplitError::Io`] on a read/seek failure.
    pub fn next_trajectory(&mut self) -> Result<Option<TripExtent>, SplitError> {
        if self.pos >= self.size {
            return Ok(None);
        }

        let start_pos = self.pos;
        self.reader.seek(SeekFrom::Start(start_pos))?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(&mut self.reader);
        let mut record = csv::StringRecord::new();

        let mut uid: Option<String> = None;
        let mut first_start = 0u64;
        let mut last_end = 0u64;

        loop {
            let candidate_start = start_pos + csv_reader.position().byte();
            if !csv_reader.read_record(&mut record)? {
                self.pos = self.size;
                break;
            }
            if is_blank(&record) {
                continue;
            }
            let this_uid = uid_from_record(&record, &self.uid_indices);
            match &uid {
                None => {
                    uid = Some(this_uid);
                    first_start = candidate_start;
                    last_end = candidate_start;
                }
                Some(current) if *current == this_uid => {
                    last_end = candidate_start;
                }
                Some(_) => {
                    self.pos = candidate_start;
                    break;
                }
            }
        }

        Ok(uid.map(|uid| TripExtent {
            uid,
            start: first_start,
            end: last_end,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn file() -> (String, Vec<u8>) {
        let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed\n".to_string();
        let body = "1,1,100.0,42.30,-83.68,90.0,12.5\n\
                    1,1,100.5,42.31,-83.69,91.0,12.6\n\
                    1,2,200.0,42.40,-83.70,10.0,9.0\n";
        let bytes = format!("{header}{body}").into_bytes();
        (header, bytes)
    }

    #[test]
    fn splits_two_trips_by_uid() {
        let (_, bytes) = file();
        let size = bytes.len() as u64;
        let mut splitter = TripSplitter::with_default_uid_fields(Cursor::new(bytes), size, ',').unwrap();

        let first = splitter.next_trajectory().unwrap().unwrap();
        assert_eq!(first.uid, "1_1");
        let second = splitter.next_trajectory().unwrap().unwrap();
        assert_eq!(second.uid, "1_2");
        assert!(splitter.next_trajectory().unwrap().is_none());
    }

    #[test]
    fn compose_uid_matches_splitter_uid() {
        let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed";
        let line = "1,1,100.0,42.30,-83.68,90.0,12.5";
        let uid = compose_uid(header, line, DEFAULT_UID_FIELDS, ',').unwrap();
        assert_eq!(uid, "1_1");
    }

    #[test]
    fn unknown_uid_field_is_an_error() {
        let (_, bytes) = file();
        let size = bytes.len() as u64;
        let err = TripSplitter::new(Cursor::new(bytes), size, "NotAField", ',').unwrap_err();
        assert!(matches!(err, SplitError::InvalidFields(_)));
    }

    #[test]
    fn with_uid_indices_splits_the_same_way_as_named_fields() {
        let (_, bytes) = file();
        let size = bytes.len() as u64;
        let mut splitter = TripSplitter::with_uid_indices(Cursor::new(bytes), size, &[0, 1], ',').unwrap();
        let first = splitter.next_trajectory().unwrap().unwrap();
        assert_eq!(first.uid, "1_1");
        let second = splitter.next_trajectory().unwrap().unwrap();
        assert_eq!(second.uid, "1_2");
    }

    #[test]
    fn with_header_skips_reading_a_header_line_from_the_stream() {
        let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed";
        let body = "1,1,100.0,42.30,-83.68,90.0,12.5\n1,2,200.0,42.40,-83.70,10.0,9.0\n";
        let size = body.len() as u64;
        let mut splitter =
            TripSplitter::with_header(Cursor::new(body.as_bytes().to_vec()), size, header, DEFAULT_UID_FIELDS, ',')
                .unwrap();
        assert_eq!(splitter.header(), header);
        let first = splitter.next_trajectory().unwrap().unwrap();
        assert_eq!(first.uid, "1_1");
        let second = splitter.next_trajectory().unwrap().unwrap();
        assert_eq!(second.uid, "1_2");
    }

    #[test]
    fn with_header_and_default_uid_fields_uses_rx_device_and_file_id() {
        let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed";
        let body = "1,1,100.0,42.30,-83.68,90.0,12.5\n";
        let size = body.len() as u64;
        let mut splitter =
            TripSplitter::with_header_and_default_uid_fields(Cursor::new(body.as_bytes().to_vec()), size, header, ',')
                .unwrap();
        let first = splitter.next_trajectory().unwrap().unwrap();
        assert_eq!(first.uid, "1_1");
    }
}
