//! End-to-end scenarios exercising the shape and trip codecs together
//! against on-disk files, the way the batch tool's inputs actually arrive.

use std::fs::File;
use std::io::Write;

use route_sanitizer_core::diagnostics::VecDiagnosticSink;
use route_sanitizer_core::trip::{FieldNames, TripColumns, TripSplitter, read_window};
use route_sanitizer_core::{shape, trip};

fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn shape_file_round_trips_through_disk() {
    let shapes = "type,id,geography,attributes\n\
        edge,1,10;42.30;-83.68:11;42.31;-83.69,way_type=primary:way_id=1\n\
        edge,2,11;42.31;-83.69:12;42.32;-83.70,way_type=residential:way_id=2\n\
        circle,5,42.33;-83.60;25.0\n";
    let file = write_temp(shapes);
    let sink = VecDiagnosticSink::new();

    let registry = shape::load(file.path(), &sink).unwrap();
    assert!(sink.snapshot().is_empty());
    assert_eq!(registry.edges().len(), 2);
    assert_eq!(registry.circles().len(), 1);

    // vertex 11 is shared between both edges.
    let e1 = registry.edges()[0];
    let e2 = registry.edges()[1];
    assert_eq!(e1.v2, e2.v1);
    assert_eq!(registry.vertex(e1.v2).incident_edges().len(), 2);

    let mut out = Vec::new();
    shape::write_shapes(&mut out, &registry).unwrap();
    let written = String::from_utf8(out).unwrap();
    let reparsed = shape::load_from_reader(written.as_bytes(), &sink).unwrap();
    assert_eq!(reparsed.edges().len(), 2);
    assert_eq!(reparsed.circles().len(), 1);
}

#[test]
fn a_malformed_line_is_skipped_without_losing_the_rest_of_the_file() {
    let shapes = "type,id,geography,attributes\n\
        edge,1,10;42.30;-83.68:11;42.31;-83.69\n\
        circle,9,95.0:-83.0:10.0\n\
        circle,10,42.2;-83.5;10.0\n";
    let sink = VecDiagnosticSink::new();
    let registry = shape::load_from_reader(shapes.as_bytes(), &sink).unwrap();

    assert_eq!(registry.edges().len(), 1);
    assert_eq!(registry.circles().len(), 1);
    assert_eq!(registry.circles()[0].uid, 10);
    assert_eq!(sink.into_inner().len(), 1);
}

#[test]
fn splitting_a_multi_trip_file_and_windowing_each_trip_recovers_the_originals() {
    let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed\n";
    let trip_a = "1,1,100.0,42.30,-83.68,90.0,12.5\n1,1,100.5,42.31,-83.69,91.0,12.6\n";
    let trip_b = "2,1,200.0,42.40,-83.70,10.0,9.0\n";
    let body = format!("{header}{trip_a}{trip_b}");
    let file = write_temp(&body);

    let raw = File::open(file.path()).unwrap();
    let size = raw.metadata().unwrap().len();
    let mut splitter = TripSplitter::with_default_uid_fields(raw, size, ',').unwrap();

    let columns = TripColumns::resolve(splitter.header(), &FieldNames::default()).unwrap();

    let extent_a = splitter.next_trajectory().unwrap().unwrap();
    assert_eq!(extent_a.uid, "1_1");
    let extent_b = splitter.next_trajectory().unwrap().unwrap();
    assert_eq!(extent_b.uid, "2_1");
    assert!(splitter.next_trajectory().unwrap().is_none());

    let reader_a = File::open(file.path()).unwrap();
    let traj_a = read_window(reader_a, &columns, extent_a.start, extent_a.end).unwrap();
    assert_eq!(traj_a.len(), 2);
    assert_eq!(traj_a.get(0).unwrap().lat, 42.30);
    assert_eq!(traj_a.get(1).unwrap().lat, 42.31);

    let reader_b = File::open(file.path()).unwrap();
    let traj_b = read_window(reader_b, &columns, extent_b.start, extent_b.end).unwrap();
    assert_eq!(traj_b.len(), 1);
    assert_eq!(traj_b.get(0).unwrap().lat, 42.40);
}

#[test]
fn trip_file_round_trips_through_write_trajectory() {
    let header = "RxDevice,FileId,Gentime,Latitude,Longitude,Heading,Speed";
    let body = "1,1,100.0,42.30,-83.68,90.0,12.5\n1,1,100.5,42.31,-83.69,91.0,12.6\n";
    let columns = TripColumns::resolve(header, &FieldNames::default()).unwrap();
    let trajectory = trip::read_all(body.as_bytes(), &columns).unwrap();

    let mut out = Vec::new();
    trip::write_trajectory(&mut out, header, &trajectory).unwrap();
    let written = String::from_utf8(out).unwrap();

    let mut lines = written.lines();
    assert_eq!(lines.next().unwrap(), header);
    let reparsed = trip::read_all(lines.collect::<Vec<_>>().join("\n").as_bytes(), &columns).unwrap();
    assert_eq!(reparsed.len(), 2);
    assert_eq!(reparsed.get(0).unwrap().lon, -83.68);
    assert_eq!(reparsed.get(1).unwrap().speed, 12.6);
}
