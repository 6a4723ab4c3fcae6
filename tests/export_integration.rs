//! JSON and CSV exports written from the fixture digest.

use std::path::Path;

use slowsql_report::core::{MalformedTablePolicy, SlowQueryRecord, build_records, decode_report_file};
use slowsql_report::storage::{CSV_HEADERS, CsvExporter, read_records_json, write_records_json};
use tempfile::tempdir;

fn fixture_records() -> Vec<SlowQueryRecord> {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/digest_sample.json"));
    build_records(decode_report_file(path).unwrap(), MalformedTablePolicy::Skip).unwrap()
}

#[test]
fn json_export_preserves_ranked_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ranked.json");
    let records = fixture_records();

    write_records_json(&records, &path).unwrap();
    let loaded = read_records_json(&path).unwrap();

    assert_eq!(loaded, records);
}

#[test]
fn csv_export_has_header_and_ranked_rows() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ranked.csv");

    CsvExporter::new().export(&fixture_records(), &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, CSV_HEADERS);

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4);
    assert_eq!(&rows[0][0], "1");
    assert_eq!(&rows[0][1], "7C2E99D0A1B4F358");
    assert_eq!(&rows[0][18], "orders;order_items;customers");
    assert_eq!(&rows[3][0], "4");
}

#[test]
fn csv_export_quotes_sql_with_commas() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ranked.csv");

    CsvExporter::new().export(&fixture_records(), &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let first = reader.records().next().unwrap().unwrap();
    assert!(first[21].starts_with("SELECT o.id, SUM(i.qty) FROM orders o"));
}
