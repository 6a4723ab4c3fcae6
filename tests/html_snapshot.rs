//! HTML report snapshot tests for determinism and structure.
//!
//! These tests verify that HTML report generation is:
//! - Deterministic (same input produces identical output)
//! - Ordered by descending p95 query time
//! - Properly escaping query text

use std::path::{Path, PathBuf};

use slowsql_report::core::{MalformedTablePolicy, build_records, decode_report_file};
use slowsql_report::report::{ReportDocument, ReportRenderer};
use time::macros::datetime;

fn fixture_document() -> ReportDocument {
    let path = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/digest_sample.json"));
    let records = build_records(decode_report_file(path).unwrap(), MalformedTablePolicy::Skip).unwrap();
    ReportDocument::new(
        datetime!(2024-04-16 10:30:00 +8),
        records,
        &[PathBuf::from("/var/log/mysql/mysql-slow.log")],
    )
}

#[test]
fn html_report_is_deterministic() {
    let renderer = ReportRenderer::standard().unwrap();
    let doc = fixture_document();

    let first = renderer.render(&doc).unwrap();
    let second = renderer.render(&doc).unwrap();

    assert_eq!(first, second, "HTML output should be deterministic");
}

#[test]
fn html_report_has_expected_structure() {
    let html = ReportRenderer::standard().unwrap().render(&fixture_document()).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Slow Query Report - 2024-04-16 10:30:00</title>"));
    assert!(html.contains("mysql-slow.log"));
    assert!(html.contains("<tbody>"));
    assert!(html.contains("</html>"));
    assert!(!html.contains("No slow queries found."));
    // One row per query class
    assert_eq!(html.matches("<tr id=\"q-").count(), 4);
}

#[test]
fn html_rows_follow_ranking() {
    let html = ReportRenderer::standard().unwrap().render(&fixture_document()).unwrap();

    let positions: Vec<usize> = ["7C2E99D0A1B4F358", "A91F03B7C2D45E60", "0B4D2A11F6C3E1A7", "D3C07E21B9A4F812"]
        .iter()
        .map(|id| html.find(&format!("id=\"q-{id}\"")).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn html_formats_durations_and_totals() {
    let html = ReportRenderer::standard().unwrap().render(&fixture_document()).unwrap();

    // p95 of the slowest class and the executions card (10 + 4 + 10 + 1)
    assert!(html.contains("7.81s"));
    assert!(html.contains("18ms"));
    assert!(html.contains("211μs"));
    assert!(html.contains("<div class=\"card-value\">25</div>"));
    assert!(html.contains("orders, order_items, customers"));
}

#[test]
fn html_escapes_query_text() {
    let html = ReportRenderer::standard().unwrap().render(&fixture_document()).unwrap();

    assert!(html.contains("sku = &#x27;X&lt;1&gt;&#x27;"));
    assert!(!html.contains("'X<1>'"));
}

#[test]
fn html_renders_empty_document() {
    let doc = ReportDocument::new(datetime!(2024-04-16 10:30:00 UTC), Vec::new(), &[]);

    let html = ReportRenderer::standard().unwrap().render(&doc).unwrap();

    assert!(html.contains("No slow queries found."));
    assert!(!html.contains("<tr id=\"q-"));
}
