//! Core pipeline: decode the digest, extract tables, normalize and rank.

pub mod decode;
pub mod rank;
pub mod record;
pub mod schema;
pub mod tables;

// Re-export key types for convenience
pub use decode::{decode_report, decode_report_file};
pub use rank::{compare_by_p95, parse_decimal, rank_records};
pub use record::{SlowQueryRecord, normalize};
pub use schema::{DigestReport, MetricStats, QueryClass, TableRef};
pub use tables::{ExtractionError, MalformedTablePolicy, extract_table_name, extract_tables};

use crate::ReportResult;

/// Turn a decoded digest into ranked records.
///
/// Consumes the report; it is not needed once its classes are normalized.
pub fn build_records(
    report: DigestReport,
    policy: MalformedTablePolicy,
) -> ReportResult<Vec<SlowQueryRecord>> {
    let mut records = Vec::with_capacity(report.classes.len());
    for class in &report.classes {
        let tables = extract_tables(class.tables.as_deref(), policy)?;
        records.push(normalize(class, tables));
    }
    rank_records(&mut records);
    Ok(records)
}
