//! Ranking of records by 95th-percentile query time.

use std::cmp::Ordering;

use crate::core::record::SlowQueryRecord;

/// Parse decimal text as `f64`. Unparsable or NaN text counts as zero.
pub fn parse_decimal(text: &str) -> f64 {
    match text.trim().parse::<f64>() {
        Ok(v) if !v.is_nan() => v,
        _ => 0.0,
    }
}

/// Total order placing the record with the larger p95 query time first.
pub fn compare_by_p95(a: &SlowQueryRecord, b: &SlowQueryRecord) -> Ordering {
    parse_decimal(&b.time_p95).total_cmp(&parse_decimal(&a.time_p95))
}

/// Sort records by descending p95 query time.
///
/// The sort is stable: records with equal p95 keep their decode order.
/// No record is dropped or merged.
pub fn rank_records(records: &mut [SlowQueryRecord]) {
    records.sort_by(compare_by_p95);
}
