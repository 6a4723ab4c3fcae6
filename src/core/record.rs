//! Flat per-class record used for ranking, rendering and export.

use serde::{Deserialize, Serialize};

use crate::core::schema::QueryClass;

/// One row of the report: a query class projected onto the fields the
/// report shows. Statistic values stay as decimal text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlowQueryRecord {
    /// Class checksum
    pub id: String,
    pub rows_examined_sum: String,
    pub rows_examined_max: String,
    pub query_length_sum: String,
    pub query_length_max: String,
    pub time_max: String,
    pub time_min: String,
    pub time_p95: String,
    pub time_median: String,
    pub rows_sent_max: String,
    pub database: String,
    pub query_count: u64,
    /// Distinct table names in first-seen order
    pub query_tables: Vec<String>,
    pub sql: String,
    pub query_id: String,
    pub timestamp: String,
    pub user: String,
    pub host: String,
    pub lock_time_max: String,
    pub lock_time_min: String,
    pub lock_time_p95: String,
}

/// Project a query class and its extracted tables into a record.
pub fn normalize(class: &QueryClass, tables: Vec<String>) -> SlowQueryRecord {
    let metrics = &class.metrics;
    SlowQueryRecord {
        id: class.checksum.clone(),
        rows_examined_sum: metrics.rows_examined.sum.clone(),
        rows_examined_max: metrics.rows_examined.max.clone(),
        query_length_sum: metrics.query_length.sum.clone(),
        query_length_max: metrics.query_length.max.clone(),
        time_max: metrics.query_time.max.clone(),
        time_min: metrics.query_time.min.clone(),
        time_p95: metrics.query_time.pct_95.clone(),
        time_median: metrics.query_time.median.clone(),
        rows_sent_max: metrics.rows_sent.max.clone(),
        database: metrics.db.value.clone(),
        query_count: class.query_count,
        query_tables: tables,
        sql: class.example.query.clone(),
        query_id: class.example.id.clone(),
        timestamp: class.example.ts.clone(),
        user: metrics.user.value.clone(),
        host: metrics.host.value.clone(),
        lock_time_max: metrics.lock_time.max.clone(),
        lock_time_min: metrics.lock_time.min.clone(),
        lock_time_p95: metrics.lock_time.pct_95.clone(),
    }
}
