//! Typed shape of the digest JSON document.
//!
//! Every statistic is kept as decimal text exactly as the digester printed
//! it. Fields absent from the input, or set to `null`, fall back to their zero
//! value, and unknown fields are ignored.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

/// Top-level digest document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DigestReport {
    /// Whole-log summary. Decoded for completeness, not used downstream.
    #[serde(default, deserialize_with = "null_default")]
    pub global: GlobalSummary,

    /// Query classes in the order the digester emitted them.
    #[serde(default, deserialize_with = "null_default")]
    pub classes: Vec<QueryClass>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalSummary {
    #[serde(default, deserialize_with = "null_default")]
    pub unique_query_count: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub query_count: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub files: Vec<SourceFile>,
    #[serde(default, deserialize_with = "null_default")]
    pub metrics: GlobalMetrics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub size: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalMetrics {
    #[serde(rename = "Query_time", default, deserialize_with = "null_default")]
    pub query_time: MetricStats,
    #[serde(rename = "Lock_time", default, deserialize_with = "null_default")]
    pub lock_time: MetricStats,
    #[serde(rename = "Rows_examined", default, deserialize_with = "null_default")]
    pub rows_examined: MetricStats,
    #[serde(rename = "Rows_sent", default, deserialize_with = "null_default")]
    pub rows_sent: MetricStats,
    #[serde(rename = "Query_length", default, deserialize_with = "null_default")]
    pub query_length: MetricStats,
}

/// One fingerprint-equivalence class of queries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryClass {
    #[serde(default, deserialize_with = "lenient_text")]
    pub checksum: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub fingerprint: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub distillate: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub attribute: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ts_min: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ts_max: String,
    #[serde(default, deserialize_with = "null_default")]
    pub query_count: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub example: QueryExample,
    #[serde(default, deserialize_with = "null_default")]
    pub metrics: ClassMetrics,
    #[serde(default, deserialize_with = "null_default")]
    pub histograms: Histograms,
    /// Tables touched by the example query; absent for table-less queries.
    #[serde(default)]
    pub tables: Option<Vec<TableRef>>,
}

/// Representative query for a class.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryExample {
    #[serde(default, deserialize_with = "lenient_text")]
    pub query: String,
    #[serde(rename = "Id", default, deserialize_with = "lenient_text")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ts: String,
    #[serde(rename = "Query_time", default, deserialize_with = "lenient_text")]
    pub query_time: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub as_select: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    #[serde(rename = "Query_time", default, deserialize_with = "null_default")]
    pub query_time: MetricStats,
    #[serde(rename = "Lock_time", default, deserialize_with = "null_default")]
    pub lock_time: MetricStats,
    #[serde(rename = "Rows_examined", default, deserialize_with = "null_default")]
    pub rows_examined: MetricStats,
    #[serde(rename = "Rows_sent", default, deserialize_with = "null_default")]
    pub rows_sent: MetricStats,
    #[serde(rename = "Query_length", default, deserialize_with = "null_default")]
    pub query_length: MetricStats,
    #[serde(default, deserialize_with = "null_default")]
    pub user: Categorical,
    #[serde(default, deserialize_with = "null_default")]
    pub host: Categorical,
    #[serde(default, deserialize_with = "null_default")]
    pub db: Categorical,
}

/// Per-metric statistics, each value carried as decimal text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    #[serde(default, deserialize_with = "lenient_text")]
    pub sum: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub min: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub max: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub avg: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub median: String,
    #[serde(rename = "pct_95", default, deserialize_with = "lenient_text")]
    pub pct_95: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stddev: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub pct: String,
}

/// Single-value attribute such as user, host or database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categorical {
    #[serde(default, deserialize_with = "lenient_text")]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Histograms {
    #[serde(rename = "Query_time", default, deserialize_with = "null_default")]
    pub query_time: Vec<u64>,
}

/// Table touched by a class's example query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableRef {
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: String,
    /// `SHOW CREATE TABLE` fragment, e.g. ``SHOW CREATE TABLE `shop`.`orders`\G``.
    #[serde(default, deserialize_with = "lenient_text")]
    pub create: String,
}

/// Treat JSON `null` like an absent field: the type's zero value.
fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accept a JSON string, number, bool or null and keep it as text.
///
/// The digester prints most statistics as strings but emits bare numbers
/// for some of them; both shapes are coerced to the same decimal text.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct LenientText;

    impl<'de> Visitor<'de> for LenientText {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string, number, boolean or null")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_unit<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }

        fn visit_none<E: de::Error>(self) -> Result<String, E> {
            Ok(String::new())
        }
    }

    deserializer.deserialize_any(LenientText)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_stats_accepts_strings_and_numbers() {
        let stats: MetricStats = serde_json::from_str(
            r#"{"sum": "1.5", "max": 3, "min": 0.25, "median": null, "pct_95": "2.1"}"#,
        )
        .unwrap();

        assert_eq!(stats.sum, "1.5");
        assert_eq!(stats.max, "3");
        assert_eq!(stats.min, "0.25");
        assert_eq!(stats.median, "");
        assert_eq!(stats.pct_95, "2.1");
        assert_eq!(stats.stddev, "");
    }

    #[test]
    fn test_query_class_missing_fields_take_zero_values() {
        let class: QueryClass = serde_json::from_str(r#"{"checksum": "ABC"}"#).unwrap();

        assert_eq!(class.checksum, "ABC");
        assert_eq!(class.query_count, 0);
        assert!(class.tables.is_none());
        assert_eq!(class.metrics.db.value, "");
        assert_eq!(class.example.query, "");
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let report: DigestReport = serde_json::from_str(
            r#"{"global": {"query_count": 7, "extra": true}, "classes": [], "future": 1}"#,
        )
        .unwrap();

        assert_eq!(report.global.query_count, 7);
        assert!(report.classes.is_empty());
    }

    #[test]
    fn test_example_id_accepts_number() {
        let example: QueryExample =
            serde_json::from_str(r#"{"query": "SELECT 1", "Id": 42, "ts": "2024-04-16 10:00:00"}"#)
                .unwrap();

        assert_eq!(example.id, "42");
        assert_eq!(example.ts, "2024-04-16 10:00:00");
    }

    #[test]
    fn test_null_nested_values_take_zero_values() {
        let report: DigestReport = serde_json::from_str(
            r#"{"global": null, "classes": [
                {"checksum": "A", "metrics": null, "example": null, "query_count": null,
                 "histograms": null, "tables": null},
                {"checksum": "B", "metrics": {"Query_time": null, "db": null, "user": {"value": null}}}
            ]}"#,
        )
        .unwrap();

        assert_eq!(report.global.query_count, 0);
        assert_eq!(report.classes.len(), 2);
        let a = &report.classes[0];
        assert_eq!(a.query_count, 0);
        assert_eq!(a.metrics.query_time.pct_95, "");
        assert_eq!(a.example.query, "");
        assert!(a.histograms.query_time.is_empty());
        assert!(a.tables.is_none());
        let b = &report.classes[1];
        assert_eq!(b.metrics.query_time, MetricStats::default());
        assert_eq!(b.metrics.db.value, "");
        assert_eq!(b.metrics.user.value, "");
    }

    #[test]
    fn test_null_classes_is_empty() {
        let report: DigestReport = serde_json::from_str(r#"{"classes": null}"#).unwrap();
        assert!(report.classes.is_empty());
    }
}
