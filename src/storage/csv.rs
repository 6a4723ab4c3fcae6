//! CSV export for ranked slow query records.

use std::io::Write;
use std::path::Path;

use crate::core::SlowQueryRecord;
use crate::{ReportError, ReportResult};

/// CSV column headers in deterministic order.
pub const CSV_HEADERS: &[&str] = &[
    "rank",
    "id",
    "database",
    "user",
    "host",
    "query_count",
    "time_p95",
    "time_max",
    "time_min",
    "time_median",
    "lock_time_max",
    "lock_time_min",
    "lock_time_p95",
    "rows_examined_sum",
    "rows_examined_max",
    "rows_sent_max",
    "query_length_sum",
    "query_length_max",
    "tables",
    "query_id",
    "timestamp",
    "sql",
];

/// Separator between table names inside the `tables` column.
pub const TABLE_SEPARATOR: &str = ";";

/// CSV exporter for ranked records.
///
/// Rows are written in the order given, with a 1-based `rank` column.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    pub fn new() -> Self {
        CsvExporter
    }

    /// Export records to a CSV file, creating parent directories as needed.
    pub fn export(&self, records: &[SlowQueryRecord], output: &Path) -> ReportResult<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| ReportError::Io {
                    context: format!("failed to create directory {}", parent.display()),
                    source,
                })?;
            }
        }

        let file = std::fs::File::create(output).map_err(|source| ReportError::Io {
            context: format!("failed to create {}", output.display()),
            source,
        })?;

        self.export_to_writer(records, file)
    }

    /// Export records to any writer.
    pub fn export_to_writer<W: Write>(
        &self,
        records: &[SlowQueryRecord],
        writer: W,
    ) -> ReportResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer
            .write_record(CSV_HEADERS)
            .map_err(|e| ReportError::Message(format!("failed to write CSV headers: {e}")))?;

        for (i, record) in records.iter().enumerate() {
            let row = self.record_to_row(i + 1, record);
            csv_writer
                .write_record(&row)
                .map_err(|e| ReportError::Message(format!("failed to write CSV row: {e}")))?;
        }

        csv_writer
            .flush()
            .map_err(|e| ReportError::Message(format!("failed to flush CSV writer: {e}")))?;

        Ok(())
    }

    fn record_to_row(&self, rank: usize, record: &SlowQueryRecord) -> Vec<String> {
        vec![
            rank.to_string(),
            record.id.clone(),
            record.database.clone(),
            record.user.clone(),
            record.host.clone(),
            record.query_count.to_string(),
            record.time_p95.clone(),
            record.time_max.clone(),
            record.time_min.clone(),
            record.time_median.clone(),
            record.lock_time_max.clone(),
            record.lock_time_min.clone(),
            record.lock_time_p95.clone(),
            record.rows_examined_sum.clone(),
            record.rows_examined_max.clone(),
            record.rows_sent_max.clone(),
            record.query_length_sum.clone(),
            record.query_length_max.clone(),
            record.query_tables.join(TABLE_SEPARATOR),
            record.query_id.clone(),
            record.timestamp.clone(),
            record.sql.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_record(id: &str, p95: &str) -> SlowQueryRecord {
        SlowQueryRecord {
            id: id.to_string(),
            time_p95: p95.to_string(),
            database: "shop".to_string(),
            query_count: 3,
            query_tables: vec!["orders".to_string(), "users".to_string()],
            sql: "SELECT a, b FROM orders".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_record_to_row_length() {
        let exporter = CsvExporter::new();
        let row = exporter.record_to_row(1, &make_test_record("A", "1.0"));
        assert_eq!(row.len(), CSV_HEADERS.len());
    }

    #[test]
    fn test_export_to_writer() {
        let exporter = CsvExporter::new();
        let records = vec![make_test_record("A", "2.0"), make_test_record("B", "1.0")];

        let mut buffer = Vec::new();
        exporter.export_to_writer(&records, &mut buffer).unwrap();

        let csv_str = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = csv_str.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("rank,id,database"));
        assert!(lines[1].starts_with("1,A,shop"));
        assert!(lines[2].starts_with("2,B,shop"));
        assert!(lines[1].contains("orders;users"));
        // SQL contains a comma, so it is quoted
        assert!(lines[1].ends_with("\"SELECT a, b FROM orders\""));
    }

    #[test]
    fn test_export_empty_records() {
        let exporter = CsvExporter::new();

        let mut buffer = Vec::new();
        exporter.export_to_writer(&[], &mut buffer).unwrap();

        let csv_str = String::from_utf8(buffer).unwrap();
        assert_eq!(csv_str.lines().count(), 1);
    }

    #[test]
    fn test_export_to_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let output_path = dir.path().join("exports").join("ranked.csv");

        CsvExporter::new()
            .export(&[make_test_record("A", "1.0")], &output_path)
            .unwrap();

        let contents = std::fs::read_to_string(&output_path).unwrap();
        assert!(contents.contains("rank,id"));
        assert!(contents.contains("1,A,shop"));
    }
}
