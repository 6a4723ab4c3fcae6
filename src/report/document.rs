//! Render-time aggregate handed to the template.

use std::path::PathBuf;

use serde::Serialize;
use time::OffsetDateTime;
use time::macros::format_description;

use crate::core::SlowQueryRecord;

/// Everything the template can see. Built once, rendered once.
#[derive(Debug, Clone, Serialize)]
pub struct ReportDocument {
    /// `YYYY-MM-DD HH:MM:SS`
    pub generate_time: String,
    /// Records ranked by descending p95 query time
    pub slow_queries: Vec<SlowQueryRecord>,
    /// Log files the digest was computed from
    pub log_files: Vec<String>,
}

impl ReportDocument {
    pub fn new(
        generated_at: OffsetDateTime,
        slow_queries: Vec<SlowQueryRecord>,
        log_files: &[PathBuf],
    ) -> Self {
        ReportDocument {
            generate_time: format_generate_time(generated_at),
            slow_queries,
            log_files: log_files.iter().map(|p| p.display().to_string()).collect(),
        }
    }
}

/// Current time in the local offset, or UTC when the offset is unknown.
pub fn now_local() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

pub fn format_generate_time(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

/// `<basename>-<YYYY-MM-DD-HH-MM>.html`
pub fn report_file_name(basename: &str, at: OffsetDateTime) -> String {
    let stamp = at
        .format(format_description!("[year]-[month]-[day]-[hour]-[minute]"))
        .unwrap_or_default();
    format!("{basename}-{stamp}.html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_report_file_name() {
        let at = datetime!(2024-04-16 09:05:59 UTC);
        assert_eq!(
            report_file_name("slowsql-analysis", at),
            "slowsql-analysis-2024-04-16-09-05.html"
        );
    }

    #[test]
    fn test_document_fields() {
        let at = datetime!(2024-04-16 23:59:01 UTC);
        let doc = ReportDocument::new(
            at,
            Vec::new(),
            &[PathBuf::from("/var/log/mysql-slow1.log")],
        );

        assert_eq!(doc.generate_time, "2024-04-16 23:59:01");
        assert_eq!(doc.log_files, vec!["/var/log/mysql-slow1.log"]);
        assert!(doc.slow_queries.is_empty());
    }
}
