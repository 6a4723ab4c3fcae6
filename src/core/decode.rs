//! Decoding of the digester's JSON output.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::core::schema::DigestReport;
use crate::{ReportError, ReportResult};

/// Decode one digest document from a byte stream.
///
/// The stream is read to exhaustion. Trailing non-whitespace after the
/// document is a decode error.
pub fn decode_report<R: Read>(reader: R) -> ReportResult<DigestReport> {
    let report: DigestReport = serde_json::from_reader(reader).map_err(ReportError::Decode)?;
    debug!(classes = report.classes.len(), "decoded digest report");
    Ok(report)
}

/// Decode a digest document stored on disk.
pub fn decode_report_file(path: &Path) -> ReportResult<DigestReport> {
    let file = File::open(path).map_err(|source| ReportError::Io {
        context: format!("failed to open digest output {}", path.display()),
        source,
    })?;
    decode_report(BufReader::new(file))
}
