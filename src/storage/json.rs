//! JSON export for ranked slow query records.

use std::fs;
use std::path::Path;

use crate::core::SlowQueryRecord;
use crate::{ReportError, ReportResult};

/// Write records as a pretty-printed JSON array, in the order given.
pub fn write_records_json(records: &[SlowQueryRecord], output: &Path) -> ReportResult<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|source| ReportError::Io {
                context: format!("failed to create directory {}", parent.display()),
                source,
            })?;
        }
    }

    let json = serde_json::to_vec_pretty(records)
        .map_err(|e| ReportError::Message(format!("failed to serialize records: {e}")))?;

    fs::write(output, json).map_err(|source| ReportError::Io {
        context: format!("failed to write {}", output.display()),
        source,
    })
}

/// Read records previously written by [`write_records_json`].
pub fn read_records_json(path: &Path) -> ReportResult<Vec<SlowQueryRecord>> {
    let bytes = fs::read(path).map_err(|source| ReportError::Io {
        context: format!("failed to read {}", path.display()),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(ReportError::Decode)
}
