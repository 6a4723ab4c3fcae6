//! Table name extraction from `SHOW CREATE TABLE` fragments.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::core::schema::TableRef;

static BACKTICK_IDENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"`([^`]+)`").unwrap_or_else(|e| panic!("invalid identifier pattern: {e}"))
});

/// A `create` fragment that does not name a table the expected way.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("no '.' separating database and table in {create:?}")]
    MissingPeriod { create: String },
    #[error("no backtick-delimited table name after '.' in {create:?}")]
    MissingIdentifier { create: String },
}

/// What to do with a table reference whose `create` fragment is malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedTablePolicy {
    /// Drop the reference, log a warning, keep going.
    #[default]
    Skip,
    /// Fail the whole report.
    Abort,
}

/// Parse the table name out of one `create` fragment.
///
/// The fragment is split on its first `.`; the table name is the inner text
/// of the first backtick-delimited identifier after it.
pub fn extract_table_name(create: &str) -> Result<String, ExtractionError> {
    let Some((_, rest)) = create.split_once('.') else {
        return Err(ExtractionError::MissingPeriod {
            create: create.to_string(),
        });
    };
    BACKTICK_IDENT
        .captures(rest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractionError::MissingIdentifier {
            create: create.to_string(),
        })
}

/// Collect distinct table names across a class's table references.
///
/// First occurrence wins; later duplicates are dropped without disturbing
/// the order of earlier names. A missing reference list yields no tables.
pub fn extract_tables(
    refs: Option<&[TableRef]>,
    policy: MalformedTablePolicy,
) -> Result<Vec<String>, ExtractionError> {
    let mut tables: Vec<String> = Vec::new();
    for table_ref in refs.unwrap_or_default() {
        let name = match extract_table_name(&table_ref.create) {
            Ok(name) => name,
            Err(e) => match policy {
                MalformedTablePolicy::Skip => {
                    warn!(error = %e, "skipping malformed table reference");
                    continue;
                }
                MalformedTablePolicy::Abort => return Err(e),
            },
        };
        if !tables.contains(&name) {
            tables.push(name);
        }
    }
    Ok(tables)
}
