//! Machine-readable exports of the ranked records.

pub mod csv;
pub mod json;

// Re-export key types
pub use csv::{CSV_HEADERS, CsvExporter};
pub use json::{read_records_json, write_records_json};
