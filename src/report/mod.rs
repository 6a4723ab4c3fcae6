//! Report rendering.
//!
//! This module provides:
//! - `ReportDocument`: the render-time aggregate (timestamp, ranked records, log files)
//! - `HelperRegistry`: named pure functions the template may call
//! - `ReportRenderer`: template compilation and HTML output

pub mod document;
pub mod helpers;
pub mod html;

// Re-export key types
pub use document::{ReportDocument, format_generate_time, now_local, report_file_name};
pub use helpers::{Helper, HelperRegistry, format_duration};
pub use html::{REPORT_TEMPLATE, ReportRenderer};
