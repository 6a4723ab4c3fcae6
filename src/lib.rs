pub mod analyze_cmd;
pub mod config;
pub mod core;
pub mod digest;
pub mod publish;
pub mod report;
pub mod storage;

use thiserror::Error;

pub use crate::core::ExtractionError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to decode digest JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("malformed table reference: {0}")]
    Extraction(#[from] ExtractionError),
    #[error("failed to compile report template: {0}")]
    Template(#[source] minijinja::Error),
    #[error("report template references unknown helper(s): {name}")]
    UnknownHelper { name: String },
    #[error("failed to render report: {0}")]
    Render(#[source] minijinja::Error),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start web server on {addr}: {reason}")]
    Network { addr: String, reason: String },
    #[error("digester failed: {0}")]
    Digest(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
