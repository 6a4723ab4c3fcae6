//! Run configuration, built once at startup and passed into the pipeline.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use time::PrimitiveDateTime;
use time::macros::format_description;

use crate::core::MalformedTablePolicy;
use crate::{ReportError, ReportResult};

pub const DEFAULT_BASENAME: &str = "slowsql-analysis";
pub const DEFAULT_DIGEST_BINARY: &str = "pt-query-digest";
pub const DEFAULT_CHARSET: &str = "utf8mb4";
pub const DEFAULT_TIME_ZONE: &str = "+8:00";

/// Inclusive time window handed to the digester, `yyyy-mm-dd HH:mm:ss`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

impl AnalysisWindow {
    /// Parse a window from its two bounds; both are required together.
    pub fn parse(start: Option<&str>, end: Option<&str>) -> ReportResult<Option<Self>> {
        match (start, end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                let start = parse_window_time(start)?;
                let end = parse_window_time(end)?;
                if start > end {
                    return Err(ReportError::Config(format!(
                        "start time {} is after end time {}",
                        format_window_time(start),
                        format_window_time(end)
                    )));
                }
                Ok(Some(AnalysisWindow { start, end }))
            }
            _ => Err(ReportError::Config(
                "start time and end time must be given together".to_string(),
            )),
        }
    }

    pub fn since(&self) -> String {
        format_window_time(self.start)
    }

    pub fn until(&self) -> String {
        format_window_time(self.end)
    }
}

fn parse_window_time(s: &str) -> ReportResult<PrimitiveDateTime> {
    PrimitiveDateTime::parse(
        s.trim(),
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .map_err(|e| {
        ReportError::Config(format!(
            "invalid time {s:?} (expected yyyy-mm-dd HH:mm:ss): {e}"
        ))
    })
}

fn format_window_time(t: PrimitiveDateTime) -> String {
    t.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_default()
}

/// How to invoke the external slow-log digester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestConfig {
    pub binary: PathBuf,
    pub charset: String,
    /// Session time zone applied when a window is set
    pub time_zone: Option<String>,
    pub extra_args: Vec<String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        DigestConfig {
            binary: PathBuf::from(DEFAULT_DIGEST_BINARY),
            charset: DEFAULT_CHARSET.to_string(),
            time_zone: Some(DEFAULT_TIME_ZONE.to_string()),
            extra_args: Vec::new(),
        }
    }
}

/// Everything one analysis run needs.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub log_files: Vec<PathBuf>,
    pub window: Option<AnalysisWindow>,
    pub port: Option<u16>,
    pub basename: String,
    pub output_dir: PathBuf,
    pub digest: DigestConfig,
    /// Read this digest instead of running the digester
    pub digest_json: Option<PathBuf>,
    pub malformed_tables: MalformedTablePolicy,
    pub json_out: Option<PathBuf>,
    pub csv_out: Option<PathBuf>,
}

impl AnalysisConfig {
    pub fn new(log_files: Vec<PathBuf>) -> Self {
        AnalysisConfig {
            log_files,
            window: None,
            port: None,
            basename: DEFAULT_BASENAME.to_string(),
            output_dir: PathBuf::from("."),
            digest: DigestConfig::default(),
            digest_json: None,
            malformed_tables: MalformedTablePolicy::default(),
            json_out: None,
            csv_out: None,
        }
    }

    /// Seed a config from file defaults. Command-line values are applied on top.
    pub fn from_file(log_files: Vec<PathBuf>, file: &FileConfig) -> Self {
        let mut cfg = Self::new(log_files);
        if let Some(basename) = &file.basename {
            cfg.basename = basename.clone();
        }
        if let Some(dir) = &file.output_dir {
            cfg.output_dir = dir.clone();
        }
        cfg.port = file.port.filter(|p| *p > 0);
        if let Some(policy) = file.malformed_tables {
            cfg.malformed_tables = policy;
        }
        if let Some(binary) = &file.digest.binary {
            cfg.digest.binary = binary.clone();
        }
        if let Some(charset) = &file.digest.charset {
            cfg.digest.charset = charset.clone();
        }
        if let Some(tz) = &file.digest.time_zone {
            cfg.digest.time_zone = if tz.is_empty() { None } else { Some(tz.clone()) };
        }
        if let Some(args) = &file.digest.extra_args {
            cfg.digest.extra_args = split_args(args);
        }
        cfg
    }

    /// Port to publish on, if publishing is enabled.
    pub fn publish_port(&self) -> Option<u16> {
        self.port.filter(|p| *p > 0)
    }
}

/// Split a shell-quoted argument string.
pub fn split_args(args: &str) -> Vec<String> {
    shlex::Shlex::new(args).collect()
}

/// Optional TOML file with run defaults.
///
/// ```toml
/// basename = "prod-db"
/// output_dir = "reports"
/// port = 6033
/// malformed_tables = "abort"
///
/// [digest]
/// binary = "/opt/percona/bin/pt-query-digest"
/// charset = "utf8"
/// time_zone = "+0:00"
/// extra_args = "--limit 100%"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub basename: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub malformed_tables: Option<MalformedTablePolicy>,
    #[serde(default)]
    pub digest: FileDigestConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileDigestConfig {
    pub binary: Option<PathBuf>,
    pub charset: Option<String>,
    pub time_zone: Option<String>,
    pub extra_args: Option<String>,
}

pub fn load_file_config(path: &Path) -> ReportResult<FileConfig> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&s).map_err(|e| ReportError::Config(format!("{}: {e}", path.display())))
}
