//! External slow-log digester.
//!
//! The digester turns raw slow query logs into the JSON document decoded by
//! [`crate::core::decode`]. Percona's `pt-query-digest` is the default.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, info};

use crate::config::{AnalysisWindow, DigestConfig};
use crate::{ReportError, ReportResult};

/// Produces a digest JSON document for a set of slow logs.
pub trait DigestProvider {
    /// Digest `logs` and return the path of the JSON document.
    ///
    /// `scratch` is a directory the provider may write into; it outlives the
    /// returned path's use.
    fn digest(
        &self,
        logs: &[PathBuf],
        window: Option<&AnalysisWindow>,
        scratch: &Path,
    ) -> ReportResult<PathBuf>;

    fn name(&self) -> String;
}

/// Runs `pt-query-digest` (or a compatible binary) with JSON output.
pub struct PtQueryDigest {
    config: DigestConfig,
}

impl PtQueryDigest {
    pub fn new(config: DigestConfig) -> Self {
        PtQueryDigest { config }
    }

    /// Build the digester command line. Stdout is not redirected here.
    pub fn build_command(&self, logs: &[PathBuf], window: Option<&AnalysisWindow>) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(logs)
            .args(["--output", "json", "--noversion-check", "--progress", "time,1"])
            .arg(format!("--charset={}", self.config.charset));
        if let Some(window) = window {
            if let Some(tz) = &self.config.time_zone {
                cmd.arg("--set-vars").arg(format!("time_zone={tz}"));
            }
            cmd.arg(format!("--since={}", window.since()))
                .arg(format!("--until={}", window.until()));
        }
        cmd.args(&self.config.extra_args);
        cmd
    }
}

impl DigestProvider for PtQueryDigest {
    fn digest(
        &self,
        logs: &[PathBuf],
        window: Option<&AnalysisWindow>,
        scratch: &Path,
    ) -> ReportResult<PathBuf> {
        if logs.is_empty() {
            return Err(ReportError::Config("no slow query log files given".to_string()));
        }
        for log in logs {
            if !log.exists() {
                return Err(ReportError::Config(format!(
                    "log file not found: {}",
                    log.display()
                )));
            }
        }

        let out_path = scratch.join("digest.json");
        let out = File::create(&out_path).map_err(|source| ReportError::Io {
            context: format!("failed to create {}", out_path.display()),
            source,
        })?;

        let mut cmd = self.build_command(logs, window);
        cmd.stdout(Stdio::from(out)).stderr(Stdio::inherit());
        debug!(command = ?cmd, "spawning digester");
        info!(binary = %self.config.binary.display(), logs = logs.len(), "running digester");

        let status = cmd.status().map_err(|e| {
            ReportError::Digest(format!(
                "failed to run {}: {e}",
                self.config.binary.display()
            ))
        })?;
        if !status.success() {
            return Err(ReportError::Digest(format!(
                "{} exited with {status}; check log file permissions and that the digester's Perl modules are installed",
                self.config.binary.display()
            )));
        }

        Ok(out_path)
    }

    fn name(&self) -> String {
        self.config.binary.display().to_string()
    }
}

/// Uses a digest JSON document that already exists on disk.
pub struct ExistingDigest {
    path: PathBuf,
}

impl ExistingDigest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ExistingDigest { path: path.into() }
    }
}

impl DigestProvider for ExistingDigest {
    fn digest(
        &self,
        _logs: &[PathBuf],
        _window: Option<&AnalysisWindow>,
        _scratch: &Path,
    ) -> ReportResult<PathBuf> {
        if !self.path.exists() {
            return Err(ReportError::Config(format!(
                "digest file not found: {}",
                self.path.display()
            )));
        }
        Ok(self.path.clone())
    }

    fn name(&self) -> String {
        format!("existing:{}", self.path.display())
    }
}
