//! CLI command handler for a full analysis run.
//!
//! digest -> decode -> extract tables / normalize -> rank -> render, then
//! optional exports and optional publishing.

use std::path::PathBuf;
use std::time::Instant;

use tracing::info;

use crate::config::AnalysisConfig;
use crate::core::{build_records, decode_report_file};
use crate::digest::{DigestProvider, ExistingDigest, PtQueryDigest};
use crate::publish;
use crate::report::{ReportDocument, ReportRenderer, now_local, report_file_name};
use crate::storage::{CsvExporter, write_records_json};
use crate::{ReportError, ReportResult};

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub file_name: String,
    pub log_files: usize,
    pub query_classes: usize,
    pub elapsed_secs: f64,
}

/// Pick the digest source the config asks for.
pub fn digest_provider(config: &AnalysisConfig) -> Box<dyn DigestProvider> {
    match &config.digest_json {
        Some(path) => Box::new(ExistingDigest::new(path)),
        None => Box::new(PtQueryDigest::new(config.digest.clone())),
    }
}

/// Run the analysis and, when a port is configured, publish the report and
/// block until a termination signal.
pub fn run(config: &AnalysisConfig) -> ReportResult<RunSummary> {
    let provider = digest_provider(config);
    let summary = generate(config, provider.as_ref())?;
    print_summary(config, &summary);

    match config.publish_port() {
        Some(port) => publish::publish(port, &config.output_dir, &summary.file_name)?,
        None => {
            eprintln!("\nHint: pass --port to serve the report over HTTP");
            let flags: Vec<String> = config
                .log_files
                .iter()
                .map(|p| format!("-f {}", p.display()))
                .collect();
            eprintln!("Example: slowsql-analysis {} --port 6033\n", flags.join(" "));
        }
    }
    Ok(summary)
}

/// Produce the report file without publishing it.
pub fn generate(
    config: &AnalysisConfig,
    provider: &dyn DigestProvider,
) -> ReportResult<RunSummary> {
    let started = Instant::now();

    eprintln!("Analyzing slow query logs...");
    for (i, log) in config.log_files.iter().enumerate() {
        eprintln!("  log file {}: {}", i + 1, log.display());
    }
    if let Some(window) = &config.window {
        eprintln!("  window: {} to {}", window.since(), window.until());
    }

    let scratch = tempfile::tempdir().map_err(|source| ReportError::Io {
        context: "failed to create scratch directory".to_string(),
        source,
    })?;
    info!(digester = %provider.name(), "digesting logs");
    let digest_path = provider.digest(&config.log_files, config.window.as_ref(), scratch.path())?;

    let digest = decode_report_file(&digest_path)?;
    let class_count = digest.classes.len();
    info!(classes = class_count, "processing query classes");
    let records = build_records(digest, config.malformed_tables)?;

    let generated_at = now_local();
    let file_name = report_file_name(&config.basename, generated_at);
    let report_path = config.output_dir.join(&file_name);

    // Exports come from the same ranked sequence the report shows.
    if let Some(path) = &config.json_out {
        write_records_json(&records, path)?;
        info!(path = %path.display(), "wrote JSON export");
    }
    if let Some(path) = &config.csv_out {
        CsvExporter::new().export(&records, path)?;
        info!(path = %path.display(), "wrote CSV export");
    }

    let renderer = ReportRenderer::standard()?;
    let doc = ReportDocument::new(generated_at, records, &config.log_files);
    info!(path = %report_path.display(), "rendering HTML report");
    renderer.render_to_path(&doc, &report_path)?;

    Ok(RunSummary {
        report_path,
        file_name,
        log_files: config.log_files.len(),
        query_classes: class_count,
        elapsed_secs: started.elapsed().as_secs_f64(),
    })
}

fn print_summary(config: &AnalysisConfig, summary: &RunSummary) {
    eprintln!("========================================");
    eprintln!("Analysis complete");
    eprintln!("- log files analyzed: {}", summary.log_files);
    eprintln!("- query classes: {}", summary.query_classes);
    eprintln!("- elapsed: {:.2}s", summary.elapsed_secs);
    eprintln!("- report: {}", summary.report_path.display());
    if let Some(path) = &config.json_out {
        eprintln!("- JSON export: {}", path.display());
    }
    if let Some(path) = &config.csv_out {
        eprintln!("- CSV export: {}", path.display());
    }
    eprintln!("========================================");
}
