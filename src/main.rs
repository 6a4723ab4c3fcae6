#![forbid(unsafe_code)]

use std::ffi::OsString;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use slowsql_report::config::{AnalysisConfig, AnalysisWindow, FileConfig, load_file_config, split_args};
use slowsql_report::core::MalformedTablePolicy;
use slowsql_report::{ReportError, ReportResult, analyze_cmd};

#[derive(Parser, Debug)]
#[command(name = "slowsql-analysis")]
#[command(about = "Ranked HTML reports from MySQL slow query logs", long_about = None)]
#[command(after_help = "Examples:\n  \
    slowsql-analysis -f /var/log/mysql-slow1.log -f /var/log/mysql-slow2.log\n  \
    slowsql-analysis -f /var/log/mysql-slow.log --port 6033\n  \
    slowsql-analysis -f /var/log/mysql-slow.log --start-time \"2024-04-16 00:00:00\" --end-time \"2024-04-16 23:59:59\"\n\n\
    Single-dash -port, -startTime and -endTime are accepted as well.")]
struct Cli {
    /// Enable verbose logging (or set SLOWSQL_LOG)
    #[arg(long)]
    verbose: bool,

    /// Slow query log file (repeatable)
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,

    /// Serve the report over HTTP on this port after generating it
    #[arg(long)]
    port: Option<u16>,

    /// Start of the analysis window (yyyy-mm-dd HH:mm:ss)
    #[arg(long = "start-time", alias = "startTime", requires = "end_time")]
    start_time: Option<String>,

    /// End of the analysis window (yyyy-mm-dd HH:mm:ss)
    #[arg(long = "end-time", alias = "endTime", requires = "start_time")]
    end_time: Option<String>,

    /// TOML file with run defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report file name prefix
    #[arg(long)]
    basename: Option<String>,

    /// Directory the report is written to (and served from)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Path to the digester binary (default: pt-query-digest)
    #[arg(long)]
    digester: Option<PathBuf>,

    /// Extra arguments passed to the digester (shell-quoted)
    #[arg(long, allow_hyphen_values = true)]
    digester_args: Option<String>,

    /// Use an existing digest JSON instead of running the digester
    #[arg(long, value_name = "digest.json")]
    digest_json: Option<PathBuf>,

    /// Fail the run when a table reference cannot be parsed
    #[arg(long)]
    strict_tables: bool,

    /// Write ranked records as JSON to this file
    #[arg(long)]
    json: Option<PathBuf>,

    /// Write ranked records as CSV to this file
    #[arg(long)]
    csv: Option<PathBuf>,
}

/// Single-dash long flags from earlier releases and their current spelling.
const LEGACY_FLAGS: &[(&str, &str)] = &[
    ("-port", "--port"),
    ("-startTime", "--start-time"),
    ("-endTime", "--end-time"),
];

/// Rewrite `-port 6033` / `-port=6033` style flags into the long form.
///
/// Any argument before a bare `--` that names a legacy flag is rewritten,
/// including one in value position; pass such a value as
/// `--digester-args=-port` to keep it literal. Non-UTF-8 arguments pass
/// through unchanged.
fn normalize_legacy_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut out = Vec::new();
    let mut passthrough = false;
    for arg in args {
        if passthrough || arg.to_str().is_none() {
            out.push(arg);
            continue;
        }
        let text = arg.to_str().unwrap_or_default();
        if text == "--" {
            passthrough = true;
            out.push(arg);
            continue;
        }
        let (name, value) = match text.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (text, None),
        };
        let rewritten = LEGACY_FLAGS
            .iter()
            .find(|(legacy, _)| *legacy == name)
            .map(|(_, long)| match value {
                Some(value) => OsString::from(format!("{long}={value}")),
                None => OsString::from(*long),
            });
        out.push(rewritten.unwrap_or(arg));
    }
    out
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("SLOWSQL_LOG").unwrap_or_else(|_| {
        if verbose { "slowsql_report=debug".to_string() } else { "slowsql_report=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

/// Ask for one log path on stdin when none was given.
fn prompt_log_file() -> ReportResult<PathBuf> {
    eprintln!("Usage: slowsql-analysis -f <slow log> [-f <slow log> ...] [--port <port>]");
    eprint!("Slow query log file path: ");
    let _ = std::io::stderr().flush();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|source| ReportError::Io {
            context: "failed to read log file path".to_string(),
            source,
        })?;
    let line = line.trim();
    if line.is_empty() {
        return Err(ReportError::Config("no slow query log file given".to_string()));
    }
    Ok(PathBuf::from(line))
}

fn build_config(cli: Cli) -> ReportResult<AnalysisConfig> {
    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    let mut log_files = cli.files;
    if log_files.is_empty() && cli.digest_json.is_none() {
        log_files.push(prompt_log_file()?);
    }

    let mut config = AnalysisConfig::from_file(log_files, &file);
    config.window = AnalysisWindow::parse(cli.start_time.as_deref(), cli.end_time.as_deref())?;
    if let Some(port) = cli.port {
        config.port = Some(port);
    }
    if let Some(basename) = cli.basename {
        config.basename = basename;
    }
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(digester) = cli.digester {
        config.digest.binary = digester;
    }
    if let Some(args) = cli.digester_args {
        config.digest.extra_args = split_args(&args);
    }
    if cli.strict_tables {
        config.malformed_tables = MalformedTablePolicy::Abort;
    }
    config.digest_json = cli.digest_json;
    config.json_out = cli.json;
    config.csv_out = cli.csv;
    Ok(config)
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));
    init_tracing(cli.verbose);

    let result = build_config(cli).and_then(|config| analyze_cmd::run(&config));

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
