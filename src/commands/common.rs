//! Setup shared by every collection command: logging, credentials, configuration, and the client.

use super::{Host, ProgressReporter};
use crate::Result;
use crate::collectors::{CollectionSummary, InputWindow};
use crate::config::Config;
use crate::facts::{GitHubClient, TokenRotator};
use crate::reports::CsvSink;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use core::time::Duration;
use ohno::IntoAppError;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Arc;

const LOG_TARGET: &str = "   harvest";

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

/// Arguments shared by all collection commands
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// GitHub personal access token (may be repeated to rotate between several tokens)
    #[arg(long = "token", value_name = "TOKEN")]
    pub tokens: Vec<String>,

    /// File with one access token per line (`#` starts a comment)
    #[arg(long, value_name = "PATH")]
    pub tokens_file: Option<Utf8PathBuf>,

    /// Path to configuration file (default is `harvest.toml`, `harvest.yml`, `harvest.yaml` or `harvest.json`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory for output files, overriding the configuration
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "none")]
    pub log_level: LogLevel,

    /// Write log output to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<Utf8PathBuf>,

    /// Number of input items to skip, to resume an interrupted run
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub skip: usize,

    /// Maximum number of input items to process
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

/// Initialize logger based on log level
fn init_logging(log_level: LogLevel, log_file: Option<&Utf8Path>) -> Result<()> {
    let level = match log_level {
        LogLevel::None => return Ok(()),
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    let mut builder = env_logger::Builder::from_env(env);
    let _ = builder
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .into_app_err_with(|| format!("opening log file {path}"))?;
        let _ = builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // A logger may already be installed when commands run more than once in a process.
    let _ = builder.try_init();
    Ok(())
}

/// Everything a collection command needs once startup has succeeded.
#[derive(Debug)]
pub struct Session {
    pub config: Config,
    pub client: GitHubClient,
    pub window: InputWindow,
    pub progress: ProgressReporter,
}

impl Session {
    /// Prepare logging, configuration, credentials, and the API client.
    ///
    /// Fails when the configuration cannot be loaded or no access token is available.
    pub fn new<H: Host>(host: &mut H, args: &CommonArgs) -> Result<Self> {
        init_logging(args.log_level, args.log_file.as_deref())?;

        match dotenvy::dotenv() {
            Ok(path) => log::debug!(target: LOG_TARGET, "Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!(target: LOG_TARGET, "Could not load .env file: {e}"),
        }

        let (mut config, warnings) = Config::load(Utf8Path::new("."), args.config.as_ref())?;
        for warning in &warnings {
            let _ = writeln!(host.error(), "⚠️ {warning}");
        }

        if let Some(dir) = &args.output_dir {
            config.output_dir.clone_from(dir);
        }

        let tokens = Arc::new(TokenRotator::discover(&args.tokens, args.tokens_file.as_deref())?);
        let client = GitHubClient::new(&config, tokens)?;

        // The bar would fight with log lines on stderr, so it only shows when logging is off.
        let delay = if args.log_level == LogLevel::None && args.log_file.is_none() {
            Duration::from_millis(300)
        } else {
            Duration::from_hours(365 * 24)
        };

        Ok(Self {
            config,
            client,
            window: InputWindow::new(args.skip, args.limit),
            progress: ProgressReporter::new(delay),
        })
    }

    /// Open the output file named `file_name` inside the output directory.
    pub fn open_output(&self, file_name: &str) -> Result<CsvSink> {
        CsvSink::open(self.config.output_path(file_name))
    }

    /// Path of an input file: the explicit one, or the named file inside the output directory.
    #[must_use]
    pub fn input_path(&self, explicit: Option<&Utf8PathBuf>, default_name: &str) -> Utf8PathBuf {
        explicit.cloned().unwrap_or_else(|| self.config.output_path(default_name))
    }

    /// Report a finished stage and persist the identifiers it missed.
    pub fn finish<H: Host>(&self, host: &mut H, sink: &CsvSink, summary: &CollectionSummary) -> Result<()> {
        let _ = writeln!(host.output(), "{summary}");
        let _ = writeln!(host.output(), "Output: {}", sink.path());

        if let Some(path) = summary.write_missed(&self.config.output_dir)? {
            let _ = writeln!(host.output(), "Missed items listed in {path}");
        }

        Ok(())
    }
}
