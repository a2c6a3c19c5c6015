//! Log output for the marquee binary.
//!
//! Catalog calls, pager loads and search runs log through `tracing`. The
//! console shows what the user asked for; `logs/marquee-last-run.log` keeps
//! the whole run at TRACE.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::{Level, Subscriber};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::{MarqueeError, Result};

/// File the trace layer writes to inside the logs directory.
pub const LOG_FILE_NAME: &str = "marquee-last-run.log";

/// Environment variable holding console filter directives.
pub const LOG_FILTER_ENV: &str = "MARQUEE_LOG";

/// Installs console and file logging for this process.
///
/// `logs_dir` defaults to `./logs`. The log file is truncated on every call.
///
/// # Errors
///
/// - `MarqueeError::Io` - Logs directory or log file could not be created
/// - `MarqueeError::Configuration` - A global subscriber is already installed
pub fn init_tracing(console_level: Level, logs_dir: Option<&Path>) -> Result<()> {
    let (log_file, log_file_path) = create_log_file(logs_dir.unwrap_or(Path::new("logs")))?;

    tracing_subscriber::registry()
        .with(console_layer(console_level))
        .with(file_layer(log_file))
        .try_init()
        .map_err(|e| MarqueeError::Configuration {
            reason: format!("logging already initialized: {e}"),
        })?;

    tracing::info!(
        console = %console_level,
        file = %log_file_path.display(),
        "Logging initialized"
    );
    Ok(())
}

fn console_layer<S>(level: Level) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new(console_directives(level)));

    fmt::layer().with_target(true).with_filter(filter)
}

fn file_layer<S>(log_file: File) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(log_file)
        .with_filter(EnvFilter::new("trace"))
}

/// Console filter for a level; HTTP plumbing stays at warn.
fn console_directives(level: Level) -> String {
    let level = level.to_string().to_lowercase();
    format!("{level},hyper=warn,hyper_util=warn,reqwest=warn")
}

fn create_log_file(logs_path: &Path) -> std::io::Result<(File, PathBuf)> {
    create_dir_all(logs_path)?;
    let log_file_path = logs_path.join(LOG_FILE_NAME);
    let log_file = File::create(&log_file_path)?;
    Ok((log_file, log_file_path))
}

/// Console verbosity accepted by `--log-level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::ValueEnum;

    use super::*;

    #[test]
    fn test_log_file_is_truncated_per_run() {
        let logs_dir = tempfile::tempdir().unwrap();
        std::fs::write(logs_dir.path().join(LOG_FILE_NAME), "previous run").unwrap();

        let (_file, path) = create_log_file(logs_dir.path()).unwrap();

        assert_eq!(path, logs_dir.path().join(LOG_FILE_NAME));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "");
    }

    #[test]
    fn test_log_file_creates_missing_directory() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("run").join("logs");

        let (_file, path) = create_log_file(&nested).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_console_directives_quiet_http_stack() {
        assert_eq!(
            console_directives(Level::DEBUG),
            "debug,hyper=warn,hyper_util=warn,reqwest=warn"
        );
    }

    #[test]
    fn test_cli_level_maps_to_tracing_level() {
        let parsed = CliLogLevel::from_str("DEBUG", true).unwrap();
        assert_eq!(parsed, CliLogLevel::Debug);
        assert_eq!(Level::from(parsed), Level::DEBUG);
        assert_eq!(Level::from(CliLogLevel::Warn), Level::WARN);
        assert!(CliLogLevel::from_str("verbose", true).is_err());
    }
}
