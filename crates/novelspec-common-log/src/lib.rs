//! Logging infrastructure for NovelSpec.
//!
//! All log output goes to stderr (and optionally a file) so that command
//! output on stdout stays machine-readable.

use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
    /// Log file path (if file logging enabled).
    pub file_path: Option<PathBuf>,
    /// Include source location.
    pub source_location: bool,
    /// Include span events.
    pub span_events: bool,
    /// Emit ANSI colors on stderr.
    pub ansi: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    #[default]
    Warn,
    Error,
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing_subscriber::filter::LevelFilter::TRACE,
            LogLevel::Debug => tracing_subscriber::filter::LevelFilter::DEBUG,
            LogLevel::Info => tracing_subscriber::filter::LevelFilter::INFO,
            LogLevel::Warn => tracing_subscriber::filter::LevelFilter::WARN,
            LogLevel::Error => tracing_subscriber::filter::LevelFilter::ERROR,
        }
    }
}

impl LogLevel {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Level for a `-v` count, with `-q` forcing errors only.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        match verbose {
            0 if quiet => Self::Error,
            0 => Self::Warn,
            1 => Self::Info,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON structured format.
    Json,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            file_path: None,
            source_location: false,
            span_events: false,
            ansi: true,
        }
    }
}

fn env_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl LogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(level) = std::env::var("NOVELSPEC_LOG_LEVEL") {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        } else if let Ok(level) = std::env::var("RUST_LOG") {
            if let Some(l) = LogLevel::parse(&level) {
                config.level = l;
            }
        }

        if let Ok(format) = std::env::var("NOVELSPEC_LOG_FORMAT") {
            config.format = match format.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "compact" => LogFormat::Compact,
                _ => LogFormat::Pretty,
            };
        }

        if let Ok(file_path) = std::env::var("NOVELSPEC_LOG_FILE") {
            config.file_path = Some(PathBuf::from(file_path));
        }

        if let Ok(source_location) = std::env::var("NOVELSPEC_LOG_SOURCE") {
            config.source_location = env_flag(&source_location);
        }

        if let Ok(span_events) = std::env::var("NOVELSPEC_LOG_SPANS") {
            config.span_events = env_flag(&span_events);
        }

        if std::env::var_os("NO_COLOR").is_some() {
            config.ansi = false;
        }

        config
    }

    /// Override the level, keeping everything else.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }
}

/// Initialize logging with the given configuration.
pub fn init(config: LogConfig) -> Result<(), LogError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let registry = tracing_subscriber::registry().with(filter);

    let file = match &config.file_path {
        Some(path) => Some(Mutex::new(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?,
        )),
        None => None,
    };

    match config.format {
        LogFormat::Pretty => {
            let stderr_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(config.ansi)
                .with_target(true)
                .with_file(config.source_location)
                .with_line_number(config.source_location)
                .with_span_events(span_events.clone());
            let file_layer = file.map(|f| {
                fmt::layer()
                    .with_writer(f)
                    .with_ansi(false)
                    .with_target(true)
                    .with_span_events(span_events)
            });

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        LogFormat::Compact => {
            let stderr_layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(config.ansi)
                .with_span_events(span_events.clone());
            let file_layer = file.map(|f| {
                fmt::layer()
                    .compact()
                    .with_writer(f)
                    .with_ansi(false)
                    .with_span_events(span_events)
            });

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
        LogFormat::Json => {
            let stderr_layer = fmt::layer()
                .json()
                .with_writer(io::stderr)
                .with_span_events(span_events.clone());
            let file_layer = file.map(|f| {
                fmt::layer()
                    .json()
                    .with_writer(f)
                    .with_span_events(span_events)
            });

            registry
                .with(stderr_layer)
                .with(file_layer)
                .try_init()
                .map_err(|e| LogError::InitError(e.to_string()))?;
        }
    }

    Ok(())
}

/// Logging errors.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("failed to initialize logging: {0}")]
    InitError(String),

    #[error("failed to open log file: {0}")]
    FileError(#[from] io::Error),
}

/// Convenience macros re-exported from tracing.
pub use tracing::{debug, error, info, trace, warn};

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_log_level_parse() {
        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("DEBUG"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("Warning"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_from_verbosity() {
        assert_eq!(LogLevel::from_verbosity(0, true), LogLevel::Error);
        assert_eq!(LogLevel::from_verbosity(0, false), LogLevel::Warn);
        assert_eq!(LogLevel::from_verbosity(1, false), LogLevel::Info);
        assert_eq!(LogLevel::from_verbosity(2, false), LogLevel::Debug);
        assert_eq!(LogLevel::from_verbosity(7, false), LogLevel::Trace);
    }

    #[test]
    fn test_log_level_from() {
        use tracing_subscriber::filter::LevelFilter;
        assert_eq!(LevelFilter::from(LogLevel::Trace), LevelFilter::TRACE);
        assert_eq!(LevelFilter::from(LogLevel::Warn), LevelFilter::WARN);
        assert_eq!(LevelFilter::from(LogLevel::Error), LevelFilter::ERROR);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_path.is_none());
        assert!(!config.source_location);
        assert!(!config.span_events);
    }

    // Single test touching the environment so parallel tests don't race.
    #[test]
    fn test_config_from_env() {
        let keys = [
            "NOVELSPEC_LOG_LEVEL",
            "NOVELSPEC_LOG_FORMAT",
            "NOVELSPEC_LOG_FILE",
            "NOVELSPEC_LOG_SOURCE",
            "NOVELSPEC_LOG_SPANS",
            "RUST_LOG",
        ];
        let saved: Vec<_> = keys.iter().map(|k| (*k, env::var(k).ok())).collect();

        env::set_var("NOVELSPEC_LOG_LEVEL", "debug");
        env::set_var("NOVELSPEC_LOG_FORMAT", "json");
        env::set_var("NOVELSPEC_LOG_FILE", "/tmp/novelspec.log");
        env::set_var("NOVELSPEC_LOG_SOURCE", "true");
        env::set_var("NOVELSPEC_LOG_SPANS", "1");

        let config = LogConfig::from_env();
        assert_eq!(config.level, LogLevel::Debug);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_path.unwrap(), PathBuf::from("/tmp/novelspec.log"));
        assert!(config.source_location);
        assert!(config.span_events);

        env::remove_var("NOVELSPEC_LOG_LEVEL");
        env::set_var("RUST_LOG", "error");
        assert_eq!(LogConfig::from_env().level, LogLevel::Error);

        for (key, value) in saved {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}
