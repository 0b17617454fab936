//! Tracing and logging setup.
//!
//! Logs go to stderr; stdout is reserved for the report.

use nscheck_config::{Config, LogFormat};
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level.
    pub level: Level,

    /// Log format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// Derives the logging setup from the config file and command line.
    /// `--quiet` wins over `--log-level`, which wins over the file.
    pub fn resolve(config: &Config, cli_level: Option<&str>, quiet: bool) -> Self {
        let level = if quiet {
            Level::ERROR
        } else if let Some(lvl) = cli_level {
            parse_log_level(lvl)
        } else {
            parse_log_level(&config.logging.level)
        };

        Self {
            level,
            format: config.logging.format,
        }
    }
}

/// Parse log level from string
pub fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" | "warning" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the level.
pub fn init_tracing(config: &LogConfig) {
    let filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false),
                )
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(true),
                )
                .init();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Level::TRACE);
        assert_eq!(parse_log_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_log_level("Info"), Level::INFO);
        assert_eq!(parse_log_level("warning"), Level::WARN);
        assert_eq!(parse_log_level("error"), Level::ERROR);
        assert_eq!(parse_log_level("unknown"), Level::INFO);
    }

    #[test]
    fn test_resolve_precedence() {
        let mut config = Config::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Json;

        let from_file = LogConfig::resolve(&config, None, false);
        assert_eq!(from_file.level, Level::DEBUG);
        assert_eq!(from_file.format, LogFormat::Json);

        assert_eq!(
            LogConfig::resolve(&config, Some("warn"), false).level,
            Level::WARN
        );
        assert_eq!(
            LogConfig::resolve(&config, Some("trace"), true).level,
            Level::ERROR
        );
    }
}
