//! # nscheck configuration
//!
//! YAML-based configuration for the nscheck command-line tool.
//!
//! Every section has defaults, so an empty file (or no file at all) is a
//! valid configuration. JSON and TOML are accepted as well, selected by file
//! extension.
//!
//! ```yaml
//! zones:
//!   dirs:
//!     - /etc/bind/zones/forward
//!     - /etc/bind/zones/reverse
//! report:
//!   separator: "\n"
//!   format: text
//! logging:
//!   level: warn
//! watch:
//!   enabled: false
//!   debounce_ms: 500
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub mod watch;

pub use watch::ZoneWatcher;

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("File not found: {0}")]
    NotFound(PathBuf),
}

impl ConfigError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where zone files are loaded from.
    pub zones: ZonesConfig,

    /// How results are printed.
    pub report: ReportConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Re-checking on file changes.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads configuration from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;

        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => Self::from_yaml(&content)?,
        };

        Ok(config)
    }

    /// Loads configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // serde_yaml rejects an empty document; treat it as all defaults.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Default locations searched when no file is given explicitly.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("nscheck.yaml"), PathBuf::from("nscheck.yml")];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("nscheck").join("config.yaml"));
        }
        paths
    }

    /// Returns the first existing file among [`Config::search_paths`].
    pub fn find() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|p| p.exists())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        self.zones.validate()?;
        self.report.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Zone loading configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    /// Directories holding zone files, merged in order.
    pub dirs: Vec<PathBuf>,

    /// Maximum `$INCLUDE` nesting.
    pub max_include_depth: usize,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            dirs: Vec::new(),
            max_include_depth: 10,
        }
    }
}

impl ZonesConfig {
    fn validate(&self) -> Result<()> {
        if self.max_include_depth == 0 {
            return Err(ConfigError::invalid(
                "zones.max_include_depth",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Output format of the check report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One block of owner names per failed check.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
}

/// Report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Separator between owner names.
    pub separator: String,

    /// Output format.
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            separator: "\n".to_string(),
            format: ReportFormat::Text,
        }
    }
}

impl ReportConfig {
    fn validate(&self) -> Result<()> {
        if self.separator.is_empty() {
            return Err(ConfigError::invalid("report.separator", "must not be empty"));
        }
        Ok(())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON lines.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    pub level: String,

    /// Log format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
        }
    }
}

impl LoggingConfig {
    const LEVELS: [&'static str; 5] = ["trace", "debug", "info", "warn", "error"];

    fn validate(&self) -> Result<()> {
        let level = self.level.to_ascii_lowercase();
        if !Self::LEVELS.contains(&level.as_str()) {
            return Err(ConfigError::invalid(
                "logging.level",
                format!("unknown level '{}'", self.level),
            ));
        }
        Ok(())
    }
}

/// Watch mode configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Keep running and re-check on changes.
    pub enabled: bool,

    /// Quiet period after the last change before re-checking.
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            debounce_ms: 500,
        }
    }
}

impl WatchConfig {
    /// Returns the debounce interval.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.zones.dirs.is_empty());
        assert_eq!(config.zones.max_include_depth, 10);
        assert_eq!(config.report.separator, "\n");
        assert_eq!(config.report.format, ReportFormat::Text);
        assert_eq!(config.logging.level, "info");
        assert!(!config.watch.enabled);
        assert_eq!(config.watch.debounce(), Duration::from_millis(500));
        config.validate().unwrap();
    }

    #[test]
    fn test_from_yaml() {
        let config = Config::from_yaml(
            r"
zones:
  dirs: [forward, reverse]
report:
  separator: ', '
  format: json
logging:
  level: debug
  format: json
",
        )
        .unwrap();
        assert_eq!(
            config.zones.dirs,
            vec![PathBuf::from("forward"), PathBuf::from("reverse")]
        );
        assert_eq!(config.zones.max_include_depth, 10);
        assert_eq!(config.report.separator, ", ");
        assert_eq!(config.report.format, ReportFormat::Json);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(!config.watch.enabled);
    }

    #[test]
    fn test_empty_yaml() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = TempDir::new().unwrap();

        let toml_path = dir.path().join("nscheck.toml");
        fs::write(
            &toml_path,
            "[zones]\ndirs = [\"zones\"]\n\n[watch]\nenabled = true\ndebounce_ms = 50\n",
        )
        .unwrap();
        let config = Config::from_file(&toml_path).unwrap();
        assert_eq!(config.zones.dirs, vec![PathBuf::from("zones")]);
        assert!(config.watch.enabled);
        assert_eq!(config.watch.debounce_ms, 50);

        let json_path = dir.path().join("nscheck.json");
        fs::write(&json_path, r#"{"report": {"separator": ";"}}"#).unwrap();
        assert_eq!(Config::from_file(&json_path).unwrap().report.separator, ";");

        let yaml_path = dir.path().join("nscheck.yaml");
        fs::write(&yaml_path, "logging:\n  level: warn\n").unwrap();
        assert_eq!(Config::from_file(&yaml_path).unwrap().logging.level, "warn");
    }

    #[test]
    fn test_from_file_errors() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::NotFound(_))
        ));

        let bad = dir.path().join("bad.yaml");
        fs::write(&bad, "report:\n  format: xml\n").unwrap();
        assert!(matches!(Config::from_file(&bad), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn test_validation() {
        let mut config = Config::default();
        config.report.separator.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "report.separator"
        ));

        let mut config = Config::default();
        config.zones.max_include_depth = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "WARN".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_search_paths() {
        let paths = Config::search_paths();
        assert_eq!(paths[0], PathBuf::from("nscheck.yaml"));
        assert_eq!(paths[1], PathBuf::from("nscheck.yml"));
    }
}
