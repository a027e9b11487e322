use crate::error::{Error, Result};

use serde::Deserialize;
use std::collections::BTreeMap;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;

/// Output layout of each log line.
#[derive(Debug, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
  /// Human readable, one event per line.
  #[default]
  Pattern,
  /// One JSON object per line.
  Json,
}

/// Logging configuration, usually loaded from `stratum_logging.yaml`.
///
/// ```yaml
/// level: info
/// format: pattern
/// with_thread_ids: true
/// targets:
///   stratum_channel: debug
///   stratum_channel::registry: warn
/// ```
#[derive(Debug, Deserialize, PartialEq, Eq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
  #[serde(default = "default_level")]
  pub level: String,
  #[serde(default)]
  pub format: LogFormat,
  /// Per-target overrides of `level`, keyed by module path prefix.
  #[serde(default)]
  pub targets: BTreeMap<String, String>,
  #[serde(default = "default_ansi")]
  pub ansi: bool,
  #[serde(default)]
  pub with_thread_ids: bool,
}

fn default_level() -> String {
  "info".to_string()
}

fn default_ansi() -> bool {
  true
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_level(),
      format: LogFormat::default(),
      targets: BTreeMap::new(),
      ansi: default_ansi(),
      with_thread_ids: false,
    }
  }
}

impl LoggingConfig {
  /// Parses and validates a YAML document.
  pub fn from_yaml_str(yaml: &str) -> Result<Self> {
    let config: LoggingConfig =
      serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse(e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  /// Checks that every level names a valid filter.
  pub fn validate(&self) -> Result<()> {
    parse_level("level", &self.level)?;
    for (target, level) in &self.targets {
      if target.is_empty() {
        return Err(Error::InvalidConfigValue {
          field: "targets".to_string(),
          message: "target names cannot be empty".to_string(),
        });
      }
      parse_level(&format!("targets.{}", target), level)?;
    }
    Ok(())
  }

  /// Renders the configuration as `EnvFilter` directives, e.g.
  /// `info,stratum_channel=debug`.
  pub fn directives(&self) -> String {
    let mut directives = vec![self.level.trim().to_ascii_lowercase()];
    for (target, level) in &self.targets {
      directives.push(format!("{}={}", target, level.trim().to_ascii_lowercase()));
    }
    directives.join(",")
  }
}

fn parse_level(field: &str, level: &str) -> Result<LevelFilter> {
  LevelFilter::from_str(level.trim()).map_err(|_| Error::InvalidConfigValue {
    field: field.to_string(),
    message: format!("'{}' is not one of off, error, warn, info, debug, trace", level),
  })
}
