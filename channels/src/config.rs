// src/config.rs

//! Configuration for channels and the event writer registry.
//!
//! Configuration is parsed in two steps: YAML is deserialized into `*Raw`
//! structs that mirror the file, which are then validated into the typed
//! structs used by the rest of the crate. Durations are written in humantime
//! form (`"250ms"`, `"5s"`, `"1m 30s"`); the literal `"infinite"` means
//! "block without a deadline".

use crate::channel::Channel;
use crate::error::ConfigError;

use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const INFINITE: &str = "infinite";

pub const DEFAULT_MAX_DEPTH: usize = 128;
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

// --- Raw (file) representation ---

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct ChannelConfigRaw {
  #[serde(default)]
  pub max_depth: Option<usize>,
  /// e.g. "5s", "infinite".
  #[serde(default)]
  pub read_timeout: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfigRaw {
  /// Absent means publish with `try_write`.
  #[serde(default)]
  pub write_timeout: Option<String>,
  #[serde(default)]
  pub prune_closed: Option<bool>,
}

// --- Processed representation ---

/// Settings for a single channel and its consumer loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
  /// Maximum queue depth. Zero is legal.
  pub max_depth: usize,
  /// Per-read timeout used by consumer loops. `None` blocks indefinitely.
  pub read_timeout: Option<Duration>,
}

impl Default for ChannelConfig {
  fn default() -> Self {
    Self {
      max_depth: DEFAULT_MAX_DEPTH,
      read_timeout: Some(DEFAULT_READ_TIMEOUT),
    }
  }
}

impl ChannelConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
    let raw: ChannelConfigRaw =
      serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Self::try_from(raw)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }

  /// Creates a new, open channel with this configuration's capacity.
  pub fn build<T>(&self) -> Arc<Channel<T>> {
    Channel::create(self.max_depth)
  }
}

impl TryFrom<ChannelConfigRaw> for ChannelConfig {
  type Error = ConfigError;

  fn try_from(raw: ChannelConfigRaw) -> Result<Self, Self::Error> {
    let read_timeout = match raw.read_timeout {
      Some(text) => parse_timeout("read_timeout", &text)?,
      None => Some(DEFAULT_READ_TIMEOUT),
    };
    Ok(Self {
      max_depth: raw.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
      read_timeout,
    })
  }
}

/// Settings for [`WriterRegistry`](crate::registry::WriterRegistry).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
  /// How long `publish` may block on each full channel. `None` publishes with
  /// `try_write` and never blocks.
  pub write_timeout: Option<Duration>,
  /// Drop registrations whose channel reports `Cancelled` during `publish`.
  pub prune_closed: bool,
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      write_timeout: None,
      prune_closed: true,
    }
  }
}

impl RegistryConfig {
  pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
    let raw: RegistryConfigRaw =
      serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
    Self::try_from(raw)
  }

  pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
    let contents = fs::read_to_string(path)?;
    Self::from_yaml_str(&contents)
  }
}

impl TryFrom<RegistryConfigRaw> for RegistryConfig {
  type Error = ConfigError;

  fn try_from(raw: RegistryConfigRaw) -> Result<Self, Self::Error> {
    let write_timeout = match raw.write_timeout {
      Some(text) => match parse_timeout("write_timeout", &text)? {
        Some(timeout) => Some(timeout),
        // Publishing must never block forever on a stalled consumer.
        None => {
          return Err(ConfigError::InvalidValue {
            field: "write_timeout".to_string(),
            message: "publishing cannot wait indefinitely".to_string(),
          })
        }
      },
      None => None,
    };
    Ok(Self {
      write_timeout,
      prune_closed: raw.prune_closed.unwrap_or(true),
    })
  }
}

/// Parses a humantime duration, mapping `"infinite"` to `None`.
fn parse_timeout(field: &str, text: &str) -> Result<Option<Duration>, ConfigError> {
  let text = text.trim();
  if text.eq_ignore_ascii_case(INFINITE) {
    return Ok(None);
  }
  humantime::parse_duration(text)
    .map(Some)
    .map_err(|e| ConfigError::InvalidValue {
      field: field.to_string(),
      message: format!("'{}': {}", text, e),
    })
}

#[cfg(test)]
mod tests {
  use super::*;
  use pretty_assertions::assert_eq;
  use tempfile::tempdir;

  #[test]
  fn empty_document_uses_defaults() {
    let config = ChannelConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, ChannelConfig::default());
  }

  #[test]
  fn parses_depth_and_humantime_timeout() {
    let config = ChannelConfig::from_yaml_str("max_depth: 16\nread_timeout: 250ms\n").unwrap();
    assert_eq!(
      config,
      ChannelConfig {
        max_depth: 16,
        read_timeout: Some(Duration::from_millis(250)),
      }
    );
  }

  #[test]
  fn infinite_read_timeout_is_none() {
    let config = ChannelConfig::from_yaml_str("read_timeout: infinite").unwrap();
    assert_eq!(config.read_timeout, None);
  }

  #[test]
  fn zero_depth_is_accepted() {
    let config = ChannelConfig::from_yaml_str("max_depth: 0").unwrap();
    let channel = config.build::<u8>();
    assert_eq!(channel.capacity(), 0);
    assert!(channel.is_full());
  }

  #[test]
  fn bad_duration_names_the_field() {
    let err = ChannelConfig::from_yaml_str("read_timeout: soon").unwrap_err();
    match err {
      ConfigError::InvalidValue { field, .. } => assert_eq!(field, "read_timeout"),
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[test]
  fn unknown_fields_are_rejected() {
    let err = ChannelConfig::from_yaml_str("depth: 3").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }

  #[test]
  fn registry_defaults_to_non_blocking_with_pruning() {
    let config = RegistryConfig::from_yaml_str("{}").unwrap();
    assert_eq!(config, RegistryConfig::default());
  }

  #[test]
  fn registry_rejects_infinite_write_timeout() {
    let err = RegistryConfig::from_yaml_str("write_timeout: infinite").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
  }

  #[test]
  fn registry_parses_timeout_and_pruning() {
    let config = RegistryConfig::from_yaml_str("write_timeout: 10ms\nprune_closed: false").unwrap();
    assert_eq!(
      config,
      RegistryConfig {
        write_timeout: Some(Duration::from_millis(10)),
        prune_closed: false,
      }
    );
  }

  #[test]
  fn configs_load_from_files() {
    let dir = tempdir().unwrap();
    let channel_path = dir.path().join("channel.yaml");
    fs::write(&channel_path, "max_depth: 4\nread_timeout: 1s\n").unwrap();
    let registry_path = dir.path().join("registry.yaml");
    fs::write(&registry_path, "write_timeout: 20ms\n").unwrap();

    assert_eq!(
      ChannelConfig::from_file(&channel_path).unwrap(),
      ChannelConfig {
        max_depth: 4,
        read_timeout: Some(Duration::from_secs(1)),
      }
    );
    assert_eq!(
      RegistryConfig::from_file(&registry_path).unwrap().write_timeout,
      Some(Duration::from_millis(20))
    );
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    assert!(matches!(ChannelConfig::from_file(&missing), Err(ConfigError::Read(_))));
    assert!(matches!(RegistryConfig::from_file(&missing), Err(ConfigError::Read(_))));
  }
}
