// Contains the primary public initialization functions for stratum_logging.

use crate::{
  config::{LogFormat, LoggingConfig},
  error::{Error, Result},
};

use std::{
  env,
  fs,
  path::{Path, PathBuf},
};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_CONFIG_BASE_NAME: &str = "stratum_logging";
const DEFAULT_CONFIG_EXTENSION: &str = "yaml";

/// Finds the configuration file in the working directory.
pub fn find_config_file(environment_suffix: Option<&str>) -> Result<PathBuf> {
  find_config_file_in(Path::new("."), environment_suffix)
}

/// Finds the configuration file in `dir`, preferring the environment-specific
/// `stratum_logging.<env>.yaml` over `stratum_logging.yaml`. The environment
/// comes from `environment_suffix`, then `STRATUM_ENV`, then `APP_ENV`.
pub fn find_config_file_in(dir: &Path, environment_suffix: Option<&str>) -> Result<PathBuf> {
  let base_name = DEFAULT_CONFIG_BASE_NAME;
  let extension = DEFAULT_CONFIG_EXTENSION;

  let env_from_var = environment_suffix
    .map(|s| s.to_string())
    .or_else(|| env::var("STRATUM_ENV").ok())
    .or_else(|| env::var("APP_ENV").ok());

  let mut files_to_check: Vec<String> = Vec::new();
  if let Some(env_str) = &env_from_var {
    if !env_str.is_empty() {
      files_to_check.push(format!("{}.{}.{}", base_name, env_str, extension));
    }
  }
  files_to_check.push(format!("{}.{}", base_name, extension));

  for file_name in &files_to_check {
    let path = dir.join(file_name);
    if path.is_file() {
      return Ok(path);
    }
  }

  Err(Error::ConfigNotFound(format!(
    "Searched for: {:?} in {:?}. Provide a config file or check STRATUM_ENV/APP_ENV.",
    files_to_check, dir
  )))
}

/// Initializes logging from a YAML configuration file.
pub fn init_from_file(config_path: &Path) -> Result<()> {
  let contents = fs::read_to_string(config_path)?;
  init_from_str(&contents)
}

/// Initializes logging from a YAML document.
pub fn init_from_str(yaml: &str) -> Result<()> {
  let config = LoggingConfig::from_yaml_str(yaml)?;
  init_with(&config)
}

/// Initializes logging at `info` with the pattern format.
pub fn init_default() -> Result<()> {
  init_with(&LoggingConfig::default())
}

/// Bridges `log` records into `tracing` and installs the global subscriber.
///
/// `RUST_LOG`, when set, replaces the configured directives. Fails if a
/// global logger or subscriber has already been installed.
pub fn init_with(config: &LoggingConfig) -> Result<()> {
  config.validate()?;
  let filter = build_filter(config)?;

  tracing_log::LogTracer::init().map_err(|e| Error::LogBridgeInit(e.to_string()))?;

  let pattern_layer = (config.format == LogFormat::Pattern).then(|| {
    fmt::layer()
      .with_ansi(config.ansi)
      .with_thread_ids(config.with_thread_ids)
      .with_target(true)
  });
  let json_layer = (config.format == LogFormat::Json).then(|| {
    fmt::layer()
      .json()
      .with_thread_ids(config.with_thread_ids)
      .with_target(true)
  });

  let subscriber = tracing_subscriber::registry()
    .with(filter)
    .with(pattern_layer)
    .with(json_layer);

  tracing::subscriber::set_global_default(subscriber)
    .map_err(|e| Error::GlobalSubscriberSet(e.to_string()))?;
  tracing::debug!(directives = %config.directives(), format = ?config.format, "logging initialized");
  Ok(())
}

/// Builds the level filter, letting a non-empty `RUST_LOG` take precedence.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
  if let Ok(from_env) = env::var(EnvFilter::DEFAULT_ENV) {
    if !from_env.trim().is_empty() {
      return EnvFilter::try_new(&from_env).map_err(|e| Error::InvalidConfigValue {
        field: EnvFilter::DEFAULT_ENV.to_string(),
        message: e.to_string(),
      });
    }
  }
  EnvFilter::try_new(config.directives()).map_err(|e| Error::InvalidConfigValue {
    field: "level".to_string(),
    message: e.to_string(),
  })
}
