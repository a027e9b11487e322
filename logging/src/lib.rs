//! `stratum_logging` - configuration-driven `tracing` setup for processes that
//! embed `stratum_channel`.
//!
//! A single call installs the process-wide subscriber: `log` records are
//! bridged through `tracing-log`, levels are filtered per target, and events
//! are written to stdout either as readable lines or as JSON.

pub mod config;
pub mod error;
pub mod init;

pub use config::{LogFormat, LoggingConfig};
pub use error::{Error, Result};
pub use init::{
  build_filter, find_config_file, find_config_file_in, init_default, init_from_file, init_from_str,
  init_with,
};
