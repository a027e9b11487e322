// src/error.rs

use core::fmt;

use thiserror::Error;

use crate::registry::WriterId;

/// The outcome kind of a failed channel operation.
///
/// Every read and write operation reports failure through one of these kinds.
/// Callers are expected to branch on them: `Cancelled` is terminal for the
/// channel, `ResourceExhausted` and `NotFound` are transient.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ChannelError {
  /// The channel has been closed. Permanent.
  #[error("channel is closed")]
  Cancelled,
  /// A write found the queue at capacity, either immediately (`try_write`)
  /// or once its timeout elapsed (`write`).
  #[error("channel is full")]
  ResourceExhausted,
  /// A read found the queue empty, either immediately (`try_read`) or once
  /// its timeout elapsed (`read`).
  #[error("channel is empty")]
  NotFound,
  /// The queue held more items than its maximum depth. This is a broken
  /// invariant, not a recoverable condition.
  #[error("channel load {len} exceeds max queue depth {max_depth}")]
  Internal { len: usize, max_depth: usize },
}

impl ChannelError {
  /// Returns `true` if the channel is closed and the caller should stop using it.
  #[inline]
  pub fn is_cancelled(&self) -> bool {
    matches!(self, ChannelError::Cancelled)
  }

  /// Returns `true` for the full/empty outcomes a caller may simply retry.
  #[inline]
  pub fn is_transient(&self) -> bool {
    matches!(self, ChannelError::ResourceExhausted | ChannelError::NotFound)
  }
}

/// Error returned by write operations. The rejected value is handed back so
/// that move-only payloads are never lost on failure.
#[derive(PartialEq, Eq, Clone)]
pub struct WriteError<T> {
  kind: ChannelError,
  value: T,
}

impl<T> WriteError<T> {
  #[inline]
  pub(crate) fn new(kind: ChannelError, value: T) -> Self {
    Self { kind, value }
  }

  /// The reason the write failed.
  #[inline]
  pub fn kind(&self) -> ChannelError {
    self.kind
  }

  /// Consumes the error, returning the value that was not written.
  #[inline]
  pub fn into_inner(self) -> T {
    self.value
  }

  /// Consumes the error, returning both the failure kind and the value.
  #[inline]
  pub fn into_parts(self) -> (ChannelError, T) {
    (self.kind, self.value)
  }

  #[inline]
  pub fn is_cancelled(&self) -> bool {
    self.kind.is_cancelled()
  }
}

impl<T> fmt::Debug for WriteError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "WriteError::{:?}(..)", self.kind)
  }
}

impl<T> fmt::Display for WriteError<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.kind, f)
  }
}

impl<T> std::error::Error for WriteError<T> {}

impl<T> From<WriteError<T>> for ChannelError {
  fn from(err: WriteError<T>) -> Self {
    err.kind
  }
}

/// Errors from the event writer registry.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum RegistryError {
  #[error("no writer registered under id {0}")]
  UnknownWriter(WriterId),
  #[error("cannot register a writer for a closed channel")]
  ClosedChannel,
}

/// Errors raised while loading channel configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("failed to read configuration: {0}")]
  Read(#[from] std::io::Error),

  #[error("failed to parse configuration: {0}")]
  Parse(String),

  #[error("invalid configuration value for '{field}': {message}")]
  InvalidValue { field: String, message: String },
}
