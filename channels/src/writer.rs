// src/writer.rs

use crate::channel::Channel;
use crate::error::{ChannelError, WriteError};

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The write capability for a [`Channel`].
///
/// Any number of writers may feed one channel concurrently; cloning a writer
/// is cheap and needs no coordination from the caller.
pub struct ChannelWriter<T> {
  channel: Arc<Channel<T>>,
}

impl<T> ChannelWriter<T> {
  /// Wraps `channel` in a writer. Returns `None` if the channel is closed.
  pub fn create(channel: Arc<Channel<T>>) -> Option<Self> {
    if channel.is_closed() {
      return None;
    }
    Some(Self { channel })
  }

  /// Appends `value` to the queue, blocking while it is full.
  ///
  /// `timeout` of `None` waits indefinitely. Fails with `Cancelled` if the
  /// channel is or becomes closed and with `ResourceExhausted` if the timeout
  /// elapses while the queue is still full. The value is returned inside the
  /// error on failure.
  pub fn write(&self, value: T, timeout: Option<Duration>) -> Result<(), WriteError<T>> {
    self.channel.write(value, timeout)
  }

  /// Like [`write`](Self::write), but clones `value` only once a slot has
  /// been secured.
  pub fn write_cloned(&self, value: &T, timeout: Option<Duration>) -> Result<(), ChannelError>
  where
    T: Clone,
  {
    self.channel.write_cloned(value, timeout)
  }

  /// Appends `value` without blocking.
  pub fn try_write(&self, value: T) -> Result<(), WriteError<T>> {
    self.channel.try_write(value)
  }

  pub fn try_write_cloned(&self, value: &T) -> Result<(), ChannelError>
  where
    T: Clone,
  {
    self.channel.try_write_cloned(value)
  }

  pub fn is_closed(&self) -> bool {
    self.channel.is_closed()
  }

  /// Returns the number of items currently queued.
  pub fn len(&self) -> usize {
    self.channel.len()
  }

  pub fn is_empty(&self) -> bool {
    self.channel.is_empty()
  }

  pub fn is_full(&self) -> bool {
    self.channel.is_full()
  }

  pub fn capacity(&self) -> usize {
    self.channel.capacity()
  }
}

impl<T> Clone for ChannelWriter<T> {
  fn clone(&self) -> Self {
    Self {
      channel: Arc::clone(&self.channel),
    }
  }
}

impl<T> fmt::Debug for ChannelWriter<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChannelWriter")
      .field("channel", &self.channel)
      .finish()
  }
}
