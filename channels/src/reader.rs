// src/reader.rs

use crate::channel::Channel;
use crate::error::ChannelError;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The read capability for a [`Channel`].
///
/// A reader can only consume from the channel; it cannot write to it or close
/// it. Several readers may share a channel, but each message is delivered to
/// exactly one of them, so per-stream ordering is only preserved with a single
/// reader.
pub struct ChannelReader<T> {
  channel: Arc<Channel<T>>,
}

impl<T> ChannelReader<T> {
  /// Wraps `channel` in a reader. Returns `None` if the channel is closed.
  pub fn create(channel: Arc<Channel<T>>) -> Option<Self> {
    if channel.is_closed() {
      return None;
    }
    Some(Self { channel })
  }

  /// Removes and returns the head of the queue, blocking while it is empty.
  ///
  /// `timeout` of `None` waits indefinitely. Fails with `Cancelled` if the
  /// channel is or becomes closed and with `NotFound` if the timeout elapses
  /// while the queue is still empty.
  pub fn read(&self, timeout: Option<Duration>) -> Result<T, ChannelError> {
    self.channel.read(timeout)
  }

  /// Removes and returns the head of the queue without blocking.
  pub fn try_read(&self) -> Result<T, ChannelError> {
    self.channel.try_read()
  }

  /// Drains everything currently queued, in order. An empty queue yields an
  /// empty `Vec`.
  pub fn read_all(&self) -> Result<Vec<T>, ChannelError> {
    self.channel.read_all()
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

  pub fn capacity(&self) -> usize {
    self.channel.capacity()
  }
}

impl<T> fmt::Debug for ChannelReader<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ChannelReader")
      .field("channel", &self.channel)
      .finish()
  }
}
