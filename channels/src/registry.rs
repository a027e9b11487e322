// src/registry.rs

//! A registry of event writers, as used by event sources that fan one stream
//! of events (e.g. transceiver hot-swap notifications) out to every interested
//! component.
//!
//! Each interested component creates its own channel, registers a writer for
//! it with a priority, and keeps the reader. The event source then calls
//! [`WriterRegistry::publish`] once per event. Higher priorities receive each
//! event first; equal priorities are served in registration order.
//!
//! Unregistering only forgets the writer. It never closes the channel, which
//! still belongs to the component that created it.

use crate::config::RegistryConfig;
use crate::error::{ChannelError, RegistryError};
use crate::writer::ChannelWriter;

use parking_lot::Mutex;
use std::fmt;

/// Identifies one registration. Ids are never reused within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WriterId(u64);

impl WriterId {
  pub fn get(self) -> u64 {
    self.0
  }
}

impl fmt::Display for WriterId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Per-call delivery summary returned by [`WriterRegistry::publish`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
  pub delivered: usize,
  /// Writers whose channel stayed full.
  pub exhausted: usize,
  /// Writers whose channel was closed.
  pub cancelled: usize,
  /// Writers whose channel reported an internal error.
  pub failed: usize,
}

impl PublishReport {
  pub fn attempted(&self) -> usize {
    self.delivered + self.exhausted + self.cancelled + self.failed
  }
}

struct Registration<E> {
  id: WriterId,
  priority: i32,
  writer: ChannelWriter<E>,
}

struct RegistryInternal<E> {
  next_id: u64,
  /// Sorted by descending priority, then registration order.
  writers: Vec<Registration<E>>,
}

pub struct WriterRegistry<E> {
  config: RegistryConfig,
  internal: Mutex<RegistryInternal<E>>,
}

impl<E> fmt::Debug for WriterRegistry<E> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let internal = self.internal.lock();
    f.debug_struct("WriterRegistry")
      .field("config", &self.config)
      .field("writers", &internal.writers.len())
      .field("next_id", &internal.next_id)
      .finish()
  }
}

impl<E> Default for WriterRegistry<E> {
  fn default() -> Self {
    Self::new(RegistryConfig::default())
  }
}

impl<E> WriterRegistry<E> {
  pub fn new(config: RegistryConfig) -> Self {
    Self {
      config,
      internal: Mutex::new(RegistryInternal {
        next_id: 1,
        writers: Vec::new(),
      }),
    }
  }

  pub fn config(&self) -> &RegistryConfig {
    &self.config
  }

  /// Registers `writer` to receive published events.
  ///
  /// Fails with `ClosedChannel` if the writer's channel is already closed.
  pub fn register(&self, writer: ChannelWriter<E>, priority: i32) -> Result<WriterId, RegistryError> {
    if writer.is_closed() {
      return Err(RegistryError::ClosedChannel);
    }
    let mut internal = self.internal.lock();
    let id = WriterId(internal.next_id);
    internal.next_id += 1;

    let pos = internal
      .writers
      .iter()
      .position(|r| r.priority < priority)
      .unwrap_or(internal.writers.len());
    internal.writers.insert(pos, Registration { id, priority, writer });

    tracing::info!(%id, priority, writers = internal.writers.len(), "event writer registered");
    Ok(id)
  }

  /// Forgets the writer registered under `id`. The channel stays open.
  pub fn unregister(&self, id: WriterId) -> Result<(), RegistryError> {
    let mut internal = self.internal.lock();
    let pos = internal
      .writers
      .iter()
      .position(|r| r.id == id)
      .ok_or(RegistryError::UnknownWriter(id))?;
    internal.writers.remove(pos);
    tracing::info!(%id, writers = internal.writers.len(), "event writer unregistered");
    Ok(())
  }

  pub fn contains(&self, id: WriterId) -> bool {
    self.internal.lock().writers.iter().any(|r| r.id == id)
  }

  pub fn len(&self) -> usize {
    self.internal.lock().writers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.internal.lock().writers.is_empty()
  }

  /// Returns registered ids in delivery order.
  pub fn ids(&self) -> Vec<WriterId> {
    self.internal.lock().writers.iter().map(|r| r.id).collect()
  }
}

impl<E: Clone> WriterRegistry<E> {
  /// Delivers a copy of `event` to every registered writer.
  ///
  /// Writes happen outside the registry lock, so a full channel never blocks
  /// `register` or `unregister`. With `write_timeout` unset each write is a
  /// `try_write`.
  pub fn publish(&self, event: &E) -> PublishReport {
    let targets: Vec<(WriterId, ChannelWriter<E>)> = {
      let internal = self.internal.lock();
      internal
        .writers
        .iter()
        .map(|r| (r.id, r.writer.clone()))
        .collect()
    };

    let mut report = PublishReport::default();
    let mut closed = Vec::new();
    for (id, writer) in targets {
      let result = match self.config.write_timeout {
        Some(timeout) => writer.write_cloned(event, Some(timeout)),
        None => writer.try_write_cloned(event),
      };
      match result {
        Ok(()) => report.delivered += 1,
        Err(ChannelError::ResourceExhausted) => {
          tracing::trace!(%id, "event dropped, channel full");
          report.exhausted += 1;
        }
        Err(ChannelError::Cancelled) => {
          report.cancelled += 1;
          closed.push(id);
        }
        Err(error) => {
          tracing::error!(%id, %error, "event writer failed");
          report.failed += 1;
        }
      }
    }

    if self.config.prune_closed && !closed.is_empty() {
      let mut internal = self.internal.lock();
      internal.writers.retain(|r| !closed.contains(&r.id));
      tracing::info!(pruned = closed.len(), writers = internal.writers.len(), "pruned writers of closed channels");
    }
    report
  }
}
