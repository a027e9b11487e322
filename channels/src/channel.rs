// src/channel.rs

//! The shared core of a bounded, closeable channel.
//!
//! A `Channel<T>` owns the FIFO queue, the closed flag and all of the
//! synchronization needed to move values between threads. It is never used
//! directly by producers or consumers: they receive a [`ChannelWriter`] or a
//! [`ChannelReader`], each holding an `Arc` to the same channel.
//!
//! ### Design Principles:
//!
//! 1.  **Central Mutex**: A `parking_lot::Mutex` guards the queue and the closed
//!     flag. Every operation takes the lock exactly once and never holds it
//!     across a wait except while parked inside the condition variable.
//! 2.  **Two Condition Variables**: `not_full` parks writers and `not_empty`
//!     parks readers. A single item moving through the queue wakes one waiter
//!     on the opposite side; `read_all` and `close` wake everyone.
//! 3.  **Close Wins**: The closed flag is checked before any wait and after
//!     every wakeup, before capacity or emptiness. A blocked operation woken by
//!     `close` always reports `Cancelled`, never a timeout.
//! 4.  **Deadlines, not Durations**: A finite timeout becomes an absolute
//!     deadline once per call so that spurious wakeups and lost races with other
//!     waiters never extend the total time spent blocked.

use crate::error::{ChannelError, WriteError};
use crate::reader::ChannelReader;
use crate::writer::ChannelWriter;

use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The state protected by the channel's mutex.
struct ChannelState<T> {
  queue: VecDeque<T>,
  /// Transitions false -> true exactly once.
  closed: bool,
}

/// A bounded, closeable, thread-safe FIFO queue.
///
/// Create one with [`Channel::create`], then hand out readers and writers with
/// [`Channel::reader`] and [`Channel::writer`]. The channel is dropped once the
/// original `Arc` and every handle have been dropped.
///
/// A capacity of zero is legal: such a channel can never hold an item, so
/// every write reports `ResourceExhausted` and every read reports `NotFound`
/// until the channel is closed.
pub struct Channel<T> {
  state: Mutex<ChannelState<T>>,
  max_depth: usize,
  /// Readers waiting on an empty queue.
  not_empty: Condvar,
  /// Writers waiting on a full queue.
  not_full: Condvar,
}

impl<T> fmt::Debug for Channel<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.state.lock();
    f.debug_struct("Channel")
      .field("max_depth", &self.max_depth)
      .field("len", &state.queue.len())
      .field("closed", &state.closed)
      .finish()
  }
}

/// Converts a per-call timeout into an absolute deadline. `None` (or a timeout
/// too large to represent) means wait forever.
#[inline]
fn deadline_for(timeout: Option<Duration>) -> Option<Instant> {
  timeout.and_then(|t| Instant::now().checked_add(t))
}

/// Parks on `cond` until notified or until `deadline`. Returns `true` if the
/// deadline elapsed.
#[inline]
fn wait_on<T>(
  cond: &Condvar,
  guard: &mut MutexGuard<'_, ChannelState<T>>,
  deadline: Option<Instant>,
) -> bool {
  match deadline {
    Some(deadline) => cond.wait_until(guard, deadline).timed_out(),
    None => {
      cond.wait(guard);
      false
    }
  }
}

impl<T> Channel<T> {
  /// Creates a new open, empty channel holding at most `max_depth` items.
  pub fn create(max_depth: usize) -> Arc<Self> {
    Arc::new(Channel {
      state: Mutex::new(ChannelState {
        queue: VecDeque::with_capacity(max_depth.min(1024)),
        closed: false,
      }),
      max_depth,
      not_empty: Condvar::new(),
      not_full: Condvar::new(),
    })
  }

  /// Creates a reader for this channel, or `None` if it is already closed.
  pub fn reader(self: &Arc<Self>) -> Option<ChannelReader<T>> {
    ChannelReader::create(Arc::clone(self))
  }

  /// Creates a writer for this channel, or `None` if it is already closed.
  pub fn writer(self: &Arc<Self>) -> Option<ChannelWriter<T>> {
    ChannelWriter::create(Arc::clone(self))
  }

  /// Closes the channel and wakes every blocked reader and writer.
  ///
  /// Returns `true` on the open -> closed transition and `false` if the channel
  /// was already closed. Closing is permanent.
  pub fn close(&self) -> bool {
    let mut state = self.state.lock();
    if state.closed {
      return false;
    }
    state.closed = true;
    let writers = self.not_full.notify_all();
    let readers = self.not_empty.notify_all();
    tracing::debug!(
      max_depth = self.max_depth,
      pending = state.queue.len(),
      woken_writers = writers,
      woken_readers = readers,
      "channel closed"
    );
    true
  }

  /// Returns `true` if the channel has been closed.
  pub fn is_closed(&self) -> bool {
    self.state.lock().closed
  }

  /// Returns the maximum number of items the channel can hold.
  #[inline]
  pub fn capacity(&self) -> usize {
    self.max_depth
  }

  /// Returns the number of items currently queued.
  pub fn len(&self) -> usize {
    self.state.lock().queue.len()
  }

  /// Returns `true` if no items are queued.
  pub fn is_empty(&self) -> bool {
    self.state.lock().queue.is_empty()
  }

  /// Returns `true` if the queue is at capacity. Always `true` for a zero
  /// capacity channel.
  pub fn is_full(&self) -> bool {
    self.state.lock().queue.len() >= self.max_depth
  }

  // --- Write side ---

  /// Guards against a queue that has grown past its maximum depth.
  fn check_depth(&self, state: &ChannelState<T>) -> Result<(), ChannelError> {
    let len = state.queue.len();
    if len > self.max_depth {
      tracing::error!(len, max_depth = self.max_depth, "channel load exceeds max queue depth");
      return Err(ChannelError::Internal {
        len,
        max_depth: self.max_depth,
      });
    }
    Ok(())
  }

  /// Checks the closed flag and waits for a free slot until `timeout`.
  /// On success the caller holds the lock with room for one more item.
  fn admit_blocking(
    &self,
    state: &mut MutexGuard<'_, ChannelState<T>>,
    timeout: Option<Duration>,
  ) -> Result<(), ChannelError> {
    // No signal will ever arrive on a closed channel.
    if state.closed {
      return Err(ChannelError::Cancelled);
    }
    let deadline = deadline_for(timeout);
    // A loop because a wakeup does not imply a free slot.
    while state.queue.len() == self.max_depth {
      let expired = wait_on(&self.not_full, state, deadline);
      if state.closed {
        return Err(ChannelError::Cancelled);
      }
      if expired && state.queue.len() == self.max_depth {
        tracing::trace!(max_depth = self.max_depth, ?timeout, "write timed out on full channel");
        return Err(ChannelError::ResourceExhausted);
      }
    }
    self.check_depth(state)
  }

  /// Checks the closed flag and occupancy without waiting.
  fn admit_now(&self, state: &ChannelState<T>) -> Result<(), ChannelError> {
    if state.closed {
      return Err(ChannelError::Cancelled);
    }
    if state.queue.len() == self.max_depth {
      return Err(ChannelError::ResourceExhausted);
    }
    self.check_depth(state)
  }

  /// Appends to the tail and wakes one reader. Caller holds the lock and has
  /// been admitted.
  #[inline]
  fn enqueue(&self, state: &mut ChannelState<T>, value: T) {
    state.queue.push_back(value);
    self.not_empty.notify_one();
  }

  pub(crate) fn write(&self, value: T, timeout: Option<Duration>) -> Result<(), WriteError<T>> {
    let mut state = self.state.lock();
    if let Err(kind) = self.admit_blocking(&mut state, timeout) {
      return Err(WriteError::new(kind, value));
    }
    self.enqueue(&mut state, value);
    Ok(())
  }

  pub(crate) fn write_cloned(&self, value: &T, timeout: Option<Duration>) -> Result<(), ChannelError>
  where
    T: Clone,
  {
    let mut state = self.state.lock();
    self.admit_blocking(&mut state, timeout)?;
    self.enqueue(&mut state, value.clone());
    Ok(())
  }

  pub(crate) fn try_write(&self, value: T) -> Result<(), WriteError<T>> {
    let mut state = self.state.lock();
    if let Err(kind) = self.admit_now(&state) {
      return Err(WriteError::new(kind, value));
    }
    self.enqueue(&mut state, value);
    Ok(())
  }

  pub(crate) fn try_write_cloned(&self, value: &T) -> Result<(), ChannelError>
  where
    T: Clone,
  {
    let mut state = self.state.lock();
    self.admit_now(&state)?;
    self.enqueue(&mut state, value.clone());
    Ok(())
  }

  // --- Read side ---

  /// Pops the head and wakes one writer.
  #[inline]
  fn dequeue(&self, state: &mut ChannelState<T>) -> Option<T> {
    let value = state.queue.pop_front()?;
    self.not_full.notify_one();
    Some(value)
  }

  pub(crate) fn read(&self, timeout: Option<Duration>) -> Result<T, ChannelError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(ChannelError::Cancelled);
    }
    let deadline = deadline_for(timeout);
    loop {
      if let Some(value) = self.dequeue(&mut state) {
        return Ok(value);
      }
      let expired = wait_on(&self.not_empty, &mut state, deadline);
      if state.closed {
        return Err(ChannelError::Cancelled);
      }
      if expired && state.queue.is_empty() {
        tracing::trace!(?timeout, "read timed out on empty channel");
        return Err(ChannelError::NotFound);
      }
    }
  }

  pub(crate) fn try_read(&self) -> Result<T, ChannelError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(ChannelError::Cancelled);
    }
    self.dequeue(&mut state).ok_or(ChannelError::NotFound)
  }

  pub(crate) fn read_all(&self) -> Result<Vec<T>, ChannelError> {
    let mut state = self.state.lock();
    if state.closed {
      return Err(ChannelError::Cancelled);
    }
    let drained: Vec<T> = state.queue.drain(..).collect();
    self.not_full.notify_all();
    Ok(drained)
  }
}
