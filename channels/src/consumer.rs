// src/consumer.rs

//! The standard consumption loop for a [`ChannelReader`].
//!
//! A consumer blocks on `read` with a finite timeout so that it can poll an
//! external stop condition between messages. A timeout means "nothing yet",
//! while `Cancelled` means the channel is gone and the loop must end. Treating
//! the two the same way turns a closed channel into a busy loop.

use crate::error::ChannelError;
use crate::reader::ChannelReader;

use std::ops::ControlFlow;
use std::time::Duration;

/// Why a consumer loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerExit {
  /// The channel was closed.
  Closed { delivered: u64 },
  /// The stop condition fired or the handler asked to stop.
  Stopped { delivered: u64 },
  /// The channel reported a broken invariant.
  Failed { delivered: u64, error: ChannelError },
}

impl ConsumerExit {
  /// Number of messages handed to the handler before the loop ended.
  pub fn delivered(&self) -> u64 {
    match *self {
      ConsumerExit::Closed { delivered }
      | ConsumerExit::Stopped { delivered }
      | ConsumerExit::Failed { delivered, .. } => delivered,
    }
  }
}

/// Reads from `reader` until the channel closes, `should_stop` returns
/// `true`, or `handler` returns `ControlFlow::Break`.
///
/// `should_stop` is evaluated after every read that times out and after every
/// delivered message, so it is polled at least once per `timeout`.
pub fn run_consumer<T, S, H>(
  reader: &ChannelReader<T>,
  timeout: Duration,
  mut should_stop: S,
  mut handler: H,
) -> ConsumerExit
where
  S: FnMut() -> bool,
  H: FnMut(T) -> ControlFlow<()>,
{
  let mut delivered: u64 = 0;
  loop {
    match reader.read(Some(timeout)) {
      Ok(value) => {
        delivered += 1;
        if handler(value).is_break() {
          tracing::debug!(delivered, "consumer stopped by handler");
          return ConsumerExit::Stopped { delivered };
        }
      }
      Err(ChannelError::Cancelled) => {
        tracing::debug!(delivered, "consumer exiting, channel closed");
        return ConsumerExit::Closed { delivered };
      }
      Err(ChannelError::NotFound) => {}
      Err(error) => {
        tracing::error!(delivered, %error, "consumer aborting");
        return ConsumerExit::Failed { delivered, error };
      }
    }
    if should_stop() {
      tracing::debug!(delivered, "consumer stop condition set");
      return ConsumerExit::Stopped { delivered };
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::channel::Channel;
  use std::cell::Cell;
  use std::sync::atomic::{AtomicBool, Ordering};
  use std::sync::Arc;
  use std::thread;

  const TICK: Duration = Duration::from_millis(20);

  #[test]
  fn drains_then_exits_on_close() {
    let channel = Channel::create(8);
    let reader = channel.reader().unwrap();
    let writer = channel.writer().unwrap();
    for i in 0..3 {
      writer.try_write(i).unwrap();
    }

    let mut seen = Vec::new();
    let closer = Arc::clone(&channel);
    let exit = run_consumer(
      &reader,
      TICK,
      || false,
      |v| {
        seen.push(v);
        if seen.len() == 3 {
          closer.close();
        }
        ControlFlow::Continue(())
      },
    );

    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(exit, ConsumerExit::Closed { delivered: 3 });
  }

  #[test]
  fn stop_flag_is_polled_on_timeout() {
    let channel = Channel::<u32>::create(1);
    let reader = channel.reader().unwrap();
    let stop = Arc::new(AtomicBool::new(false));

    let stop_setter = Arc::clone(&stop);
    let setter = thread::spawn(move || {
      thread::sleep(TICK * 3);
      stop_setter.store(true, Ordering::SeqCst);
    });

    let exit = run_consumer(&reader, TICK, || stop.load(Ordering::SeqCst), |_| ControlFlow::Continue(()));
    setter.join().unwrap();

    assert_eq!(exit, ConsumerExit::Stopped { delivered: 0 });
    assert!(!channel.is_closed(), "stopping a consumer must not close the channel");
  }

  #[test]
  fn stop_flag_is_checked_after_each_delivery() {
    let channel = Channel::create(4);
    let reader = channel.reader().unwrap();
    let writer = channel.writer().unwrap();
    for i in 0..3 {
      writer.try_write(i).unwrap();
    }

    let handled = Cell::new(0);
    let exit = run_consumer(
      &reader,
      Duration::from_secs(10),
      || handled.get() >= 1,
      |_| {
        handled.set(handled.get() + 1);
        ControlFlow::Continue(())
      },
    );

    assert_eq!(exit, ConsumerExit::Stopped { delivered: 1 });
    assert_eq!(reader.read_all(), Ok(vec![1, 2]));
  }

  #[test]
  fn handler_break_stops_the_loop() {
    let channel = Channel::create(4);
    let reader = channel.reader().unwrap();
    let writer = channel.writer().unwrap();
    writer.try_write("a").unwrap();
    writer.try_write("stop").unwrap();
    writer.try_write("b").unwrap();

    let exit = run_consumer(&reader, TICK, || false, |v| {
      if v == "stop" {
        ControlFlow::Break(())
      } else {
        ControlFlow::Continue(())
      }
    });

    assert_eq!(exit.delivered(), 2);
    assert!(matches!(exit, ConsumerExit::Stopped { .. }));
    assert_eq!(reader.try_read(), Ok("b"));
  }

  #[test]
  fn already_closed_channel_exits_immediately() {
    let channel = Channel::<u8>::create(2);
    let reader = channel.reader().unwrap();
    channel.close();

    let exit = run_consumer(&reader, Duration::from_secs(10), || false, |_| ControlFlow::Continue(()));
    assert_eq!(exit, ConsumerExit::Closed { delivered: 0 });
  }
}
