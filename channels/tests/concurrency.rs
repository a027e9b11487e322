mod common;
use common::*;

use stratum_channel::{Channel, ChannelError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn one_write_wakes_one_reader_and_close_wakes_the_rest() {
  let channel = Channel::create(4);
  let completed = Arc::new(AtomicUsize::new(0));

  let handles: Vec<_> = (0..3)
    .map(|_| {
      let reader = channel.reader().unwrap();
      let completed = Arc::clone(&completed);
      thread::spawn(move || {
        let result = reader.read(None);
        completed.fetch_add(1, Ordering::SeqCst);
        result
      })
    })
    .collect();
  thread::sleep(SETTLE);
  assert_eq!(completed.load(Ordering::SeqCst), 0);

  channel.writer().unwrap().try_write(42).unwrap();
  thread::sleep(SETTLE);
  assert_eq!(completed.load(Ordering::SeqCst), 1);

  assert!(channel.close());
  let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  assert_eq!(results.iter().filter(|r| **r == Ok(42)).count(), 1);
  assert_eq!(results.iter().filter(|r| **r == Err(ChannelError::Cancelled)).count(), 2);
}

#[test]
fn one_read_wakes_one_writer_and_close_wakes_the_rest() {
  let channel = Channel::create(1);
  let writer = channel.writer().unwrap();
  let reader = channel.reader().unwrap();
  writer.try_write(0).unwrap();
  let completed = Arc::new(AtomicUsize::new(0));

  let handles: Vec<_> = (1..=3)
    .map(|i| {
      let writer = writer.clone();
      let completed = Arc::clone(&completed);
      thread::spawn(move || {
        let result = writer.write(i, None).map_err(|e| e.kind());
        completed.fetch_add(1, Ordering::SeqCst);
        result
      })
    })
    .collect();
  thread::sleep(SETTLE);
  assert_eq!(completed.load(Ordering::SeqCst), 0);

  assert_eq!(reader.try_read(), Ok(0));
  thread::sleep(SETTLE);
  assert_eq!(completed.load(Ordering::SeqCst), 1);

  assert!(channel.close());
  let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
  assert_eq!(results.iter().filter(|r| **r == Err(ChannelError::Cancelled)).count(), 2);
}

#[test]
fn many_writers_one_reader_keeps_per_writer_order() {
  let channel = Channel::create(16);
  let reader = channel.reader().unwrap();
  let num_producers = 8;

  let producers: Vec<_> = (0..num_producers)
    .map(|p| {
      let writer = channel.writer().unwrap();
      thread::spawn(move || {
        for seq in 0..ITEMS_MEDIUM {
          writer.write((p, seq), None).unwrap();
        }
      })
    })
    .collect();

  let mut next: HashMap<usize, usize> = HashMap::new();
  for _ in 0..num_producers * ITEMS_MEDIUM {
    let (p, seq) = reader.read(Some(LONG_TIMEOUT)).unwrap();
    let expected = next.entry(p).or_insert(0);
    assert_eq!(seq, *expected, "producer {p} delivered out of order");
    *expected += 1;
  }
  for handle in producers {
    handle.join().unwrap();
  }
  assert_eq!(reader.try_read(), Err(ChannelError::NotFound));
}

#[test]
fn competing_readers_see_each_message_once() {
  let channel = Channel::create(4);
  let writer = channel.writer().unwrap();
  let seen = Arc::new(AtomicUsize::new(0));
  let sum = Arc::new(AtomicUsize::new(0));

  let consumers: Vec<_> = (0..4)
    .map(|_| {
      let reader = channel.reader().unwrap();
      let seen = Arc::clone(&seen);
      let sum = Arc::clone(&sum);
      thread::spawn(move || loop {
        match reader.read(Some(SHORT_TIMEOUT)) {
          Ok(v) => {
            seen.fetch_add(1, Ordering::SeqCst);
            sum.fetch_add(v, Ordering::SeqCst);
          }
          Err(ChannelError::NotFound) => continue,
          Err(ChannelError::Cancelled) => break,
          Err(e) => panic!("unexpected error: {e}"),
        }
      })
    })
    .collect();

  for v in 1..=ITEMS_HIGH {
    writer.write(v, None).unwrap();
  }
  while !channel.is_empty() {
    thread::yield_now();
  }
  thread::sleep(SETTLE);
  channel.close();
  for handle in consumers {
    handle.join().unwrap();
  }

  assert_eq!(seen.load(Ordering::SeqCst), ITEMS_HIGH);
  assert_eq!(sum.load(Ordering::SeqCst), ITEMS_HIGH * (ITEMS_HIGH + 1) / 2);
}

#[test]
fn handles_are_shareable_across_threads() {
  let channel = Channel::create(ITEMS_LOW);
  let writer = Arc::new(channel.writer().unwrap());
  let reader = channel.reader().unwrap();

  let handles: Vec<_> = (0..5)
    .map(|_| {
      let writer = Arc::clone(&writer);
      thread::spawn(move || {
        for _ in 0..10 {
          writer.try_write(1u32).unwrap();
        }
      })
    })
    .collect();
  for handle in handles {
    handle.join().unwrap();
  }

  assert_eq!(reader.read_all().unwrap().len(), ITEMS_LOW);
}
