//! Bounded, closeable, thread-safe typed channels for intra-process messaging.
//!
//! A [`Channel`] moves events between independently scheduled components of a
//! switch control plane without shared mutable state. Producers hold a
//! [`ChannelWriter`], consumers hold a [`ChannelReader`], and any holder of the
//! channel itself may [`close`](Channel::close) it, which is the only way to
//! cancel blocked operations.
//!
//! # Examples
//!
//! ```
//! use stratum_channel::{Channel, ChannelError};
//! use std::thread;
//! use std::time::Duration;
//!
//! let channel = Channel::create(128);
//! let reader = channel.reader().unwrap();
//! let writer = channel.writer().unwrap();
//!
//! let producer = thread::spawn(move || {
//!   for i in 0..3 {
//!     writer.write(i, None).unwrap();
//!   }
//! });
//! producer.join().unwrap();
//!
//! let mut received = Vec::new();
//! loop {
//!   match reader.read(Some(Duration::from_millis(10))) {
//!     Ok(v) => received.push(v),
//!     Err(ChannelError::NotFound) => break,
//!     Err(e) => panic!("unexpected: {e}"),
//!   }
//! }
//! assert_eq!(received, vec![0, 1, 2]);
//!
//! assert!(channel.close());
//! assert_eq!(reader.try_read(), Err(ChannelError::Cancelled));
//! ```

pub mod channel;
pub mod config;
pub mod consumer;
pub mod error;
pub mod reader;
pub mod registry;
pub mod writer;


pub use channel::Channel;
pub use config::{ChannelConfig, RegistryConfig};
pub use consumer::{run_consumer, ConsumerExit};
pub use error::{ChannelError, ConfigError, RegistryError, WriteError};
pub use reader::ChannelReader;
pub use registry::{PublishReport, WriterId, WriterRegistry};
pub use writer::ChannelWriter;
