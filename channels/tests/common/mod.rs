#![allow(dead_code)]

use std::time::Duration;

pub const SETTLE: Duration = Duration::from_millis(100);
pub const SHORT_TIMEOUT: Duration = Duration::from_millis(200);
pub const LONG_TIMEOUT: Duration = Duration::from_secs(5);
pub const ITEMS_LOW: usize = 50;
pub const ITEMS_MEDIUM: usize = 200;
pub const ITEMS_HIGH: usize = 1000;
