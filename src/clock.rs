// Time Source
//
// Deadlines are plain unix seconds. Sleeping goes through the clock too so
// the control loop can be driven by a manual clock.

use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

pub trait Clock {
    /// Current unix timestamp in seconds
    fn now(&self) -> u64;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        current_timestamp()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Get current Unix timestamp in seconds
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Render a unix timestamp as local wall-clock time for log lines
pub fn format_local(timestamp: u64) -> String {
    chrono::DateTime::from_timestamp(timestamp as i64, 0)
        .map(|utc| {
            utc.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| timestamp.to_string())
}
