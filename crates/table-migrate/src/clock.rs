//! Injectable latency.
//!
//! Every simulated round trip (connect, row fetch, per-record write) goes
//! through a [`Delay`]. Production code uses [`TokioDelay`]; tests and
//! `--instant` runs use [`NoDelay`] so they finish immediately and
//! deterministically.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Suspension point for simulated I/O latency.
///
/// Implementations may fail; the error propagates to the caller of the
/// operation that was waiting.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Wait for `duration`.
    async fn sleep(&self, duration: Duration) -> Result<()>;
}

/// Real wall-clock delay backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) -> Result<()> {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
        Ok(())
    }
}

/// Delay that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

#[async_trait]
impl Delay for NoDelay {
    async fn sleep(&self, _duration: Duration) -> Result<()> {
        Ok(())
    }
}

/// Simulated latency per operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Latency {
    /// Connect + catalog round trip (default: 1500ms).
    #[serde(default = "default_connect_ms")]
    pub connect_ms: u64,

    /// Row fetch round trip (default: 1000ms).
    #[serde(default = "default_fetch_ms")]
    pub fetch_ms: u64,

    /// Per-record migration step (default: 500ms).
    #[serde(default = "default_record_ms")]
    pub record_ms: u64,
}

impl Latency {
    pub fn connect(&self) -> Duration {
        Duration::from_millis(self.connect_ms)
    }

    pub fn fetch(&self) -> Duration {
        Duration::from_millis(self.fetch_ms)
    }

    pub fn record(&self) -> Duration {
        Duration::from_millis(self.record_ms)
    }
}

impl Default for Latency {
    fn default() -> Self {
        Self {
            connect_ms: default_connect_ms(),
            fetch_ms: default_fetch_ms(),
            record_ms: default_record_ms(),
        }
    }
}

fn default_connect_ms() -> u64 {
    1500
}

fn default_fetch_ms() -> u64 {
    1000
}

fn default_record_ms() -> u64 {
    500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_delay_waits_for_duration() {
        let start = tokio::time::Instant::now();
        TokioDelay.sleep(Duration::from_millis(500)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_no_delay_returns_immediately() {
        let start = std::time::Instant::now();
        NoDelay.sleep(Duration::from_secs(3600)).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_latency_defaults() {
        let latency = Latency::default();
        assert_eq!(latency.connect(), Duration::from_millis(1500));
        assert_eq!(latency.fetch(), Duration::from_millis(1000));
        assert_eq!(latency.record(), Duration::from_millis(500));
    }

    #[test]
    fn test_latency_partial_yaml_keeps_defaults() {
        let latency: Latency = serde_yaml::from_str("record_ms: 10").unwrap();
        assert_eq!(latency.record_ms, 10);
        assert_eq!(latency.connect_ms, 1500);
    }
}
