//! Common utilities shared by the driver and the journey steps
//!
//! Polling helpers for conditions Playwright cannot wait on by itself
//! (e.g. "whichever of these selectors shows up first"), plus small text
//! helpers for artifact names.

use std::future::Future;
use std::time::{Duration, Instant};

// ============================================================================
// Polling Utilities
// ============================================================================

/// Configuration for polling operations
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub timeout_ms: u64,
    pub initial_interval_ms: u64,
    pub max_interval_ms: u64,
    pub use_exponential_backoff: bool,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10000,
            initial_interval_ms: 100,
            max_interval_ms: 500,
            use_exponential_backoff: true,
        }
    }
}

impl PollConfig {
    pub fn with_timeout(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }
}

/// Poll `probe` until it yields a value or the timeout elapses
///
/// The probe always runs at least once, even with a zero timeout.
pub async fn poll_until<T, F, Fut>(probe: F, config: PollConfig) -> Option<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let start = Instant::now();
    let timeout = Duration::from_millis(config.timeout_ms);
    let mut interval = config.initial_interval_ms;

    loop {
        if let Some(value) = probe().await {
            return Some(value);
        }
        if start.elapsed() >= timeout {
            return None;
        }

        tokio::time::sleep(Duration::from_millis(interval)).await;

        if config.use_exponential_backoff {
            interval = (interval * 3 / 2).min(config.max_interval_ms);
        }
    }
}

// ============================================================================
// Text Utilities
// ============================================================================

/// Make a scenario name safe to embed in an artifact file name
pub fn safe_file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}
