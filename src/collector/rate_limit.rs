//! Host pacing for the community site
//!
//! The community host publishes no rate contract, so every request from the
//! process goes through one [`HostPacer`] that spaces requests by a base delay
//! plus random jitter. The pacer is a single global gate for the host; it does
//! not distinguish between paths.

use rand::Rng;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use super::config::{DEFAULT_BASE_DELAY_MS, PACING_JITTER_MAX_MS, PACING_JITTER_MIN_MS};

/// Minimum, jittered spacing between requests to one host
///
/// Share it behind an `Arc` between every worker of a run. The whole
/// read-compare-sleep-advance sequence of [`HostPacer::wait`] happens under
/// one lock, so concurrent callers are served strictly one slot at a time.
#[derive(Debug)]
pub struct HostPacer {
    base_delay: Duration,
    jitter_min: Duration,
    jitter_max: Duration,
    next_permitted: Mutex<Option<Instant>>,
}

impl HostPacer {
    /// Create a pacer with the given base delay and the default jitter window
    pub fn new(base_delay: Duration) -> Self {
        Self::with_jitter(
            base_delay,
            Duration::from_millis(PACING_JITTER_MIN_MS),
            Duration::from_millis(PACING_JITTER_MAX_MS),
        )
    }

    /// Create a pacer with an explicit jitter window
    ///
    /// A reversed window is normalised.
    pub fn with_jitter(base_delay: Duration, jitter_min: Duration, jitter_max: Duration) -> Self {
        let (jitter_min, jitter_max) = if jitter_min <= jitter_max {
            (jitter_min, jitter_max)
        } else {
            (jitter_max, jitter_min)
        };
        Self {
            base_delay,
            jitter_min,
            jitter_max,
            next_permitted: Mutex::new(None),
        }
    }

    /// A pacer that never waits (tests, offline fixtures)
    pub fn unpaced() -> Self {
        Self::with_jitter(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Base delay between two slots
    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Wait until the next request may be sent, then reserve the following slot
    pub async fn wait(&self) {
        let mut next_permitted = self.next_permitted.lock().await;

        if let Some(next) = *next_permitted {
            let remaining = next.saturating_duration_since(Instant::now());
            if !remaining.is_zero() {
                trace!(wait_ms = remaining.as_millis() as u64, "pacing request");
                sleep_until(next).await;
            }
        }

        *next_permitted = Some(Instant::now() + self.base_delay + self.jitter());
    }

    fn jitter(&self) -> Duration {
        if self.jitter_max.is_zero() {
            return Duration::ZERO;
        }
        let secs = rand::thread_rng()
            .gen_range(self.jitter_min.as_secs_f64()..=self.jitter_max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

impl Default for HostPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_BASE_DELAY_MS))
    }
}
