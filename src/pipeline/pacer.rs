//! Cooperative pacing toward the shared OSM endpoints.
//!
//! Every external call goes through a `Pacer` before it fires, so the pacing
//! policy is swappable without touching per-item logic. The discipline
//! assumes this process is the sole caller during a run; there is no
//! cross-run coordination.

use std::time::{Duration, Instant};

/// Minimum gap between external calls, per the public instances'
/// acceptable-use guidance.
pub const COURTESY_DELAY: Duration = Duration::from_millis(1500);

/// Gate that a caller passes through before each external request.
pub trait Pacer {
    /// Block until the next call may proceed.
    fn pace(&mut self);
}

/// Enforces a fixed minimum interval between consecutive calls. The first
/// call passes immediately; later calls sleep off whatever remains of the
/// interval.
pub struct FixedDelay {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedDelay {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: None }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(COURTESY_DELAY)
    }
}

impl Pacer for FixedDelay {
    fn pace(&mut self) {
        if let Some(last) = self.last {
            let elapsed = last.elapsed();
            if elapsed < self.interval {
                std::thread::sleep(self.interval - elapsed);
            }
        }
        self.last = Some(Instant::now());
    }
}

/// Pass-through pacer for tests.
pub struct NoDelay;

impl Pacer for NoDelay {
    fn pace(&mut self) {}
}
