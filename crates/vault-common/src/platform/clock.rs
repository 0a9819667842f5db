//! Tick sources.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonic tick counter.
///
/// Ticks have no fixed unit; capability expiry and cache TTLs are expressed
/// in the same ticks the source returns.
pub trait TickSource: Send + Sync {
    /// Returns the current tick. Must never decrease.
    fn now(&self) -> u64;
}

/// Millisecond ticks since the clock was created.
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock starting at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickSource for MonotonicClock {
    fn now(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same counter, so a test can keep one handle and give
/// another to the engine.
///
/// # Example
///
/// ```rust
/// use vault_common::platform::{ManualClock, TickSource};
///
/// let clock = ManualClock::new(10);
/// let handle = clock.clone();
/// handle.advance(5);
/// assert_eq!(clock.now(), 15);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ticks: Arc<AtomicU64>,
}

impl ManualClock {
    /// Creates a clock at the given tick.
    #[must_use]
    pub fn new(start: u64) -> Self {
        Self {
            ticks: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, ticks: u64) {
        self.ticks.fetch_add(ticks, Ordering::SeqCst);
    }

    /// Sets the clock, ignoring values that would move it backwards.
    pub fn set(&self, tick: u64) {
        self.ticks.fetch_max(tick, Ordering::SeqCst);
    }
}

impl TickSource for ManualClock {
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }
}
