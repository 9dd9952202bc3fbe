//! Seams between the engine and its host.
//!
//! The engine never reads the wall clock directly; it asks a [`Clock`], so
//! a terminal host can use real time while tests and the simulated player
//! step time by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Clock trait
// ---------------------------------------------------------------------------

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;

    /// Seconds elapsed between `since` and now, never negative.
    fn seconds_since(&self, since: Duration) -> f64 {
        self.now().saturating_sub(since).as_secs_f64()
    }
}

/// Real time, measured from construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

// ---------------------------------------------------------------------------
// Manual clock
// ---------------------------------------------------------------------------

/// Clock that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle and give the
/// other to a session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    micros: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward by `seconds` (negative values are ignored).
    pub fn advance_secs(&self, seconds: f64) {
        if seconds > 0.0 {
            // `as` saturates for floats too large for u64.
            self.add_micros((seconds * 1_000_000.0).round() as u64);
        }
    }

    pub fn advance(&self, delta: Duration) {
        self.add_micros(u64::try_from(delta.as_micros()).unwrap_or(u64::MAX));
    }

    /// Time saturates at `u64::MAX` microseconds instead of wrapping.
    fn add_micros(&self, delta: u64) {
        let _ = self
            .micros
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |now| {
                Some(now.saturating_add(delta))
            });
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance_secs(1.5);
        assert!((clock.seconds_since(start) - 1.5).abs() < 1e-9);

        handle.advance(Duration::from_millis(500));
        assert!((clock.seconds_since(start) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn manual_clock_saturates_on_huge_steps() {
        let clock = ManualClock::new();
        clock.advance_secs(2.0);
        clock.advance(Duration::MAX);
        assert_eq!(clock.now(), Duration::from_micros(u64::MAX));

        // Further steps stay pinned instead of wrapping to zero.
        clock.advance(Duration::from_secs(1));
        clock.advance_secs(1.0);
        assert_eq!(clock.now(), Duration::from_micros(u64::MAX));
    }

    #[test]
    fn manual_clock_ignores_negative_steps() {
        let clock = ManualClock::new();
        clock.advance_secs(-3.0);
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn seconds_since_future_is_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.seconds_since(Duration::from_secs(5)), 0.0);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
