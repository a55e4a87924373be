//! Time representation and time sources.
//!
//! Span timestamps are nanoseconds on a monotonic clock. The clock itself is
//! a seam: production uses [`WallClock`] (backed by `std::time::Instant`, so
//! monotonic by construction), tests use [`ManualClock`] and advance virtual
//! time explicitly so durations are deterministic.

use core::fmt;
use std::ops::Add;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A monotonic timestamp in nanoseconds since its source's epoch.
///
/// Timestamps from different sources share no epoch and must not be compared;
/// within one tracer all spans use one source.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Time(u64);

impl Time {
    /// The zero instant (epoch).
    pub const ZERO: Self = Self(0);

    /// The maximum representable instant.
    pub const MAX: Self = Self(u64::MAX);

    /// Creates a time from nanoseconds since epoch.
    #[inline]
    #[must_use]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Creates a time from milliseconds since epoch.
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Creates a time from seconds since epoch.
    #[inline]
    #[must_use]
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs.saturating_mul(1_000_000_000))
    }

    /// Returns the time as nanoseconds since epoch.
    #[inline]
    #[must_use]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Returns the time as milliseconds since epoch (truncated).
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0 / 1_000_000
    }

    /// Adds a duration in nanoseconds, saturating on overflow.
    #[inline]
    #[must_use]
    pub const fn saturating_add_nanos(self, nanos: u64) -> Self {
        Self(self.0.saturating_add(nanos))
    }

    /// Returns the duration between two times in nanoseconds.
    ///
    /// Returns 0 if `self` is before `earlier`.
    #[inline]
    #[must_use]
    pub const fn duration_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for Time {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add_nanos(duration_to_nanos_saturating(rhs))
    }
}

impl fmt::Debug for Time {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Time({}ns)", self.0)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 >= 1_000_000_000 {
            write!(
                f,
                "{}.{:03}s",
                self.0 / 1_000_000_000,
                (self.0 / 1_000_000) % 1000
            )
        } else if self.0 >= 1_000_000 {
            write!(f, "{}ms", self.0 / 1_000_000)
        } else if self.0 >= 1_000 {
            write!(f, "{}us", self.0 / 1_000)
        } else {
            write!(f, "{}ns", self.0)
        }
    }
}

#[inline]
fn duration_to_nanos_saturating(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Time source abstraction for reading the current time.
///
/// Lets the tracer run against wall clock time in production and virtual
/// time in tests.
pub trait TimeSource: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Time;
}

/// Wall clock time source for production use.
///
/// Uses `std::time::Instant` internally; the epoch is the instant this
/// source was created.
#[derive(Debug)]
pub struct WallClock {
    epoch: std::time::Instant,
}

impl WallClock {
    /// Creates a new wall clock time source.
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: std::time::Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for WallClock {
    fn now(&self) -> Time {
        Time::from_nanos(duration_to_nanos_saturating(self.epoch.elapsed()))
    }
}

/// Virtual time source for deterministic tests.
///
/// Time never moves on its own; call [`ManualClock::advance`] to move it.
/// Shared freely across threads (advance uses atomic stores), so a test can
/// hold a handle to the same clock the tracer reads.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_nanos: AtomicU64,
}

impl ManualClock {
    /// Creates a clock at the epoch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now_nanos: AtomicU64::new(0),
        }
    }

    /// Creates a clock at the given instant.
    #[must_use]
    pub const fn starting_at(now: Time) -> Self {
        Self {
            now_nanos: AtomicU64::new(now.as_nanos()),
        }
    }

    /// Advances the clock by `nanos` nanoseconds, saturating on overflow.
    pub fn advance(&self, nanos: u64) {
        let current = self.now_nanos.load(Ordering::Relaxed);
        self.now_nanos
            .store(current.saturating_add(nanos), Ordering::Relaxed);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Time {
        Time::from_nanos(self.now_nanos.load(Ordering::Relaxed))
    }
}
