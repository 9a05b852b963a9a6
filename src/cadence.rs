//! Wall-clock polling cadences.
//!
//! The scheduler runs three cadences. The real-time one needs no state; the
//! other two live here:
//!
//! - [`MinuteCadence`] fires once per distinct wall-clock minute. It compares
//!   whole minutes since the Unix epoch, so 59 -> 0 and hour or day rollovers
//!   are ordinary changes.
//! - [`SecondsCadence`] fires when the wall-clock second reaches the last
//!   fired second plus the interval, taking the wrap past 60 into account.

use chrono::{DateTime, Local, TimeZone, Timelike};

/// Snapshot of the wall clock taken once per loop iteration.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ClockReading {
    /// Whole minutes since the Unix epoch.
    pub minute_stamp: i64,
    /// Local time of day.
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl ClockReading {
    pub fn from_datetime<Tz: TimeZone>(datetime: &DateTime<Tz>) -> Self {
        Self {
            minute_stamp: datetime.timestamp().div_euclid(60),
            hour: datetime.hour(),
            minute: datetime.minute(),
            second: datetime.second(),
        }
    }
}

/// Source of wall-clock time.
pub trait Clock {
    fn now(&self) -> ClockReading;
}

/// Local system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct WallClock;

impl Clock for WallClock {
    fn now(&self) -> ClockReading {
        ClockReading::from_datetime(&Local::now())
    }
}

// =============================================================================
// Every-minute cadence
// =============================================================================

#[derive(Debug, Default)]
pub struct MinuteCadence {
    last_stamp: Option<i64>,
}

impl MinuteCadence {
    pub const fn new() -> Self {
        Self { last_stamp: None }
    }

    /// True at most once per distinct minute.
    pub fn check(&mut self, now: &ClockReading) -> bool {
        if self.last_stamp == Some(now.minute_stamp) {
            return false;
        }
        self.last_stamp = Some(now.minute_stamp);
        true
    }
}

// =============================================================================
// Every-N-seconds cadence
// =============================================================================

#[derive(Debug)]
pub struct SecondsCadence {
    interval: u32,
    last_fired: Option<u32>,
    last_seen: u32,
    wrapped: bool,
}

impl SecondsCadence {
    /// `interval` is clamped to 1..=60 seconds.
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.clamp(1, 60),
            last_fired: None,
            last_seen: 0,
            wrapped: false,
        }
    }

    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Forget the last firing so the next check fires. Called when the
    /// cadence resumes after a pause, since a paused cadence sees no wraps.
    pub fn reset(&mut self) {
        self.last_fired = None;
        self.wrapped = false;
    }

    /// Check the cadence against the current wall-clock second (0..60).
    ///
    /// The first check always fires. Afterwards the target is
    /// `last_fired + interval`. Below 60 it fires once the second reaches the
    /// target, or as soon as a wrap is observed (the target was skipped while
    /// the loop was busy). At 60 or above it fires after a wrap once the
    /// second reaches `target - 60`.
    pub fn check(&mut self, second: u32) -> bool {
        let Some(last) = self.last_fired else {
            self.fire(second);
            return true;
        };

        if second < self.last_seen {
            self.wrapped = true;
        }
        self.last_seen = second;

        let target = last + self.interval;
        let due = if target < 60 {
            self.wrapped || second >= target
        } else {
            self.wrapped && second >= target - 60
        };
        if due {
            self.fire(second);
        }
        due
    }

    fn fire(&mut self, second: u32) {
        self.last_fired = Some(second);
        self.last_seen = second;
        self.wrapped = false;
    }
}
