//! Fixed-period decision clock, independent of the movement tick rate.

use tracing::debug;

/// Most decision ticks a single `advance` reports. Time owed beyond that is dropped.
pub const MAX_TICKS_PER_ADVANCE: u32 = 8;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecisionScheduler {
    period: f64,
    elapsed: f64,
}

impl DecisionScheduler {
    pub fn new(period: f64) -> Self {
        Self { period, elapsed: 0.0 }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Accumulates `dt` seconds and returns how many decision ticks fell due.
    ///
    /// Negative or non-finite steps are ignored. At most `MAX_TICKS_PER_ADVANCE` ticks are
    /// reported per call.
    pub fn advance(&mut self, dt: f64) -> u32 {
        if !dt.is_finite() || dt <= 0.0 || self.period.is_nan() || self.period <= 0.0 {
            return 0;
        }
        self.elapsed += dt;
        let due = (self.elapsed / self.period).floor();
        self.elapsed -= due * self.period;
        self.elapsed = self.elapsed.max(0.0);
        if due > f64::from(MAX_TICKS_PER_ADVANCE) {
            debug!(due, "decision backlog dropped");
        }
        due.min(f64::from(MAX_TICKS_PER_ADVANCE)) as u32
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}
