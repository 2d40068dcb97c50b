//! Periodic tasks driven by a shared millisecond clock
//!
//! The loop reads the clock once per iteration and asks each task whether
//! it is due. A task that fires records that iteration's timestamp, so
//! late iterations delay the next run instead of bunching runs up.

/// A named activity with a period and the time it last ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PeriodicTask {
    name: &'static str,
    period_ms: u64,
    last_run_ms: u64,
}

impl PeriodicTask {
    /// Create a task whose first run is one period after `now_ms`
    pub const fn new(name: &'static str, period_ms: u32, now_ms: u64) -> Self {
        Self {
            name,
            period_ms: period_ms as u64,
            last_run_ms: now_ms,
        }
    }

    /// Check whether a full period has elapsed, without side effects
    pub fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_run_ms) >= self.period_ms
    }

    /// Check whether the task is due and, if so, mark it as run at `now_ms`
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.is_due(now_ms) {
            debug!(
                "{} due at {} ms ({} ms since last run)",
                self.name,
                now_ms,
                now_ms - self.last_run_ms
            );
            self.last_run_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Restart the period from `now_ms`
    pub fn reset(&mut self, now_ms: u64) {
        self.last_run_ms = now_ms;
    }
}
