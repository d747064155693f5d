use std::{
    fmt,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};

use crate::row_buffer::RowBuffer;

pub const ELAPSED_LABEL: &str = "Time";
pub const DELTA_LABEL: &str = "d ms";

/// Time columns added in front of every row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampMode {
    None,
    /// Elapsed seconds since session start and milliseconds since the previous row.
    #[default]
    DecimalSeconds,
}

impl TimestampMode {
    #[must_use]
    pub const fn labels(self) -> &'static [&'static str] {
        match self {
            Self::None => &[],
            Self::DecimalSeconds => &[ELAPSED_LABEL, DELTA_LABEL],
        }
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Computes the elapsed and delta columns when a row is completed.
pub struct TimestampInjector {
    clock: Box<dyn Clock + Send>,
    time_base: Instant,
    last_row: Instant,
}

impl fmt::Debug for TimestampInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimestampInjector")
            .field("time_base", &self.time_base)
            .field("last_row", &self.last_row)
            .finish_non_exhaustive()
    }
}

impl TimestampInjector {
    pub fn new(clock: Box<dyn Clock + Send>) -> Self {
        let now = clock.now();
        Self {
            clock,
            time_base: now,
            last_row: now,
        }
    }

    /// Sample the clock and put both time columns in front of the row.
    pub fn prepare_row(&mut self, row: &mut RowBuffer) {
        let (elapsed, delta) = self.sample();
        row.prepend(&format!("{:.3}", delta.as_secs_f64() * 1000.0));
        row.prepend(&format!("{:.3}", elapsed.as_secs_f64()));
    }

    pub fn reset_time_base(&mut self) {
        let now = self.clock.now();
        self.time_base = now;
        self.last_row = now;
    }

    fn sample(&mut self) -> (Duration, Duration) {
        let now = self.clock.now();
        let elapsed = now.saturating_duration_since(self.time_base);
        let delta = now.saturating_duration_since(self.last_row);
        self.last_row = now;
        (elapsed, delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scripted_clock(offsets_ms: Vec<u64>) -> MockClock {
        let base = Instant::now();
        let mut offsets = offsets_ms.into_iter();
        let mut clock = MockClock::new();
        clock.expect_now().returning(move || {
            let offset = offsets.next().expect("clock sampled more often than scripted");
            base + Duration::from_millis(offset)
        });
        clock
    }

    fn stamp(injector: &mut TimestampInjector) -> String {
        let mut row = RowBuffer::new();
        row.append("v");
        injector.prepare_row(&mut row);
        row.flush_and_reset()
    }

    #[test]
    fn labels_per_mode() {
        assert!(TimestampMode::None.labels().is_empty());
        assert_eq!(TimestampMode::DecimalSeconds.labels(), ["Time", "d ms"]);
    }

    #[test]
    fn elapsed_is_cumulative_and_delta_incremental() {
        let clock = scripted_clock(vec![0, 1500, 1520, 3000]);
        let mut injector = TimestampInjector::new(Box::new(clock));
        assert_eq!(stamp(&mut injector), "1.500,1500.000,v\n");
        assert_eq!(stamp(&mut injector), "1.520,20.000,v\n");
        assert_eq!(stamp(&mut injector), "3.000,1480.000,v\n");
    }

    #[test]
    fn reset_restarts_both_baselines() {
        let clock = scripted_clock(vec![0, 1000, 5000, 5250]);
        let mut injector = TimestampInjector::new(Box::new(clock));
        assert_eq!(stamp(&mut injector), "1.000,1000.000,v\n");
        injector.reset_time_base();
        assert_eq!(stamp(&mut injector), "0.250,250.000,v\n");
    }

    #[test]
    fn clock_going_backwards_saturates() {
        let clock = scripted_clock(vec![1000, 500]);
        let mut injector = TimestampInjector::new(Box::new(clock));
        assert_eq!(stamp(&mut injector), "0.000,0.000,v\n");
    }

    #[test]
    fn monotonic_clock_never_decreases() {
        let clock = MonotonicClock;
        let first = clock.now();
        assert!(clock.now() >= first);
    }
}
