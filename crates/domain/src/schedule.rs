//! Window schedules — randomized on/off timelines for a single window.
//!
//! A schedule splits a dwell time into `changes` alternating periods. Each
//! period takes its fair share of the time still left, jittered by up to
//! ±30 %, so consecutive activations never flicker the same way twice.
//!
//! ## Drift
//!
//! The periods sum to *roughly* the requested dwell time. With `k` changes
//! left a period takes between `0.7/k` and `1.3/k` of the remaining time.
//! For `k ≥ 2` that is at most 65 %, so the remainder never runs out before
//! the last period. The last period is the remainder `r ≤ ttl` jittered by at
//! most 30 %, and every earlier period was subtracted exactly, so
//! `total = ttl + e·r` with `|e| ≤ 0.3`. Hence `|total − ttl| ≤ 0.3 · ttl`
//! for every non-empty schedule.
//!
//! Periods are never shorter than [`MIN_PERIOD`]. A `ttl` of fewer
//! nanoseconds than `changes` therefore overshoots the drift bound.

use std::fmt;
use std::time::Duration;

use rand::Rng;

/// Relative jitter applied to each period's fair share.
pub const PERIOD_FLUCTUATION: f64 = 0.3;

/// Shortest period ever generated.
pub const MIN_PERIOD: Duration = Duration::from_nanos(1);

/// One step of a window program: hold `is_on` for `duration`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub is_on: bool,
    pub duration: Duration,
}

/// Ordered on/off timeline for one window during one activation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSchedule(Vec<Period>);

impl WindowSchedule {
    /// Generate a schedule of `changes` alternating periods spanning about `ttl`.
    ///
    /// The initial state is drawn uniformly. `changes == 0` yields an empty
    /// schedule.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, ttl: Duration, changes: u32) -> Self {
        let mut time_left = ttl;
        let mut is_on = rng.random_bool(0.5);
        let mut periods = Vec::with_capacity(changes as usize);

        for changes_left in (1..=changes).rev() {
            let fair_share = time_left / changes_left;
            let duration = jitter(rng, fair_share, PERIOD_FLUCTUATION).max(MIN_PERIOD);

            periods.push(Period { is_on, duration });
            time_left = time_left.saturating_sub(duration);
            is_on = !is_on;
        }

        Self(periods)
    }

    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of every period.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.0.iter().map(|period| period.duration).sum()
    }
}

impl IntoIterator for WindowSchedule {
    type Item = Period;
    type IntoIter = std::vec::IntoIter<Period>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for WindowSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for period in &self.0 {
            let state = if period.is_on { "on" } else { "off" };
            write!(f, "[{state} {:?}]", period.duration)?;
        }
        Ok(())
    }
}

/// `base + base · U(−fluctuation, +fluctuation)`.
///
/// Shared with the live flow, which jitters its activation interval the same way.
pub fn jitter<R: Rng + ?Sized>(rng: &mut R, base: Duration, fluctuation: f64) -> Duration {
    let factor = 1.0 + rng.random_range(-fluctuation..fluctuation);
    base.mul_f64(factor)
}
