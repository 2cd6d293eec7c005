//! Schedules - when a producer should next fire
//!
//! A [`Schedule`] is a value type computing "time until next fire" from
//! "last run". Three modes:
//!
//! - **Interval**: fixed polling cadence; fires immediately on the first
//!   tick, then every `every` measured from each poll's start
//! - **Cron**: wall-clock expression; fires at the smallest matching time
//!   strictly after now
//! - **Once**: fires exactly once, then the producer is terminal
//!
//! Validation happens at construction: a zero interval, a malformed cron
//! expression, or a cron expression with no future fire time is an
//! [`EngineError::Schedule`], never a runtime surprise.
//!
//! Interval math runs in the `tokio::time::Instant` domain so it is
//! monotonic and plays well with paused-time tests; cron math necessarily
//! consults the wall clock.

use crate::error::{EngineError, Result};
use chrono::Utc;
use std::str::FromStr;
use std::time::Duration;
use tokio::time::Instant;

/// Timing rule governing when a pull plugin fires
#[derive(Debug, Clone)]
pub enum Schedule {
    /// Fixed polling interval
    Interval {
        /// Gap between consecutive fire times, measured start-to-start
        every: Duration,
    },
    /// Cron-style wall-clock expression
    Cron(Box<cron::Schedule>),
    /// Fires exactly once, immediately
    Once,
}

impl Schedule {
    /// Fixed interval schedule
    ///
    /// # Errors
    ///
    /// A zero interval is rejected at construction.
    pub fn interval(every: Duration) -> Result<Self> {
        if every.is_zero() {
            return Err(EngineError::Schedule(
                "interval must be positive".to_string(),
            ));
        }
        Ok(Schedule::Interval { every })
    }

    /// Convenience constructor for whole-second intervals
    pub fn every_secs(secs: u64) -> Result<Self> {
        Self::interval(Duration::from_secs(secs))
    }

    /// Cron expression schedule
    ///
    /// Accepts the classic 5-field form (minute hour day month weekday)
    /// as well as the 6/7-field forms with seconds and an optional year.
    /// A 5-field expression fires at second zero of each matching minute.
    ///
    /// # Errors
    ///
    /// Rejected at construction when the expression does not parse, or
    /// when it has no future fire time at all (e.g. a fixed year in the
    /// past) - such a schedule could only ever produce a dead producer.
    pub fn cron(expr: &str) -> Result<Self> {
        // The parser mandates a seconds field; pin 5-field input to
        // second zero before handing it over.
        let normalized = if expr.split_whitespace().count() == 5 {
            format!("0 {expr}")
        } else {
            expr.to_string()
        };
        let parsed = cron::Schedule::from_str(&normalized)
            .map_err(|e| EngineError::Schedule(format!("bad cron expression '{expr}': {e}")))?;
        if parsed.upcoming(Utc).next().is_none() {
            return Err(EngineError::Schedule(format!(
                "cron expression '{expr}' never fires again"
            )));
        }
        Ok(Schedule::Cron(Box::new(parsed)))
    }

    /// One-shot schedule: a single immediate fire, then terminal
    pub fn once() -> Self {
        Schedule::Once
    }

    /// Time to wait before the next fire
    ///
    /// Returns `None` when the schedule can never fire again - the caller
    /// should treat the producer as terminal and retire it rather than
    /// polling forever. A valid-at-construction cron schedule can still
    /// exhaust mid-run (fixed year reached), so callers must handle `None`
    /// on every tick.
    pub fn next_delay(&self, last_run: Option<Instant>) -> Option<Duration> {
        match self {
            Schedule::Interval { every } => Some(match last_run {
                // First tick fires immediately
                None => Duration::ZERO,
                Some(last) => (last + *every).duration_since(Instant::now()),
            }),
            Schedule::Cron(schedule) => {
                let next = schedule.upcoming(Utc).next()?;
                // Strictly after now by upcoming()'s contract; clamp the
                // conversion in case the fire time just passed.
                Some((next - Utc::now()).to_std().unwrap_or(Duration::ZERO))
            }
            Schedule::Once => match last_run {
                None => Some(Duration::ZERO),
                Some(_) => None,
            },
        }
    }

    /// Whether this schedule fires more than once
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Schedule::Once)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn zero_interval_is_a_construction_error() {
        let err = Schedule::interval(Duration::ZERO).unwrap_err();
        assert!(matches!(err, EngineError::Schedule(_)));
    }

    #[test]
    fn malformed_cron_is_a_construction_error() {
        let err = Schedule::cron("not a cron line").unwrap_err();
        assert!(matches!(err, EngineError::Schedule(_)));
    }

    #[test]
    fn cron_with_no_future_fire_is_a_construction_error() {
        // Fixed year far in the past: parses fine, can never fire again
        let err = Schedule::cron("0 0 0 1 1 ? 2015").unwrap_err();
        assert!(matches!(err, EngineError::Schedule(_)));
    }

    #[test]
    fn five_field_cron_is_accepted() {
        // Classic crontab shape, no seconds field
        let schedule = Schedule::cron("*/5 * * * *").unwrap();
        let delay = schedule.next_delay(None).unwrap();
        // Fires at second zero of a matching minute, at most 5 minutes out
        assert!(delay <= Duration::from_secs(300));
    }

    #[test]
    fn cron_delay_is_positive_and_bounded() {
        // Top of every hour: next fire is within the coming hour
        let schedule = Schedule::cron("0 0 * * * *").unwrap();
        let delay = schedule.next_delay(None).unwrap();
        assert!(delay <= Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_first_tick_fires_immediately() {
        let schedule = Schedule::every_secs(30).unwrap();
        assert_eq!(schedule.next_delay(None), Some(Duration::ZERO));
    }

    #[tokio::test(start_paused = true)]
    async fn interval_delay_is_measured_from_last_run() {
        let schedule = Schedule::every_secs(10).unwrap();
        let last = Instant::now();

        tokio::time::advance(Duration::from_secs(4)).await;
        let delay = schedule.next_delay(Some(last)).unwrap();
        assert_eq!(delay, Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn overrun_poll_yields_zero_delay_not_a_skip() {
        let schedule = Schedule::every_secs(1).unwrap();
        let last = Instant::now();

        // Poll took 2.5 intervals; next fire is due immediately (deferred,
        // not dropped)
        tokio::time::advance(Duration::from_millis(2500)).await;
        let delay = schedule.next_delay(Some(last)).unwrap();
        assert_eq!(delay, Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn once_is_terminal_after_first_run() {
        let schedule = Schedule::once();
        assert_eq!(schedule.next_delay(None), Some(Duration::ZERO));
        assert_eq!(schedule.next_delay(Some(Instant::now())), None);
        assert!(!schedule.is_recurring());
    }
}
