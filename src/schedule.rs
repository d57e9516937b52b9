//! Scheduled driver: fires the pipeline at fixed UTC times each day.
//!
//! Runs happen one after another on a single task, so two runs never overlap.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, Utc};
use tracing::{info, warn};

use crate::config::{ScheduleSettings, SettingsError};
use crate::pipeline::Pipeline;
use crate::report::ReportKind;

/// Daily fire times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Sorted, without duplicates, never empty.
    times: Vec<NaiveTime>,
    run_on_start: bool,
}

impl Schedule {
    /// Create a schedule; at least one time is required.
    pub fn new(mut times: Vec<NaiveTime>, run_on_start: bool) -> Result<Self, SettingsError> {
        if times.is_empty() {
            return Err(SettingsError::InvalidConfig(
                "schedule.times must contain at least one time".to_string(),
            ));
        }
        times.sort();
        times.dedup();
        Ok(Self {
            times,
            run_on_start,
        })
    }

    /// Parse `HH:MM` times from settings.
    pub fn from_settings(settings: &ScheduleSettings) -> Result<Self, SettingsError> {
        let times = settings
            .times
            .iter()
            .map(|t| parse_time(t))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(times, settings.run_on_start)
    }

    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    pub fn run_on_start(&self) -> bool {
        self.run_on_start
    }

    /// The first fire time strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let current = now.time();

        if let Some(time) = self.times.iter().find(|t| **t > current) {
            return today.and_time(*time).and_utc();
        }

        // `times` is never empty.
        let first = self.times[0];
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        tomorrow.and_time(first).and_utc()
    }

    /// The next fire time, never at or before the slot that last fired.
    ///
    /// A wall clock that lags the timer at wake-up would otherwise select the
    /// slot that just ran.
    pub fn next_fire(&self, now: DateTime<Utc>, last_fire: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let from = last_fire.map_or(now, |last| last.max(now));
        self.next_after(from)
    }
}

fn parse_time(value: &str) -> Result<NaiveTime, SettingsError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .map_err(|_| SettingsError::InvalidTime(value.to_string()))
}

/// Runs a pipeline on a [`Schedule`] until shut down.
pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    schedule: Schedule,
    kinds: Vec<ReportKind>,
}

impl Scheduler {
    pub fn new(pipeline: Arc<Pipeline>, schedule: Schedule, kinds: Vec<ReportKind>) -> Self {
        Self {
            pipeline,
            schedule,
            kinds,
        }
    }

    /// Fire runs until `shutdown` resolves. Returns the number of runs.
    ///
    /// Shutdown is observed between runs; a run in progress completes first.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut runs = 0;
        let mut last_fire = None;

        if self.schedule.run_on_start {
            info!("running report on start");
            self.run_once().await;
            runs += 1;
        }

        loop {
            let now = Utc::now();
            let next = self.schedule.next_fire(now, last_fire);
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            info!(next_run = %next, wait_secs = wait.as_secs(), "waiting for next run");

            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("scheduler shutting down");
                    break;
                }
                _ = tokio::time::sleep(wait) => {
                    last_fire = Some(next);
                    self.run_once().await;
                    runs += 1;
                }
            }
        }

        runs
    }

    async fn run_once(&self) {
        let report = self.pipeline.run(&self.kinds).await;
        if report.segments_failed > 0 {
            warn!(failed = report.segments_failed, "run finished with delivery failures");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn schedule(times: &[&str]) -> Schedule {
        Schedule::from_settings(&ScheduleSettings {
            times: times.iter().map(|t| t.to_string()).collect(),
            run_on_start: false,
        })
        .unwrap()
    }

    #[test]
    fn test_times_are_sorted_and_deduplicated() {
        let schedule = schedule(&["18:30", "06:00", "18:30"]);
        assert_eq!(schedule.times(), &[at(6, 0), at(18, 30)]);
    }

    #[test]
    fn test_next_after_same_day() {
        let schedule = schedule(&["06:00", "18:30"]);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 7, 0, 0).unwrap();

        assert_eq!(
            schedule.next_after(now),
            Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_next_after_rolls_to_tomorrow() {
        let schedule = schedule(&["06:00"]);
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();

        assert_eq!(
            schedule.next_after(now),
            Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_next_after_is_strictly_later() {
        let schedule = schedule(&["06:00"]);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();

        assert_eq!(
            schedule.next_after(now),
            Utc.with_ymd_and_hms(2024, 5, 2, 6, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_invalid_and_empty_times() {
        let bad = Schedule::from_settings(&ScheduleSettings {
            times: vec!["6pm".to_string()],
            run_on_start: false,
        });
        assert!(matches!(bad, Err(SettingsError::InvalidTime(t)) if t == "6pm"));

        let empty = Schedule::new(vec![], true);
        assert!(matches!(empty, Err(SettingsError::InvalidConfig(_))));
    }

    #[test]
    fn test_next_fire_skips_slot_already_fired() {
        let schedule = schedule(&["06:00", "18:30"]);
        let fired = Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap();
        // Wall clock still slightly behind the slot when the timer wakes.
        let lagging = Utc.with_ymd_and_hms(2024, 5, 1, 5, 59, 59).unwrap();

        assert_eq!(schedule.next_after(lagging), fired);
        assert_eq!(
            schedule.next_fire(lagging, Some(fired)),
            Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_next_fire_without_history_uses_now() {
        let schedule = schedule(&["06:00"]);
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 5, 0, 0).unwrap();

        assert_eq!(schedule.next_fire(now, None), schedule.next_after(now));
    }
}
