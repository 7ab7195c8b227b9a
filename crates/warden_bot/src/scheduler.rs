//! Once-a-day job runner.

use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use warden_core::DayTime;
use warden_error::ConfigError;

use crate::DailyJob;

/// How often the scheduler looks for due jobs.
pub const DEFAULT_TICK: Duration = Duration::from_secs(30);

struct ScheduledJob {
    at: DayTime,
    schedule: cron::Schedule,
    job: Arc<dyn DailyJob>,
    last_check: Option<DateTime<Utc>>,
    last_run: Option<NaiveDate>,
}

impl ScheduledJob {
    /// Whether the job's time passed since the previous check and it has not
    /// run yet on `now`'s day.
    fn take_due(&mut self, now: DateTime<Utc>, tick: Duration) -> bool {
        let since = self.last_check.unwrap_or_else(|| {
            now - chrono::Duration::from_std(tick).unwrap_or(chrono::Duration::zero())
        });
        self.last_check = Some(now);

        let passed = self
            .schedule
            .after(&since)
            .next()
            .is_some_and(|fire_at| fire_at <= now);
        let today = now.date_naive();
        if passed && self.last_run != Some(today) {
            self.last_run = Some(today);
            true
        } else {
            false
        }
    }
}

/// Runs each registered job once a day at its configured time.
///
/// Constructed explicitly and shared by reference; there is no global
/// instance. Jobs run on their own tasks so a slow job does not delay the
/// others.
pub struct DailyScheduler {
    jobs: Mutex<Vec<ScheduledJob>>,
    tick: Duration,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl DailyScheduler {
    /// Create a scheduler checking for due jobs every `tick`.
    pub fn new(tick: Duration) -> Self {
        Self {
            jobs: Mutex::new(Vec::new()),
            tick,
            cancel: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    /// Register `job` to run every day at `at` (UTC).
    pub fn add_job(&self, at: DayTime, job: Arc<dyn DailyJob>) -> Result<(), ConfigError> {
        let schedule = cron::Schedule::from_str(&at.cron_expression()).map_err(|e| {
            ConfigError::new(format!("invalid schedule for {}: {}", job.name(), e))
        })?;
        tracing::info!(job = %job.name(), at = %at, "Daily job registered");
        self.jobs.lock().push(ScheduledJob {
            at,
            schedule,
            job,
            last_check: None,
            last_run: None,
        });
        Ok(())
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.lock().len()
    }

    /// Whether no job is registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.lock().is_empty()
    }

    /// Jobs due at `now`, marking them as run for the day.
    pub fn due(&self, now: DateTime<Utc>) -> Vec<Arc<dyn DailyJob>> {
        let mut jobs = self.jobs.lock();
        jobs.iter_mut()
            .filter_map(|scheduled| {
                if scheduled.take_due(now, self.tick) {
                    tracing::debug!(job = %scheduled.job.name(), at = %scheduled.at, "Daily job due");
                    Some(Arc::clone(&scheduled.job))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Check for due jobs every tick until [`stop`](Self::stop) is called.
    ///
    /// Returns at once when no job is registered. On stop, waits for the
    /// jobs already started.
    pub async fn run(&self) {
        if self.is_empty() {
            tracing::info!("No daily jobs registered");
            return;
        }

        let mut interval = tokio::time::interval(self.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(jobs = self.len(), "Daily scheduler started");

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = interval.tick() => {
                    let now = Utc::now();
                    for job in self.due(now) {
                        self.tracker.spawn(async move {
                            match job.run(now).await {
                                Ok(()) => tracing::info!(job = %job.name(), "Daily job finished"),
                                Err(e) => tracing::error!(job = %job.name(), error = %e, "Daily job failed"),
                            }
                        });
                    }
                }
            }
        }

        self.tracker.close();
        self.tracker.wait().await;
        tracing::info!("Daily scheduler stopped");
    }

    /// Ask [`run`](Self::run) to return.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Default for DailyScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TICK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use warden_error::WardenResult;

    struct Noop;

    #[async_trait]
    impl DailyJob for Noop {
        fn name(&self) -> &str {
            "noop"
        }

        async fn run(&self, _now: DateTime<Utc>) -> WardenResult<()> {
            Ok(())
        }
    }

    fn at(d: u32, h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, m, s).unwrap()
    }

    fn scheduler() -> DailyScheduler {
        let scheduler = DailyScheduler::new(Duration::from_secs(60));
        scheduler
            .add_job("09:00".parse().unwrap(), Arc::new(Noop))
            .unwrap();
        scheduler
    }

    #[test]
    fn test_not_due_before_time() {
        let scheduler = scheduler();
        assert!(scheduler.due(at(4, 8, 58, 0)).is_empty());
        assert!(scheduler.due(at(4, 8, 59, 59)).is_empty());
    }

    #[test]
    fn test_due_once_per_day() {
        let scheduler = scheduler();
        assert!(scheduler.due(at(4, 8, 59, 30)).is_empty());
        assert_eq!(scheduler.due(at(4, 9, 0, 0)).len(), 1);
        assert!(scheduler.due(at(4, 9, 0, 30)).is_empty());
        assert!(scheduler.due(at(4, 15, 0, 0)).is_empty());
        assert_eq!(scheduler.due(at(5, 9, 0, 10)).len(), 1);
    }

    #[test]
    fn test_first_check_looks_back_one_tick() {
        let first = scheduler();
        assert_eq!(first.due(at(4, 9, 0, 40)).len(), 1);

        let started_at_noon = scheduler();
        assert!(started_at_noon.due(at(4, 12, 0, 0)).is_empty());
    }

    #[tokio::test]
    async fn test_run_without_jobs_returns() {
        DailyScheduler::new(Duration::from_millis(10)).run().await;
    }

    #[tokio::test]
    async fn test_stop_ends_run() {
        let scheduler = Arc::new(scheduler());
        let running = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run().await })
        };
        scheduler.stop();
        tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }
}
