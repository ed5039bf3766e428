//! Sweep scheduling
//!
//! A cron expression evaluated in a fixed IANA timezone drives the
//! background sweep task. The default cadence is 02:00 on the 1st of each
//! month. The spawned task wraps every firing in an error boundary: a
//! failed sweep is logged and the next occurrence is still scheduled.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::cleanup::service::CleanupService;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Invalid cron expression: {0}")]
    InvalidExpression(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),
}

/// Parsed sweep cadence: cron expression plus the timezone it is
/// evaluated in.
#[derive(Debug, Clone)]
pub struct SweepSchedule {
    cron: croner::Cron,
    tz: chrono_tz::Tz,
}

impl SweepSchedule {
    /// Parse a standard 5-field cron expression and an IANA timezone name.
    pub fn parse(expr: &str, timezone: &str) -> Result<Self, ScheduleError> {
        let cron = croner::Cron::new(expr)
            .parse()
            .map_err(|e| ScheduleError::InvalidExpression(format!("{e}")))?;
        let tz = timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| ScheduleError::InvalidTimezone(timezone.to_string()))?;
        Ok(Self { cron, tz })
    }

    /// Next firing instant strictly after `after`, in UTC.
    ///
    /// Returns `None` if the expression has no future occurrences.
    pub fn next_occurrence(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let after_tz = after.with_timezone(&self.tz);
        self.cron
            .find_next_occurrence(&after_tz, false)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Handle to the running sweep task. Stop it during graceful shutdown.
pub struct SweepTask {
    handle: JoinHandle<()>,
    stop: watch::Sender<bool>,
}

impl SweepTask {
    /// Signal the task to stop and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.handle.await;
    }
}

/// Spawn the background task that fires `sweep()` on the configured
/// cadence.
///
/// The scheduled firing and the manual trigger endpoint share the same
/// `CleanupService::sweep`; there is no separate scheduled code path. A
/// sweep failure is caught and logged here and never takes the task or the
/// host process down.
pub fn start_sweeper(service: Arc<CleanupService>, schedule: SweepSchedule) -> SweepTask {
    let (stop, mut stop_rx) = watch::channel(false);

    let handle = tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let Some(next) = schedule.next_occurrence(now) else {
                tracing::warn!("Sweep schedule has no future occurrence; scheduler exiting");
                break;
            };
            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            tracing::info!(next_run = %next, "Retention sweep scheduled");

            tokio::select! {
                _ = tokio::time::sleep(wait) => {
                    tracing::info!("Scheduled retention sweep firing");
                    match service.sweep().await {
                        Ok(report) => {
                            tracing::info!(
                                deleted = report.deleted,
                                kept = report.kept,
                                failed = report.failed,
                                "Scheduled sweep completed"
                            );
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Scheduled sweep failed");
                        }
                    }
                }
                _ = stop_rx.changed() => {
                    tracing::info!("Sweep scheduler stopping");
                    break;
                }
            }
        }
    });

    SweepTask { handle, stop }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monthly_schedule_fires_at_0200_on_the_first() {
        let schedule = SweepSchedule::parse("0 2 1 * *", "UTC").unwrap();
        let after = "2026-08-28T10:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let next = schedule.next_occurrence(after).unwrap();
        assert_eq!(next, "2026-09-01T02:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn occurrence_is_evaluated_in_the_configured_timezone() {
        // 02:00 in UTC+7 is 19:00 UTC the previous day.
        let schedule = SweepSchedule::parse("0 2 1 * *", "Asia/Ho_Chi_Minh").unwrap();
        let after = "2026-08-28T10:00:00Z".parse::<DateTime<Utc>>().unwrap();

        let next = schedule.next_occurrence(after).unwrap();
        assert_eq!(next, "2026-08-31T19:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn consecutive_occurrences_are_a_month_apart() {
        let schedule = SweepSchedule::parse("0 2 1 * *", "UTC").unwrap();
        let first = schedule
            .next_occurrence("2026-01-15T00:00:00Z".parse().unwrap())
            .unwrap();
        let second = schedule.next_occurrence(first).unwrap();

        assert_eq!(first, "2026-02-01T02:00:00Z".parse::<DateTime<Utc>>().unwrap());
        assert_eq!(second, "2026-03-01T02:00:00Z".parse::<DateTime<Utc>>().unwrap());
    }

    #[test]
    fn invalid_expression_is_rejected() {
        assert!(matches!(
            SweepSchedule::parse("not a cron", "UTC"),
            Err(ScheduleError::InvalidExpression(_))
        ));
    }

    #[test]
    fn invalid_timezone_is_rejected() {
        assert!(matches!(
            SweepSchedule::parse("0 2 1 * *", "Mars/Olympus_Mons"),
            Err(ScheduleError::InvalidTimezone(_))
        ));
    }
}
