//! Retention sweep and its scheduler.

pub mod schedule;
pub mod service;

pub use schedule::{start_sweeper, ScheduleError, SweepSchedule, SweepTask};
pub use service::{CleanupService, RETENTION_MONTHS};
