//! Clearcut Services Library
//!
//! The two service-layer pieces of the gateway: the background-removal
//! provider client (`matting`) and the retention sweep with its monthly
//! scheduler (`cleanup`).

pub mod cleanup;
pub mod matting;

// Re-export commonly used types
pub use cleanup::schedule::{start_sweeper, ScheduleError, SweepSchedule, SweepTask};
pub use cleanup::CleanupService;
pub use matting::{MattingClient, MattingError};
