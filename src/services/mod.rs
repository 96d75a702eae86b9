pub mod attendance;
pub mod materials;
pub mod reminders;
pub mod scheduler;
pub mod timetable;

pub use scheduler::{DispatchStats, ReminderScheduler};
