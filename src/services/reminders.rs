use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, TimeZone, Utc};

use crate::error::AppError;
use crate::models::{Reminder, ReminderView};

/// Canonical stored form of an instant: RFC 3339 in UTC with second precision.
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Accepts RFC 3339, or a local `YYYY-MM-DDTHH:MM` as produced by date and time pickers.
pub fn normalize_deadline(input: &str) -> Result<String, AppError> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(timestamp(at.with_timezone(&Utc)));
    }
    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M")
        .map_err(|_| AppError::BadRequest(format!("invalid deadline: {:?}", input)))?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| AppError::BadRequest(format!("deadline does not exist locally: {:?}", input)))?;
    Ok(timestamp(local.with_timezone(&Utc)))
}

pub fn is_overdue(reminder: &Reminder, now: DateTime<Utc>) -> bool {
    !reminder.completed && reminder.deadline < timestamp(now)
}

pub fn with_overdue(reminders: Vec<Reminder>, now: DateTime<Utc>) -> Vec<ReminderView> {
    reminders
        .into_iter()
        .map(|reminder| ReminderView {
            overdue: is_overdue(&reminder, now),
            reminder,
        })
        .collect()
}

pub fn notification_body(reminder: &Reminder) -> String {
    format!("It's time for: {}", reminder.title)
}
