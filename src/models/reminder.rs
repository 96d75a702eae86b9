use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Low,
    #[default]
    Medium,
    High,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Low => "low",
            Intensity::Medium => "medium",
            Intensity::High => "high",
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Intensity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "low" => Ok(Intensity::Low),
            "medium" => Ok(Intensity::Medium),
            "high" => Ok(Intensity::High),
            other => Err(format!("unknown intensity: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reminder {
    pub id: String,
    pub title: String,
    /// RFC 3339, UTC, second precision. Stored this way so text comparison is chronological.
    pub deadline: String,
    #[sqlx(try_from = "String")]
    pub intensity: Intensity,
    pub completed: bool,
    pub notified_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReminderView {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub overdue: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewReminderRequest {
    pub title: String,
    pub deadline: String,
    #[serde(default)]
    pub intensity: Intensity,
}
