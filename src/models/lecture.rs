use std::fmt;

use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::timetable::{Direction, Ordered};

/// Day names are matched case-insensitively when read back from JSON, query
/// strings or the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn today() -> Self {
        Self::from(Local::now().weekday())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Self::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Weekday {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.as_str().eq_ignore_ascii_case(&value))
            .ok_or_else(|| format!("unknown weekday: {}", value))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lecture {
    pub id: String,
    pub subject_id: String,
    pub subject_name: String,
    #[sqlx(try_from = "String")]
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub color: String,
    #[sqlx(rename = "sort_order")]
    pub order: Option<i64>,
}

impl Ordered for Lecture {
    type Group = Weekday;

    fn id(&self) -> &str {
        &self.id
    }

    fn group(&self) -> Weekday {
        self.day
    }

    fn order(&self) -> Option<i64> {
        self.order
    }

    fn set_order(&mut self, order: i64) {
        self.order = Some(order);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLectureRequest {
    pub subject_id: String,
    pub day: Weekday,
    pub start_time: String,
    pub end_time: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveLectureRequest {
    pub direction: Direction,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoveResponse {
    pub moved: bool,
    pub lectures: Vec<Lecture>,
}
