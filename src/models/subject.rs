use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::AppError;
use crate::services::attendance::{self, AttendanceStatus, Requirement};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub attended: u32,
    pub missed: u32,
    pub requirement: f64,
    pub created_at: String,
}

impl Subject {
    pub fn status(&self) -> Result<AttendanceStatus, AppError> {
        let requirement = Requirement::new(self.requirement)?;
        Ok(attendance::evaluate(self.attended, self.missed, requirement))
    }
}

/// A subject together with its derived attendance status.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectView {
    #[serde(flatten)]
    pub subject: Subject,
    pub status: AttendanceStatus,
}

impl TryFrom<Subject> for SubjectView {
    type Error = AppError;

    fn try_from(subject: Subject) -> Result<Self, Self::Error> {
        let status = subject.status()?;
        Ok(Self { subject, status })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubjectRequest {
    pub name: String,
    pub requirement: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub requirement: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Counter {
    Attended,
    Missed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceChangeRequest {
    pub field: Counter,
    pub change: i64,
}
