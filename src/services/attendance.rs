//! Attendance status derived from a subject's counters.
//!
//! Everything here is pure and recomputed on every read.

use std::fmt;

use serde::Serialize;

use crate::error::AppError;

/// Minimum fraction of attended sessions, strictly between 0 and 1.
///
/// A requirement of exactly 1.0 would make the must-attend formula divide by
/// zero, so it is rejected here rather than guarded inside [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Requirement(f64);

impl Requirement {
    pub fn new(value: f64) -> Result<Self, AppError> {
        if value.is_finite() && value > 0.0 && value < 1.0 {
            Ok(Self(value))
        } else {
            Err(AppError::BadRequest(format!(
                "requirement must be between 0 and 1 (exclusive), got {}",
                value
            )))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum Advice {
    NoClasses,
    OnTrack,
    CanSkip(u64),
    MustAttend(u64),
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::NoClasses => write!(f, "No classes yet"),
            Advice::OnTrack => write!(f, "On Track"),
            Advice::CanSkip(n) => write!(f, "Can Skip Next {}", n),
            Advice::MustAttend(n) => write!(f, "Must Attend Next {}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceStatus {
    pub percentage: f64,
    pub message: String,
    pub is_safe: bool,
    pub advice: Advice,
}

impl AttendanceStatus {
    fn new(percentage: f64, advice: Advice, is_safe: bool) -> Self {
        Self {
            percentage,
            message: advice.to_string(),
            is_safe,
            advice,
        }
    }
}

pub fn evaluate(attended: u32, missed: u32, requirement: Requirement) -> AttendanceStatus {
    let total = u64::from(attended) + u64::from(missed);
    if total == 0 {
        return AttendanceStatus::new(0.0, Advice::NoClasses, true);
    }

    let attended = attended as f64;
    let total = total as f64;
    let requirement = requirement.value();

    // The ratio is compared before scaling: an exact boundary such as 11/20
    // against 0.55 rounds to the same double, while `100 * 11 / 20` does not.
    let ratio = attended / total;
    let percentage = ratio * 100.0;

    if ratio >= requirement {
        // Sessions that can be missed in a row while staying at or above the requirement.
        let can_skip = (attended / requirement - total).floor();
        let advice = if can_skip > 0.0 {
            Advice::CanSkip(can_skip as u64)
        } else {
            Advice::OnTrack
        };
        AttendanceStatus::new(percentage, advice, true)
    } else {
        // Sessions that must be attended in a row to get back to the requirement.
        let need = ((requirement * total - attended) / (1.0 - requirement)).ceil();
        AttendanceStatus::new(percentage, Advice::MustAttend(need.max(1.0) as u64), false)
    }
}
