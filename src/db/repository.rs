use chrono::{Local, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Counter, Lecture, Material, NewLectureRequest, NewMaterialRequest, NewReminderRequest,
    NewSubjectRequest, Reminder, Subject, UpdateSubjectRequest, Weekday,
};
use crate::services::attendance::Requirement;
use crate::services::timetable::{self, Direction, MoveOutcome, SortMode};
use crate::services::{materials, reminders};

const SUBJECT_COLUMNS: &str = "id, name, attended, missed, requirement, created_at";
const LECTURE_COLUMNS: &str =
    "id, subject_id, subject_name, day, start_time, end_time, color, sort_order";
const REMINDER_COLUMNS: &str = "id, title, deadline, intensity, completed, notified_at";
const MATERIAL_COLUMNS: &str = "id, subject_id, title, file_name, size, date_added";

fn required_name(value: &str, what: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", what)));
    }
    Ok(value.to_string())
}

// ---- subjects ----

pub async fn fetch_subjects(db: &SqlitePool) -> Result<Vec<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!(
        "SELECT {} FROM subjects ORDER BY created_at, rowid",
        SUBJECT_COLUMNS
    ))
    .fetch_all(db)
    .await
}

pub async fn find_subject_by_id(db: &SqlitePool, id: &str) -> Result<Option<Subject>, sqlx::Error> {
    sqlx::query_as::<_, Subject>(&format!("SELECT {} FROM subjects WHERE id = ?", SUBJECT_COLUMNS))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn insert_subject(
    db: &SqlitePool,
    req: NewSubjectRequest,
    default_requirement: Requirement,
) -> Result<Subject, AppError> {
    let name = required_name(&req.name, "subject name")?;
    let requirement = match req.requirement {
        Some(value) => Requirement::new(value)?,
        None => default_requirement,
    };

    let subject = Subject {
        id: Uuid::new_v4().to_string(),
        name,
        attended: 0,
        missed: 0,
        requirement: requirement.value(),
        created_at: Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO subjects (id, name, attended, missed, requirement, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&subject.id)
    .bind(&subject.name)
    .bind(subject.attended)
    .bind(subject.missed)
    .bind(subject.requirement)
    .bind(&subject.created_at)
    .execute(db)
    .await?;

    debug!("created subject {} ({})", subject.name, subject.id);
    Ok(subject)
}

pub async fn update_subject(
    db: &SqlitePool,
    id: &str,
    req: UpdateSubjectRequest,
) -> Result<Option<Subject>, AppError> {
    let mut tx = db.begin().await?;

    let mut current = match sqlx::query_as::<_, Subject>(&format!(
        "SELECT {} FROM subjects WHERE id = ?",
        SUBJECT_COLUMNS
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    {
        Some(s) => s,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = required_name(&name, "subject name")?;
    }
    if let Some(requirement) = req.requirement {
        current.requirement = Requirement::new(requirement)?.value();
    }

    sqlx::query("UPDATE subjects SET name = ?1, requirement = ?2 WHERE id = ?3")
        .bind(&current.name)
        .bind(current.requirement)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    // Lectures carry the subject name for display and sort-by-name.
    sqlx::query("UPDATE lectures SET subject_name = ?1 WHERE subject_id = ?2")
        .bind(&current.name)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Some(current))
}

/// Applies a stepper change to one counter, clamping the result to `0..=u32::MAX`.
pub async fn change_attendance(
    db: &SqlitePool,
    id: &str,
    field: Counter,
    change: i64,
) -> Result<Option<Subject>, sqlx::Error> {
    let sql = match field {
        Counter::Attended => {
            "UPDATE subjects SET attended = MIN(MAX(attended + ?1, 0), 4294967295) WHERE id = ?2"
        }
        Counter::Missed => {
            "UPDATE subjects SET missed = MIN(MAX(missed + ?1, 0), 4294967295) WHERE id = ?2"
        }
    };

    let mut tx = db.begin().await?;
    let affected = sqlx::query(sql)
        .bind(change)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if affected == 0 {
        return Ok(None);
    }
    let subject = sqlx::query_as::<_, Subject>(&format!("SELECT {} FROM subjects WHERE id = ?", SUBJECT_COLUMNS))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Some(subject))
}

/// Removes a subject together with every lecture and material filed under it.
pub async fn delete_subject(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let mut tx = db.begin().await?;

    let lectures = sqlx::query("DELETE FROM lectures WHERE subject_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let files = sqlx::query("DELETE FROM materials WHERE subject_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    let deleted = sqlx::query("DELETE FROM subjects WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if deleted == 0 {
        tx.rollback().await?;
        return Ok(false);
    }
    tx.commit().await?;

    debug!("deleted subject {} with {} lectures, {} materials", id, lectures, files);
    Ok(true)
}

// ---- lectures ----

pub async fn fetch_lectures(db: &SqlitePool) -> Result<Vec<Lecture>, sqlx::Error> {
    sqlx::query_as::<_, Lecture>(&format!("SELECT {} FROM lectures ORDER BY rowid", LECTURE_COLUMNS))
        .fetch_all(db)
        .await
}

pub async fn fetch_lectures_for_day(
    db: &SqlitePool,
    day: Weekday,
    mode: SortMode,
) -> Result<Vec<Lecture>, sqlx::Error> {
    let lectures = sqlx::query_as::<_, Lecture>(&format!(
        "SELECT {} FROM lectures WHERE day = ? ORDER BY rowid",
        LECTURE_COLUMNS
    ))
    .bind(day.as_str())
    .fetch_all(db)
    .await?;

    Ok(timetable::sorted_day(&lectures, day, mode))
}

/// Adds a lecture at the end of its day's manual order.
pub async fn insert_lecture(db: &SqlitePool, req: NewLectureRequest) -> Result<Lecture, AppError> {
    timetable::validate_slot(&req.start_time, &req.end_time)?;

    let mut tx = db.begin().await?;

    let subject = sqlx::query_as::<_, Subject>(&format!("SELECT {} FROM subjects WHERE id = ?", SUBJECT_COLUMNS))
        .bind(&req.subject_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("unknown subject: {}", req.subject_id)))?;

    let mut peers = sqlx::query_as::<_, Lecture>(&format!(
        "SELECT {} FROM lectures WHERE day = ? ORDER BY rowid",
        LECTURE_COLUMNS
    ))
    .bind(req.day.as_str())
    .fetch_all(&mut *tx)
    .await?;

    let color = match req.color {
        Some(c) if !c.trim().is_empty() => c,
        _ => {
            let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM lectures")
                .fetch_one(&mut *tx)
                .await?;
            timetable::palette_color(count.max(0) as usize).to_string()
        }
    };

    timetable::append(
        &mut peers,
        Lecture {
            id: Uuid::new_v4().to_string(),
            subject_id: subject.id,
            subject_name: subject.name,
            day: req.day,
            start_time: req.start_time,
            end_time: req.end_time,
            color,
            order: None,
        },
    );
    let lecture = peers.pop().ok_or(AppError::InternalServerError)?;

    sqlx::query(
        "INSERT INTO lectures (id, subject_id, subject_name, day, start_time, end_time, color, sort_order) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&lecture.id)
    .bind(&lecture.subject_id)
    .bind(&lecture.subject_name)
    .bind(lecture.day.as_str())
    .bind(&lecture.start_time)
    .bind(&lecture.end_time)
    .bind(&lecture.color)
    .bind(lecture.order)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    debug!("added lecture {} on {} at order {:?}", lecture.id, lecture.day, lecture.order);
    Ok(lecture)
}

pub async fn delete_lecture(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM lectures WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Moves a lecture one slot within its day and persists the renumbered rows.
///
/// Returns `None` for an unknown id; otherwise the outcome and the day's
/// lectures in manual order.
pub async fn move_lecture(
    db: &SqlitePool,
    id: &str,
    direction: Direction,
) -> Result<Option<(MoveOutcome, Vec<Lecture>)>, sqlx::Error> {
    let mut tx = db.begin().await?;

    let target = sqlx::query_as::<_, Lecture>(&format!("SELECT {} FROM lectures WHERE id = ?", LECTURE_COLUMNS))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
    let Some(target) = target else {
        return Ok(None);
    };

    let mut peers = sqlx::query_as::<_, Lecture>(&format!(
        "SELECT {} FROM lectures WHERE day = ? ORDER BY rowid",
        LECTURE_COLUMNS
    ))
    .bind(target.day.as_str())
    .fetch_all(&mut *tx)
    .await?;

    let outcome = timetable::move_entry(&mut peers, id, direction);
    for changed in &outcome.changed {
        if let Some(lecture) = peers.iter().find(|l| &l.id == changed) {
            sqlx::query("UPDATE lectures SET sort_order = ? WHERE id = ?")
                .bind(lecture.order)
                .bind(&lecture.id)
                .execute(&mut *tx)
                .await?;
        }
    }
    tx.commit().await?;

    if outcome.moved() {
        debug!("moved lecture {} {:?}, {} rows renumbered", id, direction, outcome.changed.len());
    }
    let day = timetable::sorted_day(&peers, target.day, SortMode::Manual);
    Ok(Some((outcome, day)))
}

// ---- reminders ----

pub async fn fetch_reminders(db: &SqlitePool) -> Result<Vec<Reminder>, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(&format!(
        "SELECT {} FROM reminders ORDER BY deadline, rowid",
        REMINDER_COLUMNS
    ))
    .fetch_all(db)
    .await
}

pub async fn insert_reminder(db: &SqlitePool, req: NewReminderRequest) -> Result<Reminder, AppError> {
    let reminder = Reminder {
        id: Uuid::new_v4().to_string(),
        title: required_name(&req.title, "reminder title")?,
        deadline: reminders::normalize_deadline(&req.deadline)?,
        intensity: req.intensity,
        completed: false,
        notified_at: None,
    };

    sqlx::query(
        "INSERT INTO reminders (id, title, deadline, intensity, completed, notified_at) VALUES (?, ?, ?, ?, 0, NULL)",
    )
    .bind(&reminder.id)
    .bind(&reminder.title)
    .bind(&reminder.deadline)
    .bind(reminder.intensity.as_str())
    .execute(db)
    .await?;

    debug!("created reminder {} due {}", reminder.id, reminder.deadline);
    Ok(reminder)
}

pub async fn toggle_reminder(db: &SqlitePool, id: &str) -> Result<Option<Reminder>, sqlx::Error> {
    let mut tx = db.begin().await?;
    let affected = sqlx::query("UPDATE reminders SET completed = NOT completed WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    if affected == 0 {
        return Ok(None);
    }
    let reminder = sqlx::query_as::<_, Reminder>(&format!("SELECT {} FROM reminders WHERE id = ?", REMINDER_COLUMNS))
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(Some(reminder))
}

pub async fn delete_reminder(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reminders WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Open reminders whose deadline has passed and that were never notified.
pub async fn fetch_due_reminders(db: &SqlitePool, now: &str) -> Result<Vec<Reminder>, sqlx::Error> {
    sqlx::query_as::<_, Reminder>(&format!(
        "SELECT {} FROM reminders WHERE completed = 0 AND notified_at IS NULL AND deadline <= ? ORDER BY deadline, rowid",
        REMINDER_COLUMNS
    ))
    .bind(now)
    .fetch_all(db)
    .await
}

/// Stamps `notified_at` only if no other pass has claimed the reminder yet.
///
/// Returns `false` when the reminder was already claimed (or is gone), in
/// which case the caller must not deliver it.
pub async fn claim_for_notification(db: &SqlitePool, id: &str, at: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE reminders SET notified_at = ?1 WHERE id = ?2 AND notified_at IS NULL")
        .bind(at)
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

/// Undoes a claim made at `at`, so a failed delivery is retried on the next pass.
pub async fn release_claim(db: &SqlitePool, id: &str, at: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE reminders SET notified_at = NULL WHERE id = ?1 AND notified_at = ?2")
        .bind(id)
        .bind(at)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

// ---- materials ----

pub async fn fetch_materials(db: &SqlitePool) -> Result<Vec<Material>, sqlx::Error> {
    sqlx::query_as::<_, Material>(&format!("SELECT {} FROM materials ORDER BY rowid", MATERIAL_COLUMNS))
        .fetch_all(db)
        .await
}

pub async fn insert_material(db: &SqlitePool, req: NewMaterialRequest) -> Result<Material, AppError> {
    let file_name = required_name(&req.file_name, "file name")?;
    let size = materials::size_label(req.size_bytes)?;
    if find_subject_by_id(db, &req.subject_id).await?.is_none() {
        return Err(AppError::BadRequest(format!("unknown subject: {}", req.subject_id)));
    }

    let material = Material {
        id: Uuid::new_v4().to_string(),
        subject_id: req.subject_id,
        title: materials::resolve_title(req.title.as_deref(), &file_name),
        file_name,
        size,
        date_added: Local::now().format("%Y-%m-%d").to_string(),
    };

    sqlx::query(
        "INSERT INTO materials (id, subject_id, title, file_name, size, date_added) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&material.id)
    .bind(&material.subject_id)
    .bind(&material.title)
    .bind(&material.file_name)
    .bind(&material.size)
    .bind(&material.date_added)
    .execute(db)
    .await?;

    Ok(material)
}

pub async fn delete_material(db: &SqlitePool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM materials WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}
