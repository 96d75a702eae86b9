use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{patch, post};
use axum::{Router, extract::State, http::StatusCode, routing::get};
use chrono::Utc;
use serde::Deserialize;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::services::materials;
use crate::services::reminders::with_overdue;
use crate::services::timetable::SortMode;
use crate::services::{DispatchStats, ReminderScheduler};
use crate::state::AppState;

#[derive(Deserialize)]
struct LectureQueryParams {
    day: Option<Weekday>,
    #[serde(default)]
    sort: SortMode,
}

#[derive(Deserialize)]
struct MaterialQueryParams {
    q: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/subjects", get(list_subjects).post(create_subject))
        .route("/subjects/{id}", patch(update_subject).delete(delete_subject))
        .route("/subjects/{id}/attendance", patch(change_attendance))
        .route("/lectures", get(list_lectures).post(create_lecture))
        .route("/lectures/{id}", axum::routing::delete(delete_lecture))
        .route("/lectures/{id}/move", post(move_lecture))
        .route("/reminders", get(list_reminders).post(create_reminder))
        .route("/reminders/dispatch", post(dispatch_reminders))
        .route("/reminders/{id}", axum::routing::delete(delete_reminder))
        .route("/reminders/{id}/toggle", patch(toggle_reminder))
        .route("/materials", get(list_materials).post(create_material))
        .route("/materials/{id}", axum::routing::delete(delete_material))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_subjects(State(state): State<AppState>) -> Result<Json<Vec<SubjectView>>, AppError> {
    let subjects = repository::fetch_subjects(&state.db)
        .await?
        .into_iter()
        .map(SubjectView::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(subjects))
}

async fn create_subject(
    State(state): State<AppState>,
    Json(req): Json<NewSubjectRequest>
) -> Result<(StatusCode, Json<SubjectView>), AppError> {
    let subject = repository::insert_subject(&state.db, req, state.default_requirement).await?;
    Ok((StatusCode::CREATED, Json(SubjectView::try_from(subject)?)))
}

async fn update_subject(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSubjectRequest>
) -> Result<Json<SubjectView>, AppError> {
    let subject = repository::update_subject(&state.db, &id, req)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(SubjectView::try_from(subject)?))
}

async fn change_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AttendanceChangeRequest>
) -> Result<Json<SubjectView>, AppError> {
    let subject = repository::change_attendance(&state.db, &id, req.field, req.change)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(SubjectView::try_from(subject)?))
}

async fn delete_subject(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    if repository::delete_subject(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn list_lectures(
    State(state): State<AppState>,
    Query(params): Query<LectureQueryParams>
) -> Result<Json<Vec<Lecture>>, AppError> {
    let day = params.day.unwrap_or_else(Weekday::today);
    let lectures = repository::fetch_lectures_for_day(&state.db, day, params.sort).await?;
    Ok(Json(lectures))
}

async fn create_lecture(
    State(state): State<AppState>,
    Json(req): Json<NewLectureRequest>
) -> Result<(StatusCode, Json<Lecture>), AppError> {
    let lecture = repository::insert_lecture(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(lecture)))
}

// Deleting a lecture that is already gone is not an error.
async fn delete_lecture(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    repository::delete_lecture(&state.db, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn move_lecture(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<MoveLectureRequest>
) -> Result<Json<MoveResponse>, AppError> {
    let response = match repository::move_lecture(&state.db, &id, req.direction).await? {
        Some((outcome, lectures)) => MoveResponse {
            moved: outcome.moved(),
            lectures,
        },
        None => MoveResponse {
            moved: false,
            lectures: Vec::new(),
        },
    };
    Ok(Json(response))
}

async fn list_reminders(State(state): State<AppState>) -> Result<Json<Vec<ReminderView>>, AppError> {
    let reminders = repository::fetch_reminders(&state.db).await?;
    Ok(Json(with_overdue(reminders, Utc::now())))
}

async fn create_reminder(
    State(state): State<AppState>,
    Json(req): Json<NewReminderRequest>
) -> Result<(StatusCode, Json<Reminder>), AppError> {
    let reminder = repository::insert_reminder(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(reminder)))
}

async fn toggle_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<Json<Reminder>, AppError> {
    let reminder = repository::toggle_reminder(&state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(reminder))
}

async fn delete_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    if repository::delete_reminder(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn dispatch_reminders(State(state): State<AppState>) -> Result<Json<DispatchStats>, AppError> {
    let scheduler = ReminderScheduler::new(state.db.clone(), state.notifier.clone(), 1);
    let stats = scheduler.dispatch_due(Utc::now()).await?;
    Ok(Json(stats))
}

async fn list_materials(
    State(state): State<AppState>,
    Query(params): Query<MaterialQueryParams>
) -> Result<Json<Vec<MaterialGroup>>, AppError> {
    let subjects = repository::fetch_subjects(&state.db).await?;
    let files = repository::fetch_materials(&state.db).await?;
    Ok(Json(materials::group_by_subject(&subjects, &files, params.q.as_deref())))
}

async fn create_material(
    State(state): State<AppState>,
    Json(req): Json<NewMaterialRequest>
) -> Result<(StatusCode, Json<Material>), AppError> {
    let material = repository::insert_material(&state.db, req).await?;
    Ok((StatusCode::CREATED, Json(material)))
}

async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<String>
) -> Result<StatusCode, AppError> {
    if repository::delete_material(&state.db, &id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
