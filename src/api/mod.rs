use std::path::PathBuf;

use axum::Json;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::Deserialize;

use crate::db::{CourseRow, fetch_courses};
use crate::error::AppError;
use crate::state::AppState;
use crate::sync::{CourseSyncResult, SyncReport};

#[derive(Deserialize)]
struct SyncCourseRequest {
    path: PathBuf,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/courses", get(list_courses))
        .route("/sync", post(sync_all))
        .route("/sync/course", post(sync_course))
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseRow>>, AppError> {
    let courses = fetch_courses(&state.db).await?;
    Ok(Json(courses))
}

async fn sync_all(State(state): State<AppState>) -> Json<Vec<CourseSyncResult>> {
    Json(state.coordinator.sync_all(&state.course_dirs).await)
}

/// Syncs one configured course; other paths are not accepted.
async fn sync_course(
    State(state): State<AppState>,
    Json(req): Json<SyncCourseRequest>,
) -> Result<Json<SyncReport>, AppError> {
    if !state.course_dirs.iter().any(|dir| dir == &req.path) {
        return Err(AppError::NotFound);
    }
    let report = state.coordinator.sync_course(&req.path).await?;
    Ok(Json(report))
}
