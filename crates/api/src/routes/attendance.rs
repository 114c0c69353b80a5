//! Attendance routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AuthUser, require_role},
    routes::error_response,
};
use tutoria_shared::AppError;
use tutoria_db::{
    entities::sea_orm_active_enums::AttendanceStatus,
    repositories::attendance::{AttendanceError, AttendanceRepository, MarkInput},
};

const ATTENDANCE_ROLES: &[&str] = &["ADMIN", "MANAGER", "TEACHER"];

/// Creates the attendance routes (requires auth middleware applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/attendance/mark", post(mark))
        .route("/attendance/bulk", post(bulk_mark))
        .route("/attendance/groups/{id}/sheet", get(group_sheet))
}

/// Request body for marking one student.
#[derive(Debug, Deserialize)]
pub struct MarkRequest {
    /// Group being marked.
    pub group_id: Uuid,
    /// Student being marked.
    pub student_id: Uuid,
    /// Lesson date.
    pub date: NaiveDate,
    /// Attendance status.
    pub status: AttendanceStatus,
    /// Free-text note.
    pub note: Option<String>,
}

/// One item of a bulk mark.
#[derive(Debug, Deserialize)]
pub struct BulkMarkItem {
    /// Student being marked.
    pub student_id: Uuid,
    /// Attendance status.
    pub status: AttendanceStatus,
    /// Free-text note.
    pub note: Option<String>,
}

/// Request body for marking a whole sheet.
#[derive(Debug, Deserialize)]
pub struct BulkMarkRequest {
    /// Group being marked.
    pub group_id: Uuid,
    /// Lesson date.
    pub date: NaiveDate,
    /// Marks to record.
    pub items: Vec<BulkMarkItem>,
}

/// Query parameters for the monthly sheet.
#[derive(Debug, Deserialize)]
pub struct SheetQuery {
    /// Sheet year.
    pub year: i32,
    /// Sheet month (1-12).
    pub month: u32,
}

fn attendance_error_response(e: &AttendanceError) -> Response {
    let app_error = match e {
        AttendanceError::GroupNotFound(_) | AttendanceError::StudentNotFound(_) => {
            AppError::NotFound(e.to_string())
        }
        AttendanceError::Database(_) => {
            error!(error = %e, "Attendance database error");
            AppError::Database("An error occurred".to_string())
        }
    };

    error_response(&app_error)
}

/// POST /attendance/mark - Record one mark.
async fn mark(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<MarkRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ATTENDANCE_ROLES) {
        return response;
    }

    let repo = AttendanceRepository::new((*state.db).clone());
    let input = MarkInput {
        student_id: payload.student_id,
        status: payload.status,
        note: payload.note,
    };

    match repo
        .mark(payload.group_id, payload.date, input, auth.user_id())
        .await
    {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => attendance_error_response(&e),
    }
}

/// POST /attendance/bulk - Record a whole sheet for one date.
async fn bulk_mark(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<BulkMarkRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ATTENDANCE_ROLES) {
        return response;
    }

    let repo = AttendanceRepository::new((*state.db).clone());
    let items = payload
        .items
        .into_iter()
        .map(|item| MarkInput {
            student_id: item.student_id,
            status: item.status,
            note: item.note,
        })
        .collect();

    match repo
        .bulk_mark(payload.group_id, payload.date, items, auth.user_id())
        .await
    {
        Ok(records) => (StatusCode::CREATED, Json(records)).into_response(),
        Err(e) => attendance_error_response(&e),
    }
}

/// GET /attendance/groups/{id}/sheet - Monthly sheet for a group.
async fn group_sheet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(group_id): Path<Uuid>,
    Query(query): Query<SheetQuery>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ATTENDANCE_ROLES) {
        return response;
    }

    let repo = AttendanceRepository::new((*state.db).clone());
    match repo.group_sheet(group_id, query.year, query.month).await {
        Ok(sheet) => Json(sheet).into_response(),
        Err(e) => attendance_error_response(&e),
    }
}
