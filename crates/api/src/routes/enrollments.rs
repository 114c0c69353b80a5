//! Enrollment routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
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
    entities::sea_orm_active_enums::EnrollmentStatus,
    repositories::enrollment::{
        CreateEnrollmentInput, EnrollmentError, EnrollmentFilter, EnrollmentRepository,
        UpdateEnrollmentInput,
    },
};
use tutoria_shared::types::{PageRequest, PageResponse};

const ENROLLMENT_ROLES: &[&str] = &["ADMIN", "MANAGER"];

/// Creates the enrollment routes (requires auth middleware applied
/// externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enrollments", post(create_enrollment))
        .route("/enrollments", get(list_enrollments))
        .route("/enrollments/{id}", get(get_enrollment))
        .route("/enrollments/{id}", put(update_enrollment))
        .route("/enrollments/{id}", delete(remove_enrollment))
}

/// Request body for creating an enrollment.
#[derive(Debug, Deserialize)]
pub struct CreateEnrollmentRequest {
    /// Student to enroll.
    pub student_id: Uuid,
    /// Target group.
    pub group_id: Uuid,
    /// Join date; defaults to today.
    pub join_date: Option<NaiveDate>,
}

/// Request body for updating an enrollment.
#[derive(Debug, Deserialize)]
pub struct UpdateEnrollmentRequest {
    /// New status.
    pub status: Option<EnrollmentStatus>,
    /// New leave date.
    pub leave_date: Option<NaiveDate>,
}

/// Query parameters for listing enrollments.
#[derive(Debug, Deserialize)]
pub struct EnrollmentListQuery {
    /// Student filter.
    pub student_id: Option<Uuid>,
    /// Group filter.
    pub group_id: Option<Uuid>,
    /// Status filter.
    pub status: Option<EnrollmentStatus>,
    /// Join date lower bound.
    pub from: Option<NaiveDate>,
    /// Join date upper bound.
    pub to: Option<NaiveDate>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
}

fn enrollment_error_response(e: &EnrollmentError) -> Response {
    let app_error = match e {
        EnrollmentError::StudentNotFound(_)
        | EnrollmentError::GroupNotFound(_)
        | EnrollmentError::NotFound(_) => AppError::NotFound(e.to_string()),
        EnrollmentError::GroupArchived(_) | EnrollmentError::GroupFull(_) => {
            AppError::BusinessRule(e.to_string())
        }
        EnrollmentError::AlreadyEnrolled { .. } => AppError::Conflict(e.to_string()),
        EnrollmentError::Database(_) => {
            error!(error = %e, "Enrollment database error");
            AppError::Database("An error occurred".to_string())
        }
    };

    error_response(&app_error)
}

/// POST /enrollments - Enroll a student into a group.
async fn create_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateEnrollmentRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ENROLLMENT_ROLES) {
        return response;
    }

    let repo = EnrollmentRepository::new((*state.db).clone());
    let input = CreateEnrollmentInput {
        student_id: payload.student_id,
        group_id: payload.group_id,
        join_date: payload.join_date,
    };

    match repo.create(input).await {
        Ok(enrollment) => (StatusCode::CREATED, Json(enrollment)).into_response(),
        Err(e) => enrollment_error_response(&e),
    }
}

/// GET /enrollments - List enrollments with filters.
async fn list_enrollments(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<EnrollmentListQuery>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ENROLLMENT_ROLES) {
        return response;
    }

    let repo = EnrollmentRepository::new((*state.db).clone());
    let filter = EnrollmentFilter {
        student_id: query.student_id,
        group_id: query.group_id,
        status: query.status,
        from: query.from,
        to: query.to,
    };

    let page = PageRequest {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
    };

    match repo.list(filter, &page).await {
        Ok((items, total)) => {
            Json(PageResponse::new(items, page.page, page.limit, total)).into_response()
        }
        Err(e) => enrollment_error_response(&e),
    }
}

/// GET /enrollments/{id} - Get one enrollment.
async fn get_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ENROLLMENT_ROLES) {
        return response;
    }

    let repo = EnrollmentRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => enrollment_error_response(&e),
    }
}

/// PUT /enrollments/{id} - Update status or leave date.
async fn update_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEnrollmentRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ENROLLMENT_ROLES) {
        return response;
    }

    let repo = EnrollmentRepository::new((*state.db).clone());
    let input = UpdateEnrollmentInput {
        status: payload.status,
        leave_date: payload.leave_date,
    };

    match repo.update(id, input).await {
        Ok(enrollment) => Json(enrollment).into_response(),
        Err(e) => enrollment_error_response(&e),
    }
}

/// DELETE /enrollments/{id} - Mark an enrollment as LEFT.
async fn remove_enrollment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ENROLLMENT_ROLES) {
        return response;
    }

    let repo = EnrollmentRepository::new((*state.db).clone());
    match repo.remove(id).await {
        Ok(enrollment) => Json(enrollment).into_response(),
        Err(e) => enrollment_error_response(&e),
    }
}
