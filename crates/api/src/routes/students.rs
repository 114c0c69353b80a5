//! Student management routes.

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
use validator::Validate;

use crate::{
    AppState,
    middleware::{AuthUser, require_role},
    routes::error_response,
};
use tutoria_core::auth::hash_password;
use tutoria_db::repositories::student::{
    CreateStudentInput, StudentError, StudentRepository,
};
use tutoria_shared::AppError;
use tutoria_shared::types::{PageRequest, PageResponse};

const STUDENT_ROLES: &[&str] = &["ADMIN", "MANAGER"];

/// Creates the student routes (requires auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students", post(create_student))
        .route("/students", get(list_students))
        .route("/students/{id}", get(get_student))
}

/// Request body for creating a student.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    /// Contact/login phone.
    #[validate(length(min = 7, max = 32))]
    pub phone: String,
    /// Initial password.
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    /// First name.
    #[validate(length(min = 1, max = 128))]
    pub first_name: String,
    /// Last name.
    #[validate(length(min = 1, max = 128))]
    pub last_name: String,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Free-text note.
    pub note: Option<String>,
}

/// Query parameters for listing students.
#[derive(Debug, Deserialize)]
pub struct StudentListQuery {
    /// Name/phone substring search.
    pub search: Option<String>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
}

fn student_error_response(e: &StudentError) -> Response {
    let app_error = match e {
        StudentError::NotFound(_) => AppError::NotFound(e.to_string()),
        StudentError::DuplicatePhone(_) => AppError::Conflict(e.to_string()),
        StudentError::Database(_) => {
            error!(error = %e, "Student database error");
            AppError::Database("An error occurred".to_string())
        }
    };

    error_response(&app_error)
}

/// POST /students - Create a student account and profile.
async fn create_student(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateStudentRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, STUDENT_ROLES) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return error_response(&AppError::Validation(e.to_string()));
    }

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return error_response(&AppError::Internal("An error occurred".to_string()));
        }
    };

    let repo = StudentRepository::new((*state.db).clone());
    let input = CreateStudentInput {
        phone: payload.phone,
        password_hash,
        first_name: payload.first_name,
        last_name: payload.last_name,
        date_of_birth: payload.date_of_birth,
        note: payload.note,
    };

    match repo.create(input).await {
        Ok(student) => (StatusCode::CREATED, Json(student)).into_response(),
        Err(e) => student_error_response(&e),
    }
}

/// GET /students - List students with search and pagination.
async fn list_students(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<StudentListQuery>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, STUDENT_ROLES) {
        return response;
    }

    let repo = StudentRepository::new((*state.db).clone());
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
    };
    match repo.list(query.search.as_deref(), &page).await {
        Ok((items, total)) => {
            Json(PageResponse::new(items, page.page, page.limit, total)).into_response()
        }
        Err(e) => student_error_response(&e),
    }
}

/// GET /students/{id} - Get one student.
async fn get_student(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, STUDENT_ROLES) {
        return response;
    }

    let repo = StudentRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(student) => Json(student).into_response(),
        Err(e) => student_error_response(&e),
    }
}
