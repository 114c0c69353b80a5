//! Group management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    middleware::{AuthUser, require_role},
    routes::error_response,
};
use tutoria_core::schedule::hhmm_to_minutes;
use tutoria_shared::AppError;
use tutoria_db::{
    entities::sea_orm_active_enums::DaysPattern,
    repositories::group::{
        CreateGroupInput, GroupError, GroupFilter, GroupRepository, UpdateGroupInput,
    },
};
use tutoria_shared::types::{PageRequest, PageResponse};

const GROUP_ROLES: &[&str] = &["ADMIN", "MANAGER"];

/// Creates the group routes (requires auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/groups", post(create_group))
        .route("/groups", get(list_groups))
        .route("/groups/{id}", get(get_group))
        .route("/groups/{id}", put(update_group))
        .route("/groups/{id}", delete(archive_group))
        .route("/groups/{id}/stats", get(group_stats))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    /// Group name.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Seat capacity.
    #[validate(range(min = 1, max = 500))]
    pub capacity: i32,
    /// Weekly pattern (ODD or EVEN).
    pub days_pattern: DaysPattern,
    /// Lesson start, "HH:mm".
    pub start_time: String,
    /// Lesson end, "HH:mm".
    pub end_time: String,
    /// Monthly fee.
    pub monthly_fee: Decimal,
    /// Optional room.
    pub room_id: Option<Uuid>,
}

/// Request body for updating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroupRequest {
    /// New name.
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    /// New capacity.
    #[validate(range(min = 1, max = 500))]
    pub capacity: Option<i32>,
    /// New monthly fee.
    pub monthly_fee: Option<Decimal>,
    /// New room assignment.
    pub room_id: Option<Uuid>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Query parameters for listing groups.
#[derive(Debug, Deserialize)]
pub struct GroupListQuery {
    /// Name substring search.
    pub search: Option<String>,
    /// Pattern filter.
    pub days_pattern: Option<DaysPattern>,
    /// Active flag filter.
    pub is_active: Option<bool>,
    /// Room filter.
    pub room_id: Option<Uuid>,
    /// Page number (1-indexed).
    pub page: Option<u32>,
    /// Items per page.
    pub limit: Option<u32>,
}

// ============================================================================
// Helpers
// ============================================================================

fn group_error_response(e: &GroupError) -> Response {
    let app_error = match e {
        GroupError::NotFound(_) | GroupError::RoomNotFound(_) => AppError::NotFound(e.to_string()),
        GroupError::NegativeFee
        | GroupError::InvalidTimeWindow
        | GroupError::CapacityExceedsRoom { .. } => AppError::Validation(e.to_string()),
        GroupError::DuplicateName(_) | GroupError::ScheduleConflict(_) => {
            AppError::Conflict(e.to_string())
        }
        GroupError::Database(_) => {
            error!(error = %e, "Group database error");
            AppError::Database("An error occurred".to_string())
        }
    };

    error_response(&app_error)
}

fn validation_response(message: String) -> Response {
    error_response(&AppError::Validation(message))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /groups - Create a group.
async fn create_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateGroupRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, GROUP_ROLES) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return validation_response(e.to_string());
    }

    let start_minutes = match hhmm_to_minutes(&payload.start_time) {
        Ok(m) => i32::from(m),
        Err(e) => return validation_response(e.to_string()),
    };
    let end_minutes = match hhmm_to_minutes(&payload.end_time) {
        Ok(m) => i32::from(m),
        Err(e) => return validation_response(e.to_string()),
    };

    let repo = GroupRepository::new((*state.db).clone());
    let input = CreateGroupInput {
        name: payload.name,
        capacity: payload.capacity,
        days_pattern: payload.days_pattern,
        start_minutes,
        end_minutes,
        monthly_fee: payload.monthly_fee,
        room_id: payload.room_id,
    };

    match repo.create(input).await {
        Ok(group) => (StatusCode::CREATED, Json(group)).into_response(),
        Err(e) => group_error_response(&e),
    }
}

/// GET /groups - List groups with filters and pagination.
async fn list_groups(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<GroupListQuery>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, GROUP_ROLES) {
        return response;
    }

    let repo = GroupRepository::new((*state.db).clone());
    let filter = GroupFilter {
        search: query.search,
        days_pattern: query.days_pattern,
        is_active: query.is_active,
        room_id: query.room_id,
    };
    let page = PageRequest {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(10),
    };

    match repo.list(filter, &page).await {
        Ok((items, total)) => {
            Json(PageResponse::new(items, page.page, page.limit, total)).into_response()
        }
        Err(e) => group_error_response(&e),
    }
}

/// GET /groups/{id} - Get one group.
async fn get_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, GROUP_ROLES) {
        return response;
    }

    let repo = GroupRepository::new((*state.db).clone());
    match repo.get(id).await {
        Ok(group) => Json(group).into_response(),
        Err(e) => group_error_response(&e),
    }
}

/// GET /groups/{id}/stats - Seat statistics.
async fn group_stats(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, GROUP_ROLES) {
        return response;
    }

    let repo = GroupRepository::new((*state.db).clone());
    match repo.stats(id).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => group_error_response(&e),
    }
}

/// PUT /groups/{id} - Update a group.
async fn update_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateGroupRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, GROUP_ROLES) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return validation_response(e.to_string());
    }

    let repo = GroupRepository::new((*state.db).clone());
    let input = UpdateGroupInput {
        name: payload.name,
        capacity: payload.capacity,
        monthly_fee: payload.monthly_fee,
        room_id: payload.room_id.map(Some),
        is_active: payload.is_active,
    };

    match repo.update(id, input).await {
        Ok(group) => Json(group).into_response(),
        Err(e) => group_error_response(&e),
    }
}

/// DELETE /groups/{id} - Archive a group.
async fn archive_group(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, GROUP_ROLES) {
        return response;
    }

    let repo = GroupRepository::new((*state.db).clone());
    match repo.archive(id).await {
        Ok(group) => Json(group).into_response(),
        Err(e) => group_error_response(&e),
    }
}
