//! Room management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    middleware::{AuthUser, require_role},
    routes::error_response,
};
use tutoria_shared::AppError;
use tutoria_db::repositories::room::{
    CreateRoomInput, RoomError, RoomRepository, UpdateRoomInput,
};

const ROOM_ROLES: &[&str] = &["ADMIN", "MANAGER"];

/// Creates the room routes (requires auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms", get(list_rooms))
        .route("/rooms/{id}", put(update_room))
}

/// Request body for creating a room.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoomRequest {
    /// Room name.
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    /// Seat capacity.
    #[validate(range(min = 1, max = 500))]
    pub capacity: i32,
}

/// Request body for updating a room.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoomRequest {
    /// New name.
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    /// New capacity.
    #[validate(range(min = 1, max = 500))]
    pub capacity: Option<i32>,
    /// New active flag.
    pub is_active: Option<bool>,
}

fn room_error_response(e: &RoomError) -> Response {
    let app_error = match e {
        RoomError::NotFound(_) => AppError::NotFound(e.to_string()),
        RoomError::DuplicateName(_) => AppError::Conflict(e.to_string()),
        RoomError::InvalidCapacity => AppError::Validation(e.to_string()),
        RoomError::Database(_) => {
            error!(error = %e, "Room database error");
            AppError::Database("An error occurred".to_string())
        }
    };

    error_response(&app_error)
}

/// POST /rooms - Create a room.
async fn create_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateRoomRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ROOM_ROLES) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return error_response(&AppError::Validation(e.to_string()));
    }

    let repo = RoomRepository::new((*state.db).clone());
    match repo
        .create(CreateRoomInput {
            name: payload.name,
            capacity: payload.capacity,
        })
        .await
    {
        Ok(room) => (StatusCode::CREATED, Json(room)).into_response(),
        Err(e) => room_error_response(&e),
    }
}

/// GET /rooms - List all rooms.
async fn list_rooms(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ROOM_ROLES) {
        return response;
    }

    let repo = RoomRepository::new((*state.db).clone());
    match repo.list().await {
        Ok(rooms) => Json(rooms).into_response(),
        Err(e) => room_error_response(&e),
    }
}

/// PUT /rooms/{id} - Update a room.
async fn update_room(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoomRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, ROOM_ROLES) {
        return response;
    }
    if let Err(e) = payload.validate() {
        return error_response(&AppError::Validation(e.to_string()));
    }

    let repo = RoomRepository::new((*state.db).clone());
    match repo
        .update(
            id,
            UpdateRoomInput {
                name: payload.name,
                capacity: payload.capacity,
                is_active: payload.is_active,
            },
        )
        .await
    {
        Ok(room) => Json(room).into_response(),
        Err(e) => room_error_response(&e),
    }
}
