//! Room repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::entities::rooms;

/// Error types for room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Room not found.
    #[error("Room not found: {0}")]
    NotFound(Uuid),

    /// A room with this name already exists.
    #[error("A room named {0:?} already exists")]
    DuplicateName(String),

    /// Capacity must be positive.
    #[error("Room capacity must be positive")]
    InvalidCapacity,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a room.
#[derive(Debug, Clone)]
pub struct CreateRoomInput {
    /// Room name.
    pub name: String,
    /// Seat capacity.
    pub capacity: i32,
}

/// Input for updating a room.
#[derive(Debug, Clone, Default)]
pub struct UpdateRoomInput {
    /// New name.
    pub name: Option<String>,
    /// New capacity.
    pub capacity: Option<i32>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Room repository.
#[derive(Debug, Clone)]
pub struct RoomRepository {
    db: DatabaseConnection,
}

impl RoomRepository {
    /// Creates a new room repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a room with a unique name.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateName` or `InvalidCapacity` on validation failure.
    pub async fn create(&self, input: CreateRoomInput) -> Result<rooms::Model, RoomError> {
        if input.capacity <= 0 {
            return Err(RoomError::InvalidCapacity);
        }

        let name = input.name.trim().to_string();
        let existing = rooms::Entity::find()
            .filter(rooms::Column::Name.eq(&name))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(RoomError::DuplicateName(name));
        }

        let now = Utc::now();
        let room = rooms::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            capacity: Set(input.capacity),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(room.insert(&self.db).await?)
    }

    /// Lists all rooms by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self) -> Result<Vec<rooms::Model>, RoomError> {
        Ok(rooms::Entity::find()
            .order_by_asc(rooms::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Gets one room.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn get(&self, id: Uuid) -> Result<rooms::Model, RoomError> {
        rooms::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(RoomError::NotFound(id))
    }

    /// Updates room attributes.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `DuplicateName`, or `InvalidCapacity`.
    pub async fn update(&self, id: Uuid, input: UpdateRoomInput) -> Result<rooms::Model, RoomError> {
        let prev = self.get(id).await?;

        if let Some(capacity) = input.capacity
            && capacity <= 0
        {
            return Err(RoomError::InvalidCapacity);
        }

        let name = input.name.map(|n| n.trim().to_string());
        if let Some(name) = name.as_deref()
            && name != prev.name
        {
            let existing = rooms::Entity::find()
                .filter(rooms::Column::Name.eq(name))
                .filter(rooms::Column::Id.ne(id))
                .one(&self.db)
                .await?;
            if existing.is_some() {
                return Err(RoomError::DuplicateName(name.to_string()));
            }
        }

        let mut active: rooms::ActiveModel = prev.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(capacity) = input.capacity {
            active.capacity = Set(capacity);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }
}
