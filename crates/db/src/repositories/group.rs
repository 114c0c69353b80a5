//! Group repository: class groups, their schedules, and seat stats.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use tutoria_core::schedule::ranges_overlap;
use tutoria_shared::types::PageRequest;

use crate::entities::{
    enrollments, groups, rooms,
    sea_orm_active_enums::{DaysPattern, EnrollmentStatus},
};

/// Error types for group operations.
#[derive(Debug, thiserror::Error)]
pub enum GroupError {
    /// Group not found.
    #[error("Group not found: {0}")]
    NotFound(Uuid),

    /// Room not found.
    #[error("Room not found: {0}")]
    RoomNotFound(Uuid),

    /// Monthly fee must not be negative.
    #[error("Monthly fee cannot be negative")]
    NegativeFee,

    /// Lesson window must have start before end.
    #[error("Lesson start time must be before end time")]
    InvalidTimeWindow,

    /// An active group with this name already exists.
    #[error("An active group named {0:?} already exists")]
    DuplicateName(String),

    /// Group capacity exceeds the room's capacity.
    #[error("Group capacity {group} exceeds room capacity {room}")]
    CapacityExceedsRoom {
        /// Requested group capacity.
        group: i32,
        /// The room's capacity.
        room: i32,
    },

    /// The room is occupied by another group at that time.
    #[error("Schedule conflict: room occupied by group {0:?}")]
    ScheduleConflict(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a group.
#[derive(Debug, Clone)]
pub struct CreateGroupInput {
    /// Group name.
    pub name: String,
    /// Seat capacity.
    pub capacity: i32,
    /// Weekly pattern.
    pub days_pattern: DaysPattern,
    /// Lesson start, minutes from midnight.
    pub start_minutes: i32,
    /// Lesson end, minutes from midnight.
    pub end_minutes: i32,
    /// Monthly fee.
    pub monthly_fee: Decimal,
    /// Optional room.
    pub room_id: Option<Uuid>,
}

/// Input for updating a group.
#[derive(Debug, Clone, Default)]
pub struct UpdateGroupInput {
    /// New name.
    pub name: Option<String>,
    /// New capacity.
    pub capacity: Option<i32>,
    /// New monthly fee.
    pub monthly_fee: Option<Decimal>,
    /// New room assignment (`Some(None)` clears it).
    pub room_id: Option<Option<Uuid>>,
    /// New active flag.
    pub is_active: Option<bool>,
}

/// Query filter for listing groups.
#[derive(Debug, Clone, Default)]
pub struct GroupFilter {
    /// Name substring search.
    pub search: Option<String>,
    /// Restrict to one pattern.
    pub days_pattern: Option<DaysPattern>,
    /// Restrict by active flag.
    pub is_active: Option<bool>,
    /// Restrict to one room.
    pub room_id: Option<Uuid>,
}

/// Seat statistics for one group.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GroupStats {
    /// The group.
    pub group: groups::Model,
    /// Number of ACTIVE enrollments.
    pub active_enrollments: u64,
    /// Free seats left.
    pub remaining: u64,
    /// True when no seat is free.
    pub is_full: bool,
}

/// Group repository.
#[derive(Debug, Clone)]
pub struct GroupRepository {
    db: DatabaseConnection,
}

impl GroupRepository {
    /// Creates a new group repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a group after validating fee, time window, name uniqueness,
    /// and (when a room is set) capacity and schedule conflicts.
    ///
    /// # Errors
    ///
    /// Returns a validation or conflict error, or a database error.
    pub async fn create(&self, input: CreateGroupInput) -> Result<groups::Model, GroupError> {
        if input.monthly_fee < Decimal::ZERO {
            return Err(GroupError::NegativeFee);
        }
        if input.start_minutes >= input.end_minutes {
            return Err(GroupError::InvalidTimeWindow);
        }

        let name = input.name.trim().to_string();
        self.assert_active_name_unique(&name, None).await?;

        if let Some(room_id) = input.room_id {
            self.assert_capacity_fits_room(room_id, input.capacity).await?;
            self.assert_no_room_schedule_conflict(
                room_id,
                input.days_pattern,
                input.start_minutes,
                input.end_minutes,
                None,
            )
            .await?;
        }

        let now = Utc::now();
        let group = groups::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            capacity: Set(input.capacity),
            days_pattern: Set(input.days_pattern),
            start_minutes: Set(input.start_minutes),
            end_minutes: Set(input.end_minutes),
            monthly_fee: Set(input.monthly_fee),
            room_id: Set(input.room_id),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        Ok(group.insert(&self.db).await?)
    }

    /// Lists groups, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list(
        &self,
        filter: GroupFilter,
        page: &PageRequest,
    ) -> Result<(Vec<groups::Model>, u64), GroupError> {
        let mut query = groups::Entity::find();

        if let Some(pattern) = filter.days_pattern {
            query = query.filter(groups::Column::DaysPattern.eq(pattern));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(groups::Column::IsActive.eq(is_active));
        }
        if let Some(room_id) = filter.room_id {
            query = query.filter(groups::Column::RoomId.eq(room_id));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            query = query.filter(groups::Column::Name.contains(search));
        }

        let total = query.clone().count(&self.db).await?;
        let items = query
            .order_by_desc(groups::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((items, total))
    }

    /// Gets one group.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn get(&self, id: Uuid) -> Result<groups::Model, GroupError> {
        groups::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(GroupError::NotFound(id))
    }

    /// Seat statistics: active enrollments vs capacity.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn stats(&self, id: Uuid) -> Result<GroupStats, GroupError> {
        let group = self.get(id).await?;

        let active_enrollments = enrollments::Entity::find()
            .filter(enrollments::Column::GroupId.eq(id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active))
            .count(&self.db)
            .await?;

        let capacity = u64::from(group.capacity.unsigned_abs());
        Ok(GroupStats {
            remaining: capacity.saturating_sub(active_enrollments),
            is_full: active_enrollments >= capacity,
            active_enrollments,
            group,
        })
    }

    /// Updates group attributes; re-validates name uniqueness and room
    /// placement when those change.
    ///
    /// # Errors
    ///
    /// Returns a validation or conflict error, or `NotFound`.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateGroupInput,
    ) -> Result<groups::Model, GroupError> {
        let prev = self.get(id).await?;

        if let Some(fee) = input.monthly_fee
            && fee < Decimal::ZERO
        {
            return Err(GroupError::NegativeFee);
        }

        let name = input.name.map(|n| n.trim().to_string());
        if let Some(name) = name.as_deref()
            && name != prev.name
        {
            self.assert_active_name_unique(name, Some(id)).await?;
        }

        let capacity = input.capacity.unwrap_or(prev.capacity);
        let room_id = input.room_id.unwrap_or(prev.room_id);
        if let Some(room_id) = room_id {
            self.assert_capacity_fits_room(room_id, capacity).await?;
            self.assert_no_room_schedule_conflict(
                room_id,
                prev.days_pattern,
                prev.start_minutes,
                prev.end_minutes,
                Some(id),
            )
            .await?;
        }

        let mut active: groups::ActiveModel = prev.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        active.capacity = Set(capacity);
        active.room_id = Set(room_id);
        if let Some(fee) = input.monthly_fee {
            active.monthly_fee = Set(fee);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Archives a group (soft delete).
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn archive(&self, id: Uuid) -> Result<groups::Model, GroupError> {
        let group = self.get(id).await?;

        let mut active: groups::ActiveModel = group.into();
        active.is_active = Set(false);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    // ========================================================================
    // Policies
    // ========================================================================

    async fn assert_active_name_unique(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), GroupError> {
        let mut query = groups::Entity::find()
            .filter(groups::Column::Name.eq(name))
            .filter(groups::Column::IsActive.eq(true));
        if let Some(exclude) = exclude {
            query = query.filter(Condition::all().add(groups::Column::Id.ne(exclude)));
        }

        if query.one(&self.db).await?.is_some() {
            return Err(GroupError::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    async fn assert_capacity_fits_room(
        &self,
        room_id: Uuid,
        capacity: i32,
    ) -> Result<(), GroupError> {
        let room = rooms::Entity::find_by_id(room_id)
            .one(&self.db)
            .await?
            .ok_or(GroupError::RoomNotFound(room_id))?;

        if capacity > room.capacity {
            return Err(GroupError::CapacityExceedsRoom {
                group: capacity,
                room: room.capacity,
            });
        }
        Ok(())
    }

    /// ODD and EVEN weekday sets are disjoint, so only groups sharing the
    /// pattern can collide; within those, minute windows must not overlap.
    async fn assert_no_room_schedule_conflict(
        &self,
        room_id: Uuid,
        pattern: DaysPattern,
        start_minutes: i32,
        end_minutes: i32,
        exclude: Option<Uuid>,
    ) -> Result<(), GroupError> {
        let mut query = groups::Entity::find()
            .filter(groups::Column::RoomId.eq(room_id))
            .filter(groups::Column::DaysPattern.eq(pattern))
            .filter(groups::Column::IsActive.eq(true));
        if let Some(exclude) = exclude {
            query = query.filter(groups::Column::Id.ne(exclude));
        }

        let occupants = query.all(&self.db).await?;

        let start = start_minutes.unsigned_abs().try_into().unwrap_or(u16::MAX);
        let end = end_minutes.unsigned_abs().try_into().unwrap_or(u16::MAX);
        let hit = occupants.iter().find(|g| {
            let g_start = g.start_minutes.unsigned_abs().try_into().unwrap_or(u16::MAX);
            let g_end = g.end_minutes.unsigned_abs().try_into().unwrap_or(u16::MAX);
            ranges_overlap(start, end, g_start, g_end)
        });

        if let Some(hit) = hit {
            return Err(GroupError::ScheduleConflict(hit.name.clone()));
        }
        Ok(())
    }
}
