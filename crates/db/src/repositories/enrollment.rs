//! Enrollment repository: joining and leaving groups.
//!
//! Creating an enrollment triggers the initial tuition charge for the join
//! month. That step is deliberately non-fatal: a missing charge can be
//! recomputed later, a rolled-back enrollment cannot.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use tracing::warn;
use uuid::Uuid;

use tutoria_shared::types::PageRequest;

use crate::entities::{
    enrollments, groups, students, users,
    sea_orm_active_enums::EnrollmentStatus,
};
use crate::repositories::finance::FinanceRepository;

/// Error types for enrollment operations.
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    /// Student not found.
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(Uuid),

    /// Group is archived.
    #[error("Group is not active (archived): {0}")]
    GroupArchived(Uuid),

    /// The student already has an ACTIVE enrollment in this group.
    #[error("Student {student_id} is already active in group {group_id}")]
    AlreadyEnrolled {
        /// Student ID.
        student_id: Uuid,
        /// Group ID.
        group_id: Uuid,
    },

    /// The group has no free seat.
    #[error("Group is full (capacity reached): {0}")]
    GroupFull(Uuid),

    /// Enrollment not found.
    #[error("Enrollment not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an enrollment.
#[derive(Debug, Clone)]
pub struct CreateEnrollmentInput {
    /// Student to enroll.
    pub student_id: Uuid,
    /// Target group.
    pub group_id: Uuid,
    /// Join date; defaults to today.
    pub join_date: Option<NaiveDate>,
}

/// Input for updating an enrollment's status.
#[derive(Debug, Clone, Default)]
pub struct UpdateEnrollmentInput {
    /// New status.
    pub status: Option<EnrollmentStatus>,
    /// New leave date.
    pub leave_date: Option<NaiveDate>,
}

/// Query filter for listing enrollments.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentFilter {
    /// Restrict to one student.
    pub student_id: Option<Uuid>,
    /// Restrict to one group.
    pub group_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<EnrollmentStatus>,
    /// Join date lower bound.
    pub from: Option<NaiveDate>,
    /// Join date upper bound.
    pub to: Option<NaiveDate>,
}

/// Enrollment joined with display names.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EnrollmentView {
    /// The enrollment row.
    pub enrollment: enrollments::Model,
    /// Student's full name.
    pub student_name: String,
    /// Student's contact phone.
    pub student_phone: String,
    /// Group name.
    pub group_name: String,
}

/// Enrollment repository.
#[derive(Debug, Clone)]
pub struct EnrollmentRepository {
    db: DatabaseConnection,
}

impl EnrollmentRepository {
    /// Creates a new enrollment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Enrolls a student into a group and triggers the join-month tuition
    /// charge.
    ///
    /// # Errors
    ///
    /// Returns an error when the student or group is missing, the group is
    /// archived or full, or the student is already active in the group. A
    /// failure in the charge step is logged and does NOT fail the
    /// enrollment.
    pub async fn create(
        &self,
        input: CreateEnrollmentInput,
    ) -> Result<enrollments::Model, EnrollmentError> {
        self.assert_student_exists(input.student_id).await?;
        self.assert_group_active(input.group_id).await?;
        self.assert_no_duplicate_active(input.student_id, input.group_id)
            .await?;
        self.assert_group_has_free_seat(input.group_id).await?;

        let join_date = input.join_date.unwrap_or_else(|| Utc::now().date_naive());
        let now = Utc::now();

        let enrollment = enrollments::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(input.student_id),
            group_id: Set(input.group_id),
            status: Set(EnrollmentStatus::Active),
            join_date: Set(join_date),
            leave_date: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let enrollment = enrollment.insert(&self.db).await?;

        let finance = FinanceRepository::new(self.db.clone());
        if let Err(e) = finance
            .upsert_initial_charge(enrollment.student_id, enrollment.group_id, join_date)
            .await
        {
            warn!(
                error = %e,
                enrollment_id = %enrollment.id,
                "initial tuition charge failed; enrollment kept"
            );
        }

        Ok(enrollment)
    }

    /// Lists enrollments with display names, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list(
        &self,
        filter: EnrollmentFilter,
        page: &PageRequest,
    ) -> Result<(Vec<EnrollmentView>, u64), EnrollmentError> {
        let mut query = enrollments::Entity::find();

        if let Some(student_id) = filter.student_id {
            query = query.filter(enrollments::Column::StudentId.eq(student_id));
        }
        if let Some(group_id) = filter.group_id {
            query = query.filter(enrollments::Column::GroupId.eq(group_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(enrollments::Column::Status.eq(status));
        }
        if let Some(from) = filter.from {
            query = query.filter(enrollments::Column::JoinDate.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(enrollments::Column::JoinDate.lte(to));
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .order_by_desc(enrollments::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        Ok((self.with_names(rows).await?, total))
    }

    /// Gets one enrollment with display names.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn get(&self, id: Uuid) -> Result<EnrollmentView, EnrollmentError> {
        let enrollment = enrollments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(EnrollmentError::NotFound(id))?;

        let mut views = self.with_names(vec![enrollment]).await?;
        views.pop().ok_or(EnrollmentError::NotFound(id))
    }

    /// Updates status and/or leave date.
    ///
    /// Moving to LEFT without a leave date stamps today. Reactivating a
    /// non-active enrollment re-runs the join policies.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID, or a policy error on
    /// reactivation.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateEnrollmentInput,
    ) -> Result<enrollments::Model, EnrollmentError> {
        let prev = enrollments::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(EnrollmentError::NotFound(id))?;

        let mut leave_date = input.leave_date.or(prev.leave_date);
        if input.status == Some(EnrollmentStatus::Left) && leave_date.is_none() {
            leave_date = Some(Utc::now().date_naive());
        }

        if input.status == Some(EnrollmentStatus::Active) && prev.status != EnrollmentStatus::Active
        {
            self.assert_group_active(prev.group_id).await?;
            self.assert_no_duplicate_active(prev.student_id, prev.group_id)
                .await?;
            self.assert_group_has_free_seat(prev.group_id).await?;
        }

        let status = input.status.unwrap_or(prev.status);

        let mut active: enrollments::ActiveModel = prev.into();
        active.status = Set(status);
        active.leave_date = Set(leave_date);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Marks an enrollment as LEFT with today's date.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn remove(&self, id: Uuid) -> Result<enrollments::Model, EnrollmentError> {
        self.update(
            id,
            UpdateEnrollmentInput {
                status: Some(EnrollmentStatus::Left),
                leave_date: Some(Utc::now().date_naive()),
            },
        )
        .await
    }

    // ========================================================================
    // Policies
    // ========================================================================

    async fn assert_student_exists(&self, student_id: Uuid) -> Result<(), EnrollmentError> {
        students::Entity::find_by_id(student_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(EnrollmentError::StudentNotFound(student_id))
    }

    async fn assert_group_active(&self, group_id: Uuid) -> Result<(), EnrollmentError> {
        let group = groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .ok_or(EnrollmentError::GroupNotFound(group_id))?;

        if !group.is_active {
            return Err(EnrollmentError::GroupArchived(group_id));
        }
        Ok(())
    }

    async fn assert_no_duplicate_active(
        &self,
        student_id: Uuid,
        group_id: Uuid,
    ) -> Result<(), EnrollmentError> {
        let existing = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .filter(enrollments::Column::GroupId.eq(group_id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(EnrollmentError::AlreadyEnrolled {
                student_id,
                group_id,
            });
        }
        Ok(())
    }

    async fn assert_group_has_free_seat(&self, group_id: Uuid) -> Result<(), EnrollmentError> {
        let group = groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .ok_or(EnrollmentError::GroupNotFound(group_id))?;

        let active_count = enrollments::Entity::find()
            .filter(enrollments::Column::GroupId.eq(group_id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active))
            .count(&self.db)
            .await?;

        if active_count >= u64::from(group.capacity.unsigned_abs()) {
            return Err(EnrollmentError::GroupFull(group_id));
        }
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn with_names(
        &self,
        rows: Vec<enrollments::Model>,
    ) -> Result<Vec<EnrollmentView>, EnrollmentError> {
        let student_names: HashMap<Uuid, (String, String)> = students::Entity::find()
            .filter(students::Column::Id.is_in(rows.iter().map(|e| e.student_id).collect::<Vec<_>>()))
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(s, u)| {
                u.map(|u| (s.id, (format!("{} {}", u.first_name, u.last_name), u.phone)))
            })
            .collect();

        let group_names: HashMap<Uuid, String> = groups::Entity::find()
            .filter(groups::Column::Id.is_in(rows.iter().map(|e| e.group_id).collect::<Vec<_>>()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();

        Ok(rows
            .into_iter()
            .map(|enrollment| {
                let (student_name, student_phone) = student_names
                    .get(&enrollment.student_id)
                    .cloned()
                    .unwrap_or_default();
                let group_name = group_names
                    .get(&enrollment.group_id)
                    .cloned()
                    .unwrap_or_default();
                EnrollmentView {
                    enrollment,
                    student_name,
                    student_phone,
                    group_name,
                }
            })
            .collect())
    }
}
