//! Attendance repository.
//!
//! One record per (group, student, date); marking the same cell twice
//! updates the existing row. Sheet reads derive the month's lesson dates
//! from the group's weekly pattern, the same calendar rule the tuition
//! calculator uses.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use tutoria_core::schedule::lesson_dates_in_month;

use crate::entities::{
    attendance_records, enrollments, groups, students, users,
    sea_orm_active_enums::{AttendanceStatus, EnrollmentStatus},
};

/// Error types for attendance operations.
#[derive(Debug, thiserror::Error)]
pub enum AttendanceError {
    /// Group not found.
    #[error("Group not found: {0}")]
    GroupNotFound(Uuid),

    /// Student not found.
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// One mark to record.
#[derive(Debug, Clone)]
pub struct MarkInput {
    /// Student being marked.
    pub student_id: Uuid,
    /// Attendance status.
    pub status: AttendanceStatus,
    /// Free-text note.
    pub note: Option<String>,
}

/// A group's roster member on a sheet.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SheetStudent {
    /// Student ID.
    pub student_id: Uuid,
    /// Full name.
    pub full_name: String,
}

/// Monthly attendance sheet for a group.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GroupSheet {
    /// The group.
    pub group: groups::Model,
    /// Sheet year.
    pub year: i32,
    /// Sheet month.
    pub month: u32,
    /// Lesson dates in the month per the group's pattern.
    pub lesson_dates: Vec<NaiveDate>,
    /// Students with an ACTIVE enrollment in the group.
    pub students: Vec<SheetStudent>,
    /// All recorded marks for the group in this month.
    pub records: Vec<attendance_records::Model>,
}

/// Attendance repository.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    db: DatabaseConnection,
}

impl AttendanceRepository {
    /// Creates a new attendance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records one mark, updating in place when the (group, student, date)
    /// cell is already marked.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound`/`StudentNotFound` for unknown references.
    pub async fn mark(
        &self,
        group_id: Uuid,
        date: NaiveDate,
        input: MarkInput,
        marked_by: Uuid,
    ) -> Result<attendance_records::Model, AttendanceError> {
        self.assert_group_exists(group_id).await?;

        let student = students::Entity::find_by_id(input.student_id)
            .one(&self.db)
            .await?;
        if student.is_none() {
            return Err(AttendanceError::StudentNotFound(input.student_id));
        }

        self.upsert_mark(&self.db, group_id, date, input, marked_by)
            .await
    }

    /// Records a batch of marks for one group and date in a single
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` for an unknown group; unknown students fail
    /// the whole batch via the foreign key.
    pub async fn bulk_mark(
        &self,
        group_id: Uuid,
        date: NaiveDate,
        items: Vec<MarkInput>,
        marked_by: Uuid,
    ) -> Result<Vec<attendance_records::Model>, AttendanceError> {
        self.assert_group_exists(group_id).await?;

        let txn = self.db.begin().await?;
        let mut result = Vec::with_capacity(items.len());
        for item in items {
            let record = self
                .upsert_mark(&txn, group_id, date, item, marked_by)
                .await?;
            result.push(record);
        }
        txn.commit().await?;

        Ok(result)
    }

    /// Builds the group's monthly sheet: lesson dates, active roster, and
    /// recorded marks.
    ///
    /// # Errors
    ///
    /// Returns `GroupNotFound` for an unknown group.
    pub async fn group_sheet(
        &self,
        group_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<GroupSheet, AttendanceError> {
        let group = groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .ok_or(AttendanceError::GroupNotFound(group_id))?;

        let lesson_dates = lesson_dates_in_month(group.days_pattern.into(), year, month);

        let roster = enrollments::Entity::find()
            .filter(enrollments::Column::GroupId.eq(group_id))
            .filter(enrollments::Column::Status.eq(EnrollmentStatus::Active))
            .all(&self.db)
            .await?;

        let students = students::Entity::find()
            .filter(
                students::Column::Id
                    .is_in(roster.iter().map(|e| e.student_id).collect::<Vec<_>>()),
            )
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(s, u)| {
                u.map(|u| SheetStudent {
                    student_id: s.id,
                    full_name: format!("{} {}", u.first_name, u.last_name),
                })
            })
            .collect();

        let (first, last) = match (lesson_dates.first(), lesson_dates.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Ok(GroupSheet {
                    group,
                    year,
                    month,
                    lesson_dates,
                    students,
                    records: Vec::new(),
                });
            }
        };

        let records = attendance_records::Entity::find()
            .filter(attendance_records::Column::GroupId.eq(group_id))
            .filter(attendance_records::Column::Date.gte(first))
            .filter(attendance_records::Column::Date.lte(last))
            .order_by_asc(attendance_records::Column::Date)
            .all(&self.db)
            .await?;

        Ok(GroupSheet {
            group,
            year,
            month,
            lesson_dates,
            students,
            records,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn assert_group_exists(&self, group_id: Uuid) -> Result<(), AttendanceError> {
        groups::Entity::find_by_id(group_id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or(AttendanceError::GroupNotFound(group_id))
    }

    async fn upsert_mark<C: sea_orm::ConnectionTrait>(
        &self,
        conn: &C,
        group_id: Uuid,
        date: NaiveDate,
        input: MarkInput,
        marked_by: Uuid,
    ) -> Result<attendance_records::Model, AttendanceError> {
        let now = Utc::now();

        let existing = attendance_records::Entity::find()
            .filter(attendance_records::Column::GroupId.eq(group_id))
            .filter(attendance_records::Column::StudentId.eq(input.student_id))
            .filter(attendance_records::Column::Date.eq(date))
            .one(conn)
            .await?;

        let record = if let Some(existing) = existing {
            let mut active: attendance_records::ActiveModel = existing.into();
            active.status = Set(input.status);
            active.note = Set(input.note);
            active.marked_by = Set(marked_by);
            active.updated_at = Set(now.into());
            active.update(conn).await?
        } else {
            let model = attendance_records::ActiveModel {
                id: Set(Uuid::new_v4()),
                group_id: Set(group_id),
                student_id: Set(input.student_id),
                date: Set(date),
                status: Set(input.status),
                note: Set(input.note),
                marked_by: Set(marked_by),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            model.insert(conn).await?
        };

        Ok(record)
    }
}
