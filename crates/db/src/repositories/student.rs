//! Student repository: profiles and their user accounts.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use tutoria_shared::types::PageRequest;

use crate::entities::{sea_orm_active_enums::UserRole, students, users};

/// Error types for student operations.
#[derive(Debug, thiserror::Error)]
pub enum StudentError {
    /// Student not found.
    #[error("Student not found: {0}")]
    NotFound(Uuid),

    /// Phone already registered.
    #[error("Phone already registered: {0}")]
    DuplicatePhone(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a student (account + profile).
#[derive(Debug, Clone)]
pub struct CreateStudentInput {
    /// Contact/login phone.
    pub phone: String,
    /// Argon2id password hash for the account.
    pub password_hash: String,
    /// First name.
    pub first_name: String,
    /// Last name.
    pub last_name: String,
    /// Date of birth.
    pub date_of_birth: Option<NaiveDate>,
    /// Free-text note.
    pub note: Option<String>,
}

/// A student profile joined with its user account.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StudentView {
    /// The profile row.
    pub student: students::Model,
    /// The account row.
    pub user: users::Model,
}

/// Student repository.
#[derive(Debug, Clone)]
pub struct StudentRepository {
    db: DatabaseConnection,
}

impl StudentRepository {
    /// Creates a new student repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates the user account and student profile in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DuplicatePhone` when the phone is taken.
    pub async fn create(&self, input: CreateStudentInput) -> Result<StudentView, StudentError> {
        let taken = users::Entity::find()
            .filter(users::Column::Phone.eq(&input.phone))
            .count(&self.db)
            .await?
            > 0;
        if taken {
            return Err(StudentError::DuplicatePhone(input.phone));
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();

        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            phone: Set(input.phone),
            password_hash: Set(input.password_hash),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            role: Set(UserRole::Student),
            is_active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let user = user.insert(&txn).await?;

        let student = students::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            date_of_birth: Set(input.date_of_birth),
            note: Set(input.note),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };
        let student = student.insert(&txn).await?;

        txn.commit().await?;

        Ok(StudentView { student, user })
    }

    /// Lists students with their accounts, newest first, with optional
    /// name/phone search.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: &PageRequest,
    ) -> Result<(Vec<StudentView>, u64), StudentError> {
        let mut query = students::Entity::find().find_also_related(users::Entity);

        if let Some(search) = search.map(str::trim)
            && !search.is_empty()
        {
            query = query.filter(
                Condition::any()
                    .add(users::Column::FirstName.contains(search))
                    .add(users::Column::LastName.contains(search))
                    .add(users::Column::Phone.contains(search)),
            );
        }

        let total = query.clone().count(&self.db).await?;
        let rows = query
            .order_by_desc(students::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await?;

        let views = rows
            .into_iter()
            .filter_map(|(student, user)| user.map(|user| StudentView { student, user }))
            .collect();

        Ok((views, total))
    }

    /// Gets one student with their account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown ID.
    pub async fn get(&self, id: Uuid) -> Result<StudentView, StudentError> {
        let row = students::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.db)
            .await?;

        match row {
            Some((student, Some(user))) => Ok(StudentView { student, user }),
            _ => Err(StudentError::NotFound(id)),
        }
    }
}
