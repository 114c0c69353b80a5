//! Initial database migration.
//!
//! Creates all enums, tables, and indexes for the tutoring center.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: PEOPLE
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(STUDENTS_SQL).await?;

        // ============================================================
        // PART 3: ROOMS & GROUPS
        // ============================================================
        db.execute_unprepared(ROOMS_SQL).await?;
        db.execute_unprepared(GROUPS_SQL).await?;

        // ============================================================
        // PART 4: ENROLLMENTS & ATTENDANCE
        // ============================================================
        db.execute_unprepared(ENROLLMENTS_SQL).await?;
        db.execute_unprepared(ATTENDANCE_SQL).await?;

        // ============================================================
        // PART 5: FINANCE
        // ============================================================
        db.execute_unprepared(TUITION_CHARGES_SQL).await?;
        db.execute_unprepared(PAYMENTS_SQL).await?;
        db.execute_unprepared(PAYMENT_ALLOCATIONS_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM (
    'ADMIN',
    'MANAGER',
    'TEACHER',
    'STUDENT'
);

CREATE TYPE days_pattern AS ENUM (
    'ODD',
    'EVEN'
);

CREATE TYPE enrollment_status AS ENUM (
    'ACTIVE',
    'PAUSED',
    'LEFT'
);

CREATE TYPE tuition_charge_status AS ENUM (
    'PENDING',
    'PARTIALLY_PAID',
    'PAID'
);

CREATE TYPE payment_method AS ENUM (
    'CASH',
    'CARD',
    'TRANSFER'
);

CREATE TYPE payment_status AS ENUM (
    'PENDING',
    'COMPLETED',
    'CANCELLED'
);

CREATE TYPE expense_category AS ENUM (
    'RENT',
    'SALARY',
    'UTILITIES',
    'SUPPLIES',
    'MARKETING',
    'OTHER'
);

CREATE TYPE attendance_status AS ENUM (
    'PRESENT',
    'ABSENT',
    'LATE',
    'EXCUSED'
);
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY,
    phone VARCHAR(32) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    first_name VARCHAR(128) NOT NULL,
    last_name VARCHAR(128) NOT NULL,
    role user_role NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const STUDENTS_SQL: &str = r"
CREATE TABLE students (
    id UUID PRIMARY KEY,
    user_id UUID NOT NULL UNIQUE REFERENCES users(id),
    date_of_birth DATE,
    note TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const ROOMS_SQL: &str = r"
CREATE TABLE rooms (
    id UUID PRIMARY KEY,
    name VARCHAR(128) NOT NULL UNIQUE,
    capacity INTEGER NOT NULL CHECK (capacity > 0),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
";

const GROUPS_SQL: &str = r"
CREATE TABLE groups (
    id UUID PRIMARY KEY,
    name VARCHAR(128) NOT NULL,
    capacity INTEGER NOT NULL CHECK (capacity > 0),
    days_pattern days_pattern NOT NULL,
    start_minutes INTEGER NOT NULL CHECK (start_minutes >= 0 AND start_minutes < 1440),
    end_minutes INTEGER NOT NULL CHECK (end_minutes > start_minutes AND end_minutes <= 1440),
    monthly_fee NUMERIC(14, 2) NOT NULL CHECK (monthly_fee >= 0),
    room_id UUID REFERENCES rooms(id),
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_groups_room ON groups(room_id) WHERE room_id IS NOT NULL;
CREATE UNIQUE INDEX idx_groups_active_name ON groups(name) WHERE is_active;
";

const ENROLLMENTS_SQL: &str = r"
CREATE TABLE enrollments (
    id UUID PRIMARY KEY,
    student_id UUID NOT NULL REFERENCES students(id),
    group_id UUID NOT NULL REFERENCES groups(id),
    status enrollment_status NOT NULL DEFAULT 'ACTIVE',
    join_date DATE NOT NULL,
    leave_date DATE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_enrollments_student ON enrollments(student_id);
CREATE INDEX idx_enrollments_group_status ON enrollments(group_id, status);
";

const ATTENDANCE_SQL: &str = r"
CREATE TABLE attendance_records (
    id UUID PRIMARY KEY,
    group_id UUID NOT NULL REFERENCES groups(id),
    student_id UUID NOT NULL REFERENCES students(id),
    date DATE NOT NULL,
    status attendance_status NOT NULL,
    note TEXT,
    marked_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_attendance_group_student_date UNIQUE (group_id, student_id, date)
);

CREATE INDEX idx_attendance_group_date ON attendance_records(group_id, date);
";

const TUITION_CHARGES_SQL: &str = r"
CREATE TABLE tuition_charges (
    id UUID PRIMARY KEY,
    student_id UUID NOT NULL REFERENCES students(id),
    group_id UUID NOT NULL REFERENCES groups(id),
    year INTEGER NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    amount_due NUMERIC(14, 2) NOT NULL CHECK (amount_due >= 0),
    discount NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (discount >= 0),
    planned_lessons INTEGER NOT NULL CHECK (planned_lessons >= 0),
    charged_lessons INTEGER NOT NULL CHECK (charged_lessons >= 0),
    status tuition_charge_status NOT NULL DEFAULT 'PENDING',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CONSTRAINT uq_charge_student_group_month UNIQUE (student_id, group_id, year, month)
);

CREATE INDEX idx_charges_student_status ON tuition_charges(student_id, status);
CREATE INDEX idx_charges_status ON tuition_charges(status);
";

const PAYMENTS_SQL: &str = r"
CREATE TABLE payments (
    id UUID PRIMARY KEY,
    student_id UUID NOT NULL REFERENCES students(id),
    group_id UUID REFERENCES groups(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    method payment_method NOT NULL,
    status payment_status NOT NULL DEFAULT 'COMPLETED',
    paid_at TIMESTAMPTZ NOT NULL,
    reference TEXT,
    comment TEXT,
    recorded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_payments_student_paid_at ON payments(student_id, paid_at DESC);
CREATE INDEX idx_payments_paid_at ON payments(paid_at);
";

const PAYMENT_ALLOCATIONS_SQL: &str = r"
CREATE TABLE payment_allocations (
    id UUID PRIMARY KEY,
    payment_id UUID NOT NULL REFERENCES payments(id),
    charge_id UUID NOT NULL REFERENCES tuition_charges(id),
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_allocations_payment ON payment_allocations(payment_id);
CREATE INDEX idx_allocations_charge ON payment_allocations(charge_id);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    title VARCHAR(256) NOT NULL,
    category expense_category NOT NULL,
    amount NUMERIC(14, 2) NOT NULL CHECK (amount > 0),
    method payment_method NOT NULL,
    paid_at TIMESTAMPTZ NOT NULL,
    note TEXT,
    recorded_by UUID NOT NULL REFERENCES users(id),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_expenses_paid_at ON expenses(paid_at);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS payment_allocations;
DROP TABLE IF EXISTS payments;
DROP TABLE IF EXISTS tuition_charges;
DROP TABLE IF EXISTS attendance_records;
DROP TABLE IF EXISTS enrollments;
DROP TABLE IF EXISTS groups;
DROP TABLE IF EXISTS rooms;
DROP TABLE IF EXISTS students;
DROP TABLE IF EXISTS users;

DROP TYPE IF EXISTS attendance_status;
DROP TYPE IF EXISTS expense_category;
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS payment_method;
DROP TYPE IF EXISTS tuition_charge_status;
DROP TYPE IF EXISTS enrollment_status;
DROP TYPE IF EXISTS days_pattern;
DROP TYPE IF EXISTS user_role;
";
