//! Native database enum types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use tutoria_core::schedule;
use tutoria_core::tuition::ChargeStatus;

/// User roles.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    /// Full access, including user management.
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    /// Day-to-day operations and finance.
    #[sea_orm(string_value = "MANAGER")]
    Manager,
    /// Attendance marking for own groups.
    #[sea_orm(string_value = "TEACHER")]
    Teacher,
    /// Read-only self-service (not exposed yet).
    #[sea_orm(string_value = "STUDENT")]
    Student,
}

impl UserRole {
    /// Role name as stored in JWT claims.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Teacher => "TEACHER",
            Self::Student => "STUDENT",
        }
    }
}

/// Weekly recurrence pattern of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "days_pattern")]
#[serde(rename_all = "UPPERCASE")]
pub enum DaysPattern {
    /// Monday / Wednesday / Friday.
    #[sea_orm(string_value = "ODD")]
    Odd,
    /// Tuesday / Thursday / Saturday.
    #[sea_orm(string_value = "EVEN")]
    Even,
}

impl From<DaysPattern> for schedule::DaysPattern {
    fn from(value: DaysPattern) -> Self {
        match value {
            DaysPattern::Odd => Self::Odd,
            DaysPattern::Even => Self::Even,
        }
    }
}

impl From<schedule::DaysPattern> for DaysPattern {
    fn from(value: schedule::DaysPattern) -> Self {
        match value {
            schedule::DaysPattern::Odd => Self::Odd,
            schedule::DaysPattern::Even => Self::Even,
        }
    }
}

/// Enrollment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "enrollment_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    /// Attending; occupies a seat.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Temporarily away; seat kept.
    #[sea_orm(string_value = "PAUSED")]
    Paused,
    /// Left the group.
    #[sea_orm(string_value = "LEFT")]
    Left,
}

/// Settlement state of a tuition charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "tuition_charge_status"
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TuitionChargeStatus {
    /// No payment allocated yet.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Partially covered by allocations.
    #[sea_orm(string_value = "PARTIALLY_PAID")]
    PartiallyPaid,
    /// Fully covered.
    #[sea_orm(string_value = "PAID")]
    Paid,
}

impl From<ChargeStatus> for TuitionChargeStatus {
    fn from(value: ChargeStatus) -> Self {
        match value {
            ChargeStatus::Pending => Self::Pending,
            ChargeStatus::PartiallyPaid => Self::PartiallyPaid,
            ChargeStatus::Paid => Self::Paid,
        }
    }
}

impl From<TuitionChargeStatus> for ChargeStatus {
    fn from(value: TuitionChargeStatus) -> Self {
        match value {
            TuitionChargeStatus::Pending => Self::Pending,
            TuitionChargeStatus::PartiallyPaid => Self::PartiallyPaid,
            TuitionChargeStatus::Paid => Self::Paid,
        }
    }
}

/// How money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Cash at the front desk.
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// Card terminal.
    #[sea_orm(string_value = "CARD")]
    Card,
    /// Bank transfer.
    #[sea_orm(string_value = "TRANSFER")]
    Transfer,
}

/// Payment lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Recorded but not confirmed (unused by the current flow).
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Money received; payments are created in this state.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Voided.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// Expense categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_category")]
#[serde(rename_all = "UPPERCASE")]
pub enum ExpenseCategory {
    /// Premises rent.
    #[sea_orm(string_value = "RENT")]
    Rent,
    /// Staff salaries.
    #[sea_orm(string_value = "SALARY")]
    Salary,
    /// Electricity, water, internet.
    #[sea_orm(string_value = "UTILITIES")]
    Utilities,
    /// Teaching materials and office supplies.
    #[sea_orm(string_value = "SUPPLIES")]
    Supplies,
    /// Ads and promotion.
    #[sea_orm(string_value = "MARKETING")]
    Marketing,
    /// Everything else.
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// Attendance mark for one student on one lesson date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "attendance_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    /// Present.
    #[sea_orm(string_value = "PRESENT")]
    Present,
    /// Absent without notice.
    #[sea_orm(string_value = "ABSENT")]
    Absent,
    /// Came late.
    #[sea_orm(string_value = "LATE")]
    Late,
    /// Absence excused in advance.
    #[sea_orm(string_value = "EXCUSED")]
    Excused,
}
