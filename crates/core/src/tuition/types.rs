//! Tuition data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settlement state of a monthly tuition charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargeStatus {
    /// No payment allocated yet.
    Pending,
    /// Some, but not all, of the due amount is covered.
    PartiallyPaid,
    /// Fully covered.
    Paid,
}

impl std::fmt::Display for ChargeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::PartiallyPaid => write!(f, "PARTIALLY_PAID"),
            Self::Paid => write!(f, "PAID"),
        }
    }
}

/// Result of the monthly charge calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCharge {
    /// Lesson days in the month under the group's pattern.
    pub planned_lessons: u32,
    /// Lesson days on or after the join date.
    pub charged_lessons: u32,
    /// Prorated amount due for the month, in whole sums.
    pub amount_due: Decimal,
}

/// An unsettled charge as seen by the payment allocator.
///
/// `allocated` is the sum of this charge's existing allocations. Discount
/// is not part of the allocator's view of a charge; only the summary
/// calculations subtract it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingCharge {
    /// Charge row ID.
    pub charge_id: Uuid,
    /// Charge year.
    pub year: i32,
    /// Charge month (1-12).
    pub month: u32,
    /// Full amount due for the month.
    pub amount_due: Decimal,
    /// Sum of allocations already applied to this charge.
    pub allocated: Decimal,
}

impl OutstandingCharge {
    /// Amount still uncovered by allocations.
    #[must_use]
    pub fn outstanding(&self) -> Decimal {
        self.amount_due - self.allocated
    }
}

/// One planned application of payment money to a charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAllocation {
    /// Target charge ID.
    pub charge_id: Uuid,
    /// Amount to allocate.
    pub amount: Decimal,
    /// Status the charge moves to once this allocation is persisted.
    pub new_status: ChargeStatus,
}

/// The full plan for distributing one payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Allocations in settlement order (oldest charge first).
    pub allocations: Vec<PlannedAllocation>,
    /// Payment amount left over after all candidate charges are settled.
    /// Not persisted anywhere; the ledger has no credit entity.
    pub leftover: Decimal,
}

impl AllocationPlan {
    /// True when nothing could be allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}
