//! Tuition charge calculation, payment allocation, and debt summaries.
//!
//! The two engines at the heart of the finance subsystem:
//!
//! - the **charge calculator** prorates a group's monthly fee over the
//!   lesson days remaining after a student's join date;
//! - the **payment allocator** plans how an incoming payment is spread
//!   across outstanding charges, oldest month first.
//!
//! Both are pure; persistence lives in the `db` crate.

pub mod allocation;
pub mod charge;
pub mod error;
pub mod summary;
pub mod types;

#[cfg(test)]
mod tests;

pub use allocation::plan_allocations;
pub use charge::{amount_from_lessons, compute_monthly_charge};
pub use error::TuitionError;
pub use summary::{charge_debt, effective_amount, round_to_thousand, status_after_discount};
pub use types::{
    AllocationPlan, ChargeStatus, MonthlyCharge, OutstandingCharge, PlannedAllocation,
};
