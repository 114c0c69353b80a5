//! Payment allocation planning.

use rust_decimal::Decimal;

use super::types::{AllocationPlan, ChargeStatus, OutstandingCharge, PlannedAllocation};

/// Plans how `payment_amount` is distributed across a student's unsettled
/// charges.
///
/// Charges are settled in ascending (year, month) order: a payment always
/// retires the oldest outstanding obligation before newer ones, regardless
/// of the order rows were created or passed in. Each charge receives
/// `min(remaining, outstanding)` where outstanding is the due amount minus
/// existing allocations; a charge whose outstanding is non-positive is
/// skipped. The charge moves to `Paid` exactly when its allocations reach
/// the due amount, `PartiallyPaid` otherwise.
///
/// Whatever remains after the last candidate charge is reported as
/// `leftover` and is NOT carried anywhere else.
#[must_use]
pub fn plan_allocations(
    payment_amount: Decimal,
    charges: &[OutstandingCharge],
) -> AllocationPlan {
    let mut remaining = payment_amount;
    let mut allocations = Vec::new();

    if remaining <= Decimal::ZERO {
        return AllocationPlan {
            allocations,
            leftover: remaining,
        };
    }

    let mut ordered: Vec<&OutstandingCharge> = charges.iter().collect();
    ordered.sort_by_key(|c| (c.year, c.month));

    for charge in ordered {
        if remaining <= Decimal::ZERO {
            break;
        }

        let outstanding = charge.outstanding();
        if outstanding <= Decimal::ZERO {
            continue;
        }

        let amount = remaining.min(outstanding);
        remaining -= amount;

        let new_status = if charge.allocated + amount >= charge.amount_due {
            ChargeStatus::Paid
        } else {
            ChargeStatus::PartiallyPaid
        };

        allocations.push(PlannedAllocation {
            charge_id: charge.charge_id,
            amount,
            new_status,
        });
    }

    AllocationPlan {
        allocations,
        leftover: remaining,
    }
}
