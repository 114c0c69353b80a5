//! Debt summary arithmetic.
//!
//! The read side of the finance subsystem works with effective amounts
//! (`amount_due - discount`), unlike the allocator which ignores discount.

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::TuitionError;
use super::types::ChargeStatus;

/// Rounds an amount to the nearest thousand sums, half away from zero.
///
/// Presentation convenience for debts; idempotent.
#[must_use]
pub fn round_to_thousand(amount: Decimal) -> Decimal {
    (amount / Decimal::ONE_THOUSAND)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * Decimal::ONE_THOUSAND
}

/// The charge amount after discount.
#[must_use]
pub fn effective_amount(amount_due: Decimal, discount: Decimal) -> Decimal {
    amount_due - discount
}

/// Remaining debt on one charge as the summary views compute it.
#[must_use]
pub fn charge_debt(amount_due: Decimal, discount: Decimal, paid: Decimal) -> Decimal {
    effective_amount(amount_due, discount) - paid
}

/// Recomputes a charge's status after applying `discount`, given the sum
/// already paid against it.
///
/// # Errors
///
/// Returns `TuitionError::DiscountExceedsAmountDue` when the discount is
/// larger than the charge's due amount.
pub fn status_after_discount(
    amount_due: Decimal,
    discount: Decimal,
    paid: Decimal,
) -> Result<ChargeStatus, TuitionError> {
    if discount > amount_due {
        return Err(TuitionError::DiscountExceedsAmountDue {
            discount,
            amount_due,
        });
    }

    let effective = effective_amount(amount_due, discount);
    let status = if paid >= effective {
        ChargeStatus::Paid
    } else if paid > Decimal::ZERO {
        ChargeStatus::PartiallyPaid
    } else {
        ChargeStatus::Pending
    };

    Ok(status)
}
