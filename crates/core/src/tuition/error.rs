//! Tuition error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Tuition-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TuitionError {
    /// Discount may not exceed the charge's due amount.
    #[error("discount {discount} exceeds amount due {amount_due}")]
    DiscountExceedsAmountDue {
        /// Requested discount.
        discount: Decimal,
        /// The charge's full due amount.
        amount_due: Decimal,
    },
}
