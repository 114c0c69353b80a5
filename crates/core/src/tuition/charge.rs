//! Monthly charge calculation.

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::schedule::{DaysPattern, lesson_dates_in_month};

use super::types::MonthlyCharge;

/// Computes the prorated tuition charge for the month containing `join_date`.
///
/// Counts the group's lesson days in that calendar month (`planned_lessons`)
/// and those falling on or after the join date (`charged_lessons`), then
/// derives the amount due from the per-lesson share of the monthly fee.
///
/// Returns `None` when `monthly_fee` is zero or negative: no charge is
/// applicable and the caller must not write a charge row.
#[must_use]
pub fn compute_monthly_charge(
    pattern: DaysPattern,
    monthly_fee: Decimal,
    join_date: NaiveDate,
) -> Option<MonthlyCharge> {
    if monthly_fee <= Decimal::ZERO {
        return None;
    }

    let lesson_dates = lesson_dates_in_month(pattern, join_date.year(), join_date.month());

    #[allow(clippy::cast_possible_truncation)]
    let planned_lessons = lesson_dates.len() as u32;
    #[allow(clippy::cast_possible_truncation)]
    let charged_lessons = lesson_dates.iter().filter(|d| **d >= join_date).count() as u32;

    Some(MonthlyCharge {
        planned_lessons,
        charged_lessons,
        amount_due: amount_from_lessons(monthly_fee, planned_lessons, charged_lessons),
    })
}

/// Derives the amount due from lesson counts.
///
/// When the pattern produced no lesson days in the month the full monthly
/// fee is charged; otherwise the fee is split evenly across planned lessons
/// and multiplied by the charged count, rounded half-up to the whole sum.
#[must_use]
pub fn amount_from_lessons(monthly_fee: Decimal, planned: u32, charged: u32) -> Decimal {
    if planned == 0 {
        return monthly_fee;
    }

    let per_lesson = monthly_fee / Decimal::from(planned);
    (per_lesson * Decimal::from(charged))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
