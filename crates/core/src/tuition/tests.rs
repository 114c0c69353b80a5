use chrono::NaiveDate;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::schedule::DaysPattern;

use super::allocation::plan_allocations;
use super::charge::{amount_from_lessons, compute_monthly_charge};
use super::error::TuitionError;
use super::summary::{charge_debt, round_to_thousand, status_after_discount};
use super::types::{ChargeStatus, OutstandingCharge};

fn charge(year: i32, month: u32, amount_due: Decimal, allocated: Decimal) -> OutstandingCharge {
    OutstandingCharge {
        charge_id: Uuid::new_v4(),
        year,
        month,
        amount_due,
        allocated,
    }
}

// ============================================================================
// Charge calculator
// ============================================================================

#[test]
fn test_full_month_charges_full_fee() {
    // June 2026 starts on a Monday: 13 ODD lesson days.
    let join = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    let result = compute_monthly_charge(DaysPattern::Odd, dec!(300000), join).unwrap();

    assert_eq!(result.planned_lessons, 13);
    assert_eq!(result.charged_lessons, 13);
    assert_eq!(result.amount_due, dec!(300000));
}

#[test]
fn test_mid_month_join_prorates() {
    // Joining June 15, 2026 leaves 7 of the 13 ODD lesson days.
    let join = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
    let result = compute_monthly_charge(DaysPattern::Odd, dec!(300000), join).unwrap();

    assert_eq!(result.planned_lessons, 13);
    assert_eq!(result.charged_lessons, 7);
    // round(300000 / 13 * 7) = round(161538.46...)
    assert_eq!(result.amount_due, dec!(161538));
}

#[test]
fn test_join_after_last_lesson_charges_nothing() {
    // June 30, 2026 is a Tuesday; the last ODD lesson was June 29.
    let join = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
    let result = compute_monthly_charge(DaysPattern::Odd, dec!(300000), join).unwrap();

    assert_eq!(result.charged_lessons, 0);
    assert_eq!(result.amount_due, dec!(0));
}

#[rstest]
#[case(dec!(0))]
#[case(dec!(-5000))]
fn test_non_positive_fee_is_not_applicable(#[case] fee: Decimal) {
    let join = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
    assert!(compute_monthly_charge(DaysPattern::Odd, fee, join).is_none());
}

#[test]
fn test_zero_planned_falls_back_to_full_fee() {
    // No real month produces zero lesson days, but the fallback is part of
    // the contract: a pattern with no matches charges the full fee.
    assert_eq!(amount_from_lessons(dec!(250000), 0, 0), dec!(250000));
}

#[test]
fn test_rounding_is_half_up() {
    // 100 / 8 * 5 = 62.5 -> 63
    assert_eq!(amount_from_lessons(dec!(100), 8, 5), dec!(63));
    // 100 / 3 * 1 = 33.33... -> 33
    assert_eq!(amount_from_lessons(dec!(100), 3, 1), dec!(33));
}

#[test]
fn test_recomputation_is_deterministic() {
    let join = NaiveDate::from_ymd_opt(2026, 6, 10).unwrap();
    let a = compute_monthly_charge(DaysPattern::Even, dec!(480000), join).unwrap();
    let b = compute_monthly_charge(DaysPattern::Even, dec!(480000), join).unwrap();
    assert_eq!(a, b);
}

// ============================================================================
// Payment allocator
// ============================================================================

#[test]
fn test_oldest_charge_settles_first() {
    // Feb listed before Jan on purpose; (year, month) order must win.
    let feb = charge(2026, 2, dec!(100), dec!(0));
    let jan = charge(2026, 1, dec!(100), dec!(0));
    let plan = plan_allocations(dec!(150), &[feb.clone(), jan.clone()]);

    assert_eq!(plan.allocations.len(), 2);
    assert_eq!(plan.allocations[0].charge_id, jan.charge_id);
    assert_eq!(plan.allocations[0].amount, dec!(100));
    assert_eq!(plan.allocations[0].new_status, ChargeStatus::Paid);
    assert_eq!(plan.allocations[1].charge_id, feb.charge_id);
    assert_eq!(plan.allocations[1].amount, dec!(50));
    assert_eq!(plan.allocations[1].new_status, ChargeStatus::PartiallyPaid);
    assert_eq!(plan.leftover, dec!(0));
}

#[test]
fn test_year_boundary_ordering() {
    let jan_2027 = charge(2027, 1, dec!(100), dec!(0));
    let dec_2026 = charge(2026, 12, dec!(100), dec!(0));
    let plan = plan_allocations(dec!(100), &[jan_2027, dec_2026.clone()]);

    assert_eq!(plan.allocations.len(), 1);
    assert_eq!(plan.allocations[0].charge_id, dec_2026.charge_id);
}

#[test]
fn test_exact_settlement_is_paid() {
    // Boundary is >=: covering the outstanding amount exactly means PAID.
    let c = charge(2026, 3, dec!(100), dec!(40));
    let plan = plan_allocations(dec!(60), &[c]);

    assert_eq!(plan.allocations.len(), 1);
    assert_eq!(plan.allocations[0].amount, dec!(60));
    assert_eq!(plan.allocations[0].new_status, ChargeStatus::Paid);
}

#[test]
fn test_one_short_is_partially_paid() {
    let c = charge(2026, 3, dec!(100), dec!(40));
    let plan = plan_allocations(dec!(59), &[c]);

    assert_eq!(plan.allocations[0].new_status, ChargeStatus::PartiallyPaid);
}

#[test]
fn test_fully_covered_charge_is_skipped() {
    let covered = charge(2026, 1, dec!(100), dec!(100));
    let open = charge(2026, 2, dec!(100), dec!(0));
    let plan = plan_allocations(dec!(80), &[covered, open.clone()]);

    assert_eq!(plan.allocations.len(), 1);
    assert_eq!(plan.allocations[0].charge_id, open.charge_id);
    assert_eq!(plan.allocations[0].amount, dec!(80));
}

#[test]
fn test_over_allocated_charge_never_goes_negative() {
    // Allocations can exceed the due amount through the discount quirk;
    // such a charge must be skipped, never "refunded".
    let over = charge(2026, 1, dec!(100), dec!(120));
    let plan = plan_allocations(dec!(50), &[over]);

    assert!(plan.is_empty());
    assert_eq!(plan.leftover, dec!(50));
}

#[test]
fn test_leftover_is_reported_not_allocated() {
    let c = charge(2026, 1, dec!(100), dec!(0));
    let plan = plan_allocations(dec!(250), &[c]);

    assert_eq!(plan.allocations.len(), 1);
    assert_eq!(plan.allocations[0].amount, dec!(100));
    assert_eq!(plan.leftover, dec!(150));
}

#[test]
fn test_no_charges_means_full_leftover() {
    let plan = plan_allocations(dec!(500), &[]);
    assert!(plan.is_empty());
    assert_eq!(plan.leftover, dec!(500));
}

#[test]
fn test_discount_is_invisible_to_the_allocator() {
    // A charge of 100 with discount 30 and 50 already paid owes 20 in the
    // summary views but 50 to the allocator. Both formulas are preserved
    // as observed in production.
    let amount_due = dec!(100);
    let discount = dec!(30);
    let paid = dec!(50);

    let c = charge(2026, 1, amount_due, paid);
    assert_eq!(c.outstanding(), dec!(50));
    assert_eq!(charge_debt(amount_due, discount, paid), dec!(20));
}

// ============================================================================
// Summaries and discounts
// ============================================================================

#[test]
fn test_round_to_thousand() {
    assert_eq!(round_to_thousand(dec!(161538)), dec!(162000));
    assert_eq!(round_to_thousand(dec!(161499)), dec!(161000));
    assert_eq!(round_to_thousand(dec!(1500)), dec!(2000));
    assert_eq!(round_to_thousand(dec!(0)), dec!(0));
}

#[test]
fn test_round_to_thousand_is_idempotent() {
    for v in [dec!(161538), dec!(999), dec!(500), dec!(123456789)] {
        let once = round_to_thousand(v);
        assert_eq!(round_to_thousand(once), once);
    }
}

#[test]
fn test_discount_above_due_rejected() {
    let err = status_after_discount(dec!(100), dec!(101), dec!(0)).unwrap_err();
    assert_eq!(
        err,
        TuitionError::DiscountExceedsAmountDue {
            discount: dec!(101),
            amount_due: dec!(100),
        }
    );
}

#[test]
fn test_full_discount_with_no_payments_is_paid() {
    let status = status_after_discount(dec!(100), dec!(100), dec!(0)).unwrap();
    assert_eq!(status, ChargeStatus::Paid);
}

#[test]
fn test_discount_status_recompute() {
    // paid covers the discounted amount
    assert_eq!(
        status_after_discount(dec!(100), dec!(40), dec!(60)).unwrap(),
        ChargeStatus::Paid
    );
    // paid but short of the discounted amount
    assert_eq!(
        status_after_discount(dec!(100), dec!(40), dec!(30)).unwrap(),
        ChargeStatus::PartiallyPaid
    );
    // nothing paid, discount below due
    assert_eq!(
        status_after_discount(dec!(100), dec!(40), dec!(0)).unwrap(),
        ChargeStatus::Pending
    );
}

// ============================================================================
// Properties
// ============================================================================

fn outstanding_charge_strategy() -> impl Strategy<Value = OutstandingCharge> {
    (
        2024i32..2028,
        1u32..13,
        1i64..1_000_000,
        0i64..1_200_000,
    )
        .prop_map(|(year, month, due, allocated)| OutstandingCharge {
            charge_id: Uuid::new_v4(),
            year,
            month,
            amount_due: Decimal::from(due),
            allocated: Decimal::from(allocated),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_allocations_conserve_the_payment(
        payment in 1i64..2_000_000,
        charges in prop::collection::vec(outstanding_charge_strategy(), 0..8),
    ) {
        let payment = Decimal::from(payment);
        let plan = plan_allocations(payment, &charges);

        let total: Decimal = plan.allocations.iter().map(|a| a.amount).sum();
        prop_assert_eq!(total + plan.leftover, payment);
        prop_assert!(plan.leftover >= Decimal::ZERO);
    }

    #[test]
    fn prop_no_allocation_exceeds_outstanding(
        payment in 1i64..2_000_000,
        charges in prop::collection::vec(outstanding_charge_strategy(), 0..8),
    ) {
        let plan = plan_allocations(Decimal::from(payment), &charges);

        for alloc in &plan.allocations {
            let target = charges.iter().find(|c| c.charge_id == alloc.charge_id).unwrap();
            prop_assert!(alloc.amount > Decimal::ZERO);
            prop_assert!(alloc.amount <= target.outstanding());

            let paid_after = target.allocated + alloc.amount;
            if alloc.new_status == ChargeStatus::Paid {
                prop_assert!(paid_after >= target.amount_due);
            } else {
                prop_assert!(paid_after < target.amount_due);
            }
        }
    }

    #[test]
    fn prop_allocations_follow_month_order(
        payment in 1i64..2_000_000,
        charges in prop::collection::vec(outstanding_charge_strategy(), 0..8),
    ) {
        let plan = plan_allocations(Decimal::from(payment), &charges);

        let keys: Vec<(i32, u32)> = plan
            .allocations
            .iter()
            .map(|a| {
                let c = charges.iter().find(|c| c.charge_id == a.charge_id).unwrap();
                (c.year, c.month)
            })
            .collect();
        prop_assert!(keys.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn prop_full_month_always_charges_full_fee(
        fee in 1i64..10_000_000,
        planned in 1u32..32,
    ) {
        let fee = Decimal::from(fee);
        prop_assert_eq!(amount_from_lessons(fee, planned, planned), fee);
    }

    #[test]
    fn prop_prorated_amount_never_exceeds_fee(
        fee in 1i64..10_000_000,
        planned in 1u32..32,
        charged in 0u32..32,
    ) {
        let charged = charged.min(planned);
        let amount = amount_from_lessons(Decimal::from(fee), planned, charged);
        prop_assert!(amount >= Decimal::ZERO);
        prop_assert!(amount <= Decimal::from(fee));
    }

    #[test]
    fn prop_round_to_thousand_idempotent(v in -10_000_000i64..10_000_000) {
        let once = round_to_thousand(Decimal::from(v));
        prop_assert_eq!(round_to_thousand(once), once);
        prop_assert_eq!(once % Decimal::ONE_THOUSAND, Decimal::ZERO);
    }
}
