//! Unit tests for the finance repository's pure projection helpers.

use std::collections::HashMap;

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use tutoria_core::tuition::{ChargeStatus, plan_allocations};

use crate::entities::sea_orm_active_enums::TuitionChargeStatus;
use crate::entities::{payment_allocations, tuition_charges};
use crate::repositories::finance::{allocated_by_charge, outstanding_view};

fn mock_charge(year: i32, month: i32, amount_due: Decimal) -> tuition_charges::Model {
    tuition_charges::Model {
        id: Uuid::new_v4(),
        student_id: Uuid::new_v4(),
        group_id: Uuid::new_v4(),
        year,
        month,
        amount_due,
        discount: Decimal::ZERO,
        planned_lessons: 13,
        charged_lessons: 13,
        status: TuitionChargeStatus::Pending,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn mock_allocation(charge_id: Uuid, amount: Decimal) -> payment_allocations::Model {
    payment_allocations::Model {
        id: Uuid::new_v4(),
        payment_id: Uuid::new_v4(),
        charge_id,
        amount,
        created_at: Utc::now().into(),
    }
}

#[test]
fn test_allocated_by_charge_sums_per_charge() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let sums = allocated_by_charge(vec![
        mock_allocation(a, dec!(100)),
        mock_allocation(a, dec!(50)),
        mock_allocation(b, dec!(70)),
    ]);

    assert_eq!(sums.get(&a), Some(&dec!(150)));
    assert_eq!(sums.get(&b), Some(&dec!(70)));
    assert_eq!(sums.len(), 2);
}

#[test]
fn test_outstanding_view_defaults_to_zero_allocated() {
    let charge = mock_charge(2026, 5, dec!(300000));
    let view = outstanding_view(&[charge.clone()], &HashMap::new());

    assert_eq!(view.len(), 1);
    assert_eq!(view[0].charge_id, charge.id);
    assert_eq!(view[0].year, 2026);
    assert_eq!(view[0].month, 5);
    assert_eq!(view[0].allocated, Decimal::ZERO);
    assert_eq!(view[0].outstanding(), dec!(300000));
}

#[test]
fn test_view_feeds_the_planner_end_to_end() {
    // Two months of 100, the older one half paid; 120 settles the older
    // charge and dents the newer one.
    let jan = mock_charge(2026, 1, dec!(100));
    let feb = mock_charge(2026, 2, dec!(100));

    let allocated = allocated_by_charge(vec![mock_allocation(jan.id, dec!(50))]);
    let view = outstanding_view(&[feb.clone(), jan.clone()], &allocated);
    let plan = plan_allocations(dec!(120), &view);

    assert_eq!(plan.allocations.len(), 2);
    assert_eq!(plan.allocations[0].charge_id, jan.id);
    assert_eq!(plan.allocations[0].amount, dec!(50));
    assert_eq!(plan.allocations[0].new_status, ChargeStatus::Paid);
    assert_eq!(plan.allocations[1].charge_id, feb.id);
    assert_eq!(plan.allocations[1].amount, dec!(70));
    assert_eq!(plan.allocations[1].new_status, ChargeStatus::PartiallyPaid);
    assert_eq!(plan.leftover, dec!(0));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_allocated_sums_preserve_total(
        amounts in prop::collection::vec((0usize..4, 1i64..100_000), 0..32),
    ) {
        let ids: Vec<Uuid> = (0..4).map(|_| Uuid::new_v4()).collect();
        let allocations: Vec<payment_allocations::Model> = amounts
            .iter()
            .map(|(idx, amount)| mock_allocation(ids[*idx], Decimal::from(*amount)))
            .collect();

        let expected: Decimal = allocations.iter().map(|a| a.amount).sum();
        let sums = allocated_by_charge(allocations);
        let total: Decimal = sums.values().copied().sum();
        prop_assert_eq!(total, expected);
    }
}
