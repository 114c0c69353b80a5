//! Finance repository: tuition charges, payments, allocations, and expenses.
//!
//! The write paths (payment creation + allocation, charge upsert, discount)
//! delegate their arithmetic to `tutoria_core::tuition` and keep only the
//! persistence choreography here. Payment allocation runs inside a single
//! transaction with the candidate charge rows locked, so two payments for
//! the same student cannot both read the same outstanding amount.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use tutoria_core::tuition::{
    self, OutstandingCharge, TuitionError, compute_monthly_charge, plan_allocations,
    round_to_thousand, status_after_discount,
};

use crate::entities::{
    expenses, groups, payment_allocations, payments, students, tuition_charges, users,
    sea_orm_active_enums::{ExpenseCategory, PaymentMethod, PaymentStatus, TuitionChargeStatus},
};

/// Error types for finance operations.
#[derive(Debug, thiserror::Error)]
pub enum FinanceError {
    /// Student not found.
    #[error("Student not found: {0}")]
    StudentNotFound(Uuid),

    /// No charge exists for the given student/group/month.
    #[error("No tuition charge for student {student_id} in {year}-{month:02}")]
    ChargeNotFound {
        /// Student ID.
        student_id: Uuid,
        /// Group ID.
        group_id: Uuid,
        /// Charge year.
        year: i32,
        /// Charge month.
        month: i32,
    },

    /// Amount must be positive.
    #[error("Amount must be positive, got {0}")]
    NonPositiveAmount(Decimal),

    /// Discount validation failed.
    #[error(transparent)]
    Tuition(#[from] TuitionError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

// ============================================================================
// Inputs
// ============================================================================

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Paying student.
    pub student_id: Uuid,
    /// Optional group scope; when set, allocation only considers this
    /// group's charges.
    pub group_id: Option<Uuid>,
    /// Amount received.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// When the money changed hands; defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
    /// Free-text reference (receipt number etc).
    pub reference: Option<String>,
    /// Free-text comment.
    pub comment: Option<String>,
}

/// Input for recording an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Short title.
    pub title: String,
    /// Expense category.
    pub category: ExpenseCategory,
    /// Amount paid out.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// When it was paid; defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
    /// Free-text note.
    pub note: Option<String>,
}

/// Input for applying a discount to one monthly charge.
#[derive(Debug, Clone, Copy)]
pub struct ApplyDiscountInput {
    /// Student ID.
    pub student_id: Uuid,
    /// Group ID.
    pub group_id: Uuid,
    /// Charge year.
    pub year: i32,
    /// Charge month (1-12).
    pub month: i32,
    /// Discount amount; must not exceed the charge's due amount.
    pub discount_amount: Decimal,
}

// ============================================================================
// Read models
// ============================================================================

/// Per-student finance summary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StudentSummary {
    /// Student ID.
    pub student_id: Uuid,
    /// Sum of effective charge amounts (amount_due - discount).
    pub total_charges: Decimal,
    /// Sum of allocations against this student's charges.
    pub total_paid: Decimal,
    /// total_charges - total_paid.
    pub debt: Decimal,
    /// Debt rounded to the nearest thousand for display.
    pub debt_rounded: Decimal,
    /// Five most recent payments.
    pub last_payments: Vec<payments::Model>,
}

/// Income/expense totals over a date range.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FinanceOverview {
    /// Range start.
    pub from: DateTime<Utc>,
    /// Range end.
    pub to: DateTime<Utc>,
    /// Method filter, if any.
    pub method: Option<PaymentMethod>,
    /// Sum of completed payments in range.
    pub total_income: Decimal,
    /// Sum of expenses in range.
    pub total_expense: Decimal,
    /// total_income - total_expense.
    pub profit: Decimal,
}

/// Institution-wide balance.
#[derive(Debug, Clone, serde::Serialize)]
pub struct GlobalBalance {
    /// Sum of effective charge amounts across all charges.
    pub total_charges: Decimal,
    /// Sum of all completed payments.
    pub total_income: Decimal,
    /// Sum of all expenses.
    pub total_expense: Decimal,
    /// total_income - total_expense.
    pub net_cash: Decimal,
    /// total_charges minus all allocations.
    pub total_debt: Decimal,
    /// total_debt rounded to the nearest thousand.
    pub total_debt_rounded: Decimal,
}

/// One group's share of a debtor's total.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DebtorGroup {
    /// Group ID.
    pub group_id: Uuid,
    /// Group name.
    pub name: String,
    /// Debt in this group.
    pub debt: Decimal,
}

/// A student with positive aggregate debt.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Debtor {
    /// Student ID.
    pub student_id: Uuid,
    /// Student's full name.
    pub full_name: String,
    /// Contact phone.
    pub phone: String,
    /// Total debt across groups.
    pub total_debt: Decimal,
    /// Total debt rounded to the nearest thousand.
    pub total_debt_rounded: Decimal,
    /// Per-group breakdown.
    pub groups: Vec<DebtorGroup>,
}

// ============================================================================
// Repository
// ============================================================================

/// Finance repository.
#[derive(Debug, Clone)]
pub struct FinanceRepository {
    db: DatabaseConnection,
}

impl FinanceRepository {
    /// Creates a new finance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Payments & allocation
    // ========================================================================

    /// Records a payment and allocates it across the student's outstanding
    /// charges, oldest month first.
    ///
    /// The payment row, its allocation rows, and every touched charge's
    /// status update commit or roll back together. Returns the payment and
    /// the student's refreshed summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the student does not exist, the amount is not
    /// positive, or a database operation fails. Finding nothing to allocate
    /// against is not an error: the payment stands on its own.
    pub async fn create_payment(
        &self,
        input: CreatePaymentInput,
        recorded_by: Uuid,
    ) -> Result<(payments::Model, StudentSummary), FinanceError> {
        if input.amount <= Decimal::ZERO {
            return Err(FinanceError::NonPositiveAmount(input.amount));
        }

        let student = students::Entity::find_by_id(input.student_id)
            .one(&self.db)
            .await?
            .ok_or(FinanceError::StudentNotFound(input.student_id))?;

        let txn = self.db.begin().await?;

        let now = Utc::now();
        let payment = payments::ActiveModel {
            id: Set(Uuid::new_v4()),
            student_id: Set(student.id),
            group_id: Set(input.group_id),
            amount: Set(input.amount),
            method: Set(input.method),
            status: Set(PaymentStatus::Completed),
            paid_at: Set(input.paid_at.unwrap_or(now).into()),
            reference: Set(input.reference),
            comment: Set(input.comment),
            recorded_by: Set(recorded_by),
            created_at: Set(now.into()),
        };
        let payment = payment.insert(&txn).await?;

        self.allocate_to_charges(&txn, &payment).await?;

        txn.commit().await?;

        let summary = self.student_summary(student.id).await?;
        Ok((payment, summary))
    }

    /// Re-runs allocation for an already persisted payment.
    ///
    /// A missing payment is a logged no-op, never an error: the caller's
    /// flow must not fail because there was nothing to do.
    ///
    /// # Errors
    ///
    /// Returns an error only if a database operation fails.
    pub async fn allocate_payment(&self, payment_id: Uuid) -> Result<(), FinanceError> {
        let Some(payment) = payments::Entity::find_by_id(payment_id).one(&self.db).await? else {
            warn!(%payment_id, "allocation requested for unknown payment, skipping");
            return Ok(());
        };

        let txn = self.db.begin().await?;
        self.allocate_to_charges(&txn, &payment).await?;
        txn.commit().await?;
        Ok(())
    }

    /// Allocates `payment` across unsettled charges inside `txn`.
    ///
    /// Candidate rows are locked (`SELECT ... FOR UPDATE`) so concurrent
    /// payments for the same student serialize on the charges they touch.
    async fn allocate_to_charges(
        &self,
        txn: &DatabaseTransaction,
        payment: &payments::Model,
    ) -> Result<(), FinanceError> {
        let mut query = tuition_charges::Entity::find()
            .filter(tuition_charges::Column::StudentId.eq(payment.student_id))
            .filter(tuition_charges::Column::Status.is_in([
                TuitionChargeStatus::Pending,
                TuitionChargeStatus::PartiallyPaid,
            ]));
        if let Some(group_id) = payment.group_id {
            query = query.filter(tuition_charges::Column::GroupId.eq(group_id));
        }

        let charges = query
            .order_by_asc(tuition_charges::Column::Year)
            .order_by_asc(tuition_charges::Column::Month)
            .lock_exclusive()
            .all(txn)
            .await?;

        if charges.is_empty() {
            info!(payment_id = %payment.id, "no open charges; payment kept unallocated");
            return Ok(());
        }

        let allocated = allocated_by_charge(
            payment_allocations::Entity::find()
                .filter(
                    payment_allocations::Column::ChargeId
                        .is_in(charges.iter().map(|c| c.id).collect::<Vec<_>>()),
                )
                .all(txn)
                .await?,
        );

        let outstanding = outstanding_view(&charges, &allocated);
        let plan = plan_allocations(payment.amount, &outstanding);

        let now = Utc::now();
        for planned in &plan.allocations {
            let allocation = payment_allocations::ActiveModel {
                id: Set(Uuid::new_v4()),
                payment_id: Set(payment.id),
                charge_id: Set(planned.charge_id),
                amount: Set(planned.amount),
                created_at: Set(now.into()),
            };
            allocation.insert(txn).await?;

            if let Some(charge) = charges.iter().find(|c| c.id == planned.charge_id) {
                let mut active: tuition_charges::ActiveModel = charge.clone().into();
                active.status = Set(planned.new_status.into());
                active.updated_at = Set(now.into());
                active.update(txn).await?;
            }
        }

        if plan.leftover > Decimal::ZERO {
            // There is no credit entity; the remainder simply stays
            // unrepresented in the allocation ledger.
            warn!(
                payment_id = %payment.id,
                leftover = %plan.leftover,
                "payment exceeds open charges; remainder not allocated"
            );
        }

        Ok(())
    }

    // ========================================================================
    // Charge creation
    // ========================================================================

    /// Creates or refreshes the tuition charge for the month a student
    /// joins a group.
    ///
    /// Returns `Ok(None)` when no charge is applicable (group missing, or
    /// fee not positive); callers treat that as success. A charge already
    /// present for the (student, group, year, month) key is updated in
    /// place; its discount is left untouched.
    ///
    /// # Errors
    ///
    /// Returns an error only if a database operation fails.
    pub async fn upsert_initial_charge(
        &self,
        student_id: Uuid,
        group_id: Uuid,
        join_date: NaiveDate,
    ) -> Result<Option<tuition_charges::Model>, FinanceError> {
        let Some(group) = groups::Entity::find_by_id(group_id).one(&self.db).await? else {
            warn!(%group_id, "group not found, no tuition charge created");
            return Ok(None);
        };

        let Some(calc) =
            compute_monthly_charge(group.days_pattern.into(), group.monthly_fee, join_date)
        else {
            warn!(
                %group_id,
                monthly_fee = %group.monthly_fee,
                "group has no usable fee, no tuition charge created"
            );
            return Ok(None);
        };

        let year = join_date.year();
        let month = i32::try_from(join_date.month()).unwrap_or_default();

        let existing = tuition_charges::Entity::find()
            .filter(tuition_charges::Column::StudentId.eq(student_id))
            .filter(tuition_charges::Column::GroupId.eq(group_id))
            .filter(tuition_charges::Column::Year.eq(year))
            .filter(tuition_charges::Column::Month.eq(month))
            .one(&self.db)
            .await?;

        let now = Utc::now();
        let charge = if let Some(existing) = existing {
            let mut active: tuition_charges::ActiveModel = existing.into();
            active.amount_due = Set(calc.amount_due);
            active.planned_lessons = Set(i32::try_from(calc.planned_lessons).unwrap_or_default());
            active.charged_lessons = Set(i32::try_from(calc.charged_lessons).unwrap_or_default());
            active.updated_at = Set(now.into());
            active.update(&self.db).await?
        } else {
            let model = tuition_charges::ActiveModel {
                id: Set(Uuid::new_v4()),
                student_id: Set(student_id),
                group_id: Set(group_id),
                year: Set(year),
                month: Set(month),
                amount_due: Set(calc.amount_due),
                discount: Set(Decimal::ZERO),
                planned_lessons: Set(i32::try_from(calc.planned_lessons).unwrap_or_default()),
                charged_lessons: Set(i32::try_from(calc.charged_lessons).unwrap_or_default()),
                status: Set(TuitionChargeStatus::Pending),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            };
            model.insert(&self.db).await?
        };

        info!(
            charge_id = %charge.id,
            %student_id,
            %group_id,
            year,
            month,
            amount_due = %charge.amount_due,
            planned = charge.planned_lessons,
            charged = charge.charged_lessons,
            "tuition charge created/updated"
        );

        Ok(Some(charge))
    }

    // ========================================================================
    // Discounts
    // ========================================================================

    /// Applies a discount to one monthly charge and recomputes its status
    /// against the already-paid sum.
    ///
    /// # Errors
    ///
    /// Returns `ChargeNotFound` for an unknown key and
    /// `Tuition(DiscountExceedsAmountDue)` when the discount is larger than
    /// the charge's due amount.
    pub async fn apply_discount(
        &self,
        input: ApplyDiscountInput,
    ) -> Result<tuition_charges::Model, FinanceError> {
        let charge = tuition_charges::Entity::find()
            .filter(tuition_charges::Column::StudentId.eq(input.student_id))
            .filter(tuition_charges::Column::GroupId.eq(input.group_id))
            .filter(tuition_charges::Column::Year.eq(input.year))
            .filter(tuition_charges::Column::Month.eq(input.month))
            .one(&self.db)
            .await?
            .ok_or(FinanceError::ChargeNotFound {
                student_id: input.student_id,
                group_id: input.group_id,
                year: input.year,
                month: input.month,
            })?;

        let paid: Decimal = payment_allocations::Entity::find()
            .filter(payment_allocations::Column::ChargeId.eq(charge.id))
            .all(&self.db)
            .await?
            .iter()
            .map(|a| a.amount)
            .sum();

        let status = status_after_discount(charge.amount_due, input.discount_amount, paid)?;

        let mut active: tuition_charges::ActiveModel = charge.into();
        active.discount = Set(input.discount_amount);
        active.status = Set(status.into());
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    // ========================================================================
    // Expenses
    // ========================================================================

    /// Records a money-out event.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount is not positive or the insert fails.
    pub async fn create_expense(
        &self,
        input: CreateExpenseInput,
        recorded_by: Uuid,
    ) -> Result<expenses::Model, FinanceError> {
        if input.amount <= Decimal::ZERO {
            return Err(FinanceError::NonPositiveAmount(input.amount));
        }

        let now = Utc::now();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(input.title),
            category: Set(input.category),
            amount: Set(input.amount),
            method: Set(input.method),
            paid_at: Set(input.paid_at.unwrap_or(now).into()),
            note: Set(input.note),
            recorded_by: Set(recorded_by),
            created_at: Set(now.into()),
        };

        Ok(expense.insert(&self.db).await?)
    }

    // ========================================================================
    // Read side
    // ========================================================================

    /// Per-student totals: effective charges, paid, debt, recent payments.
    ///
    /// # Errors
    ///
    /// Returns `StudentNotFound` for an unknown student.
    pub async fn student_summary(&self, student_id: Uuid) -> Result<StudentSummary, FinanceError> {
        let student = students::Entity::find_by_id(student_id)
            .one(&self.db)
            .await?
            .ok_or(FinanceError::StudentNotFound(student_id))?;

        let charges = tuition_charges::Entity::find()
            .filter(tuition_charges::Column::StudentId.eq(student.id))
            .all(&self.db)
            .await?;

        let total_charges: Decimal = charges
            .iter()
            .map(|c| tuition::effective_amount(c.amount_due, c.discount))
            .sum();

        let total_paid: Decimal = if charges.is_empty() {
            Decimal::ZERO
        } else {
            payment_allocations::Entity::find()
                .filter(
                    payment_allocations::Column::ChargeId
                        .is_in(charges.iter().map(|c| c.id).collect::<Vec<_>>()),
                )
                .all(&self.db)
                .await?
                .iter()
                .map(|a| a.amount)
                .sum()
        };

        let debt = total_charges - total_paid;

        let last_payments = payments::Entity::find()
            .filter(payments::Column::StudentId.eq(student.id))
            .order_by_desc(payments::Column::PaidAt)
            .limit(5)
            .all(&self.db)
            .await?;

        Ok(StudentSummary {
            student_id: student.id,
            total_charges,
            total_paid,
            debt,
            debt_rounded: round_to_thousand(debt),
            last_payments,
        })
    }

    /// Income and expenses over a date range, optionally by method.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn finance_overview(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        method: Option<PaymentMethod>,
    ) -> Result<FinanceOverview, FinanceError> {
        let mut income_query = payments::Entity::find()
            .filter(payments::Column::Status.eq(PaymentStatus::Completed))
            .filter(payments::Column::PaidAt.gte(from))
            .filter(payments::Column::PaidAt.lte(to));
        if let Some(method) = method {
            income_query = income_query.filter(payments::Column::Method.eq(method));
        }

        let total_income: Decimal = income_query
            .all(&self.db)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();

        let mut expense_query = expenses::Entity::find()
            .filter(expenses::Column::PaidAt.gte(from))
            .filter(expenses::Column::PaidAt.lte(to));
        if let Some(method) = method {
            expense_query = expense_query.filter(expenses::Column::Method.eq(method));
        }

        let total_expense: Decimal = expense_query
            .all(&self.db)
            .await?
            .iter()
            .map(|e| e.amount)
            .sum();

        Ok(FinanceOverview {
            from,
            to,
            method,
            total_income,
            total_expense,
            profit: total_income - total_expense,
        })
    }

    /// Institution-wide totals across all charges, payments, and expenses.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn global_balance(&self) -> Result<GlobalBalance, FinanceError> {
        let total_charges: Decimal = tuition_charges::Entity::find()
            .all(&self.db)
            .await?
            .iter()
            .map(|c| tuition::effective_amount(c.amount_due, c.discount))
            .sum();

        let total_allocated: Decimal = payment_allocations::Entity::find()
            .all(&self.db)
            .await?
            .iter()
            .map(|a| a.amount)
            .sum();

        let total_income: Decimal = payments::Entity::find()
            .filter(payments::Column::Status.eq(PaymentStatus::Completed))
            .all(&self.db)
            .await?
            .iter()
            .map(|p| p.amount)
            .sum();

        let total_expense: Decimal = expenses::Entity::find()
            .all(&self.db)
            .await?
            .iter()
            .map(|e| e.amount)
            .sum();

        let total_debt = total_charges - total_allocated;

        Ok(GlobalBalance {
            total_charges,
            total_income,
            total_expense,
            net_cash: total_income - total_expense,
            total_debt,
            total_debt_rounded: round_to_thousand(total_debt),
        })
    }

    /// Students with positive aggregate debt, largest first.
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails.
    pub async fn debtors(&self, min_debt: Decimal) -> Result<Vec<Debtor>, FinanceError> {
        let charges = tuition_charges::Entity::find()
            .filter(tuition_charges::Column::Status.is_in([
                TuitionChargeStatus::Pending,
                TuitionChargeStatus::PartiallyPaid,
            ]))
            .all(&self.db)
            .await?;

        if charges.is_empty() {
            return Ok(Vec::new());
        }

        let allocated = allocated_by_charge(
            payment_allocations::Entity::find()
                .filter(
                    payment_allocations::Column::ChargeId
                        .is_in(charges.iter().map(|c| c.id).collect::<Vec<_>>()),
                )
                .all(&self.db)
                .await?,
        );

        let student_ids: Vec<Uuid> = charges.iter().map(|c| c.student_id).collect();
        let students_with_users: HashMap<Uuid, (String, String)> = students::Entity::find()
            .filter(students::Column::Id.is_in(student_ids))
            .find_also_related(users::Entity)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(|(s, u)| {
                u.map(|u| (s.id, (format!("{} {}", u.first_name, u.last_name), u.phone)))
            })
            .collect();

        let group_names: HashMap<Uuid, String> = groups::Entity::find()
            .filter(groups::Column::Id.is_in(charges.iter().map(|c| c.group_id).collect::<Vec<_>>()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();

        let mut by_student: HashMap<Uuid, Debtor> = HashMap::new();

        for charge in &charges {
            let paid = allocated.get(&charge.id).copied().unwrap_or(Decimal::ZERO);
            let debt = tuition::charge_debt(charge.amount_due, charge.discount, paid);
            if debt <= Decimal::ZERO {
                continue;
            }

            let (full_name, phone) = students_with_users
                .get(&charge.student_id)
                .cloned()
                .unwrap_or_default();

            let entry = by_student.entry(charge.student_id).or_insert_with(|| Debtor {
                student_id: charge.student_id,
                full_name,
                phone,
                total_debt: Decimal::ZERO,
                total_debt_rounded: Decimal::ZERO,
                groups: Vec::new(),
            });

            entry.total_debt += debt;
            entry.total_debt_rounded = round_to_thousand(entry.total_debt);
            entry.groups.push(DebtorGroup {
                group_id: charge.group_id,
                name: group_names
                    .get(&charge.group_id)
                    .cloned()
                    .unwrap_or_default(),
                debt,
            });
        }

        let mut result: Vec<Debtor> = by_student
            .into_values()
            .filter(|d| d.total_debt >= min_debt)
            .collect();
        result.sort_by(|a, b| b.total_debt.cmp(&a.total_debt));

        Ok(result)
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Sums allocation rows per charge.
#[must_use]
pub fn allocated_by_charge(
    allocations: Vec<payment_allocations::Model>,
) -> HashMap<Uuid, Decimal> {
    let mut by_charge: HashMap<Uuid, Decimal> = HashMap::new();
    for allocation in allocations {
        *by_charge.entry(allocation.charge_id).or_default() += allocation.amount;
    }
    by_charge
}

/// Projects charge rows into the allocator's view, keeping query order.
#[must_use]
pub fn outstanding_view(
    charges: &[tuition_charges::Model],
    allocated: &HashMap<Uuid, Decimal>,
) -> Vec<OutstandingCharge> {
    charges
        .iter()
        .map(|c| OutstandingCharge {
            charge_id: c.id,
            year: c.year,
            month: c.month.unsigned_abs(),
            amount_due: c.amount_due,
            allocated: allocated.get(&c.id).copied().unwrap_or(Decimal::ZERO),
        })
        .collect()
}

#[cfg(test)]
#[path = "finance_tests.rs"]
mod tests;
