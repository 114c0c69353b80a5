//! Finance routes: payments, expenses, summaries, debtors, discounts.
//!
//! All endpoints are restricted to ADMIN and MANAGER.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::{
    AppState,
    middleware::{AuthUser, require_role},
    routes::error_response,
};
use tutoria_shared::AppError;
use tutoria_db::{
    entities::sea_orm_active_enums::{ExpenseCategory, PaymentMethod},
    repositories::finance::{
        ApplyDiscountInput, CreateExpenseInput, CreatePaymentInput, FinanceError,
        FinanceRepository,
    },
};

const FINANCE_ROLES: &[&str] = &["ADMIN", "MANAGER"];

/// Creates the finance routes (requires auth middleware applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/finance/payments", post(create_payment))
        .route("/finance/expenses", post(create_expense))
        .route("/finance/students/{id}/summary", get(student_summary))
        .route("/finance/overview", get(overview))
        .route("/finance/debtors", get(debtors))
        .route("/finance/balance", get(balance))
        .route("/finance/discounts", post(apply_discount))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Paying student.
    pub student_id: Uuid,
    /// Optional group scope for allocation.
    pub group_id: Option<Uuid>,
    /// Amount received; must be positive.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// When the money changed hands; defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
    /// Receipt number or similar.
    pub reference: Option<String>,
    /// Free-text comment.
    pub comment: Option<String>,
}

/// Request body for recording an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Short title.
    pub title: String,
    /// Expense category.
    pub category: ExpenseCategory,
    /// Amount paid out; must be positive.
    pub amount: Decimal,
    /// Payment method.
    pub method: PaymentMethod,
    /// When it was paid; defaults to now.
    pub paid_at: Option<DateTime<Utc>>,
    /// Free-text note.
    pub note: Option<String>,
}

/// Request body for applying a discount.
#[derive(Debug, Deserialize)]
pub struct ApplyDiscountRequest {
    /// Student ID.
    pub student_id: Uuid,
    /// Group ID.
    pub group_id: Uuid,
    /// Charge year.
    pub year: i32,
    /// Charge month (1-12).
    pub month: i32,
    /// Discount amount.
    pub discount_amount: Decimal,
}

/// Query parameters for the overview endpoint.
#[derive(Debug, Deserialize)]
pub struct OverviewQuery {
    /// Range start date; defaults to January 1 of the current year.
    pub from: Option<NaiveDate>,
    /// Range end date; defaults to now.
    pub to: Option<NaiveDate>,
    /// Optional method filter.
    pub method: Option<PaymentMethod>,
}

/// Query parameters for the debtors endpoint.
#[derive(Debug, Deserialize)]
pub struct DebtorsQuery {
    /// Minimum aggregate debt to include; defaults to zero.
    pub min_debt: Option<Decimal>,
}

/// Response body for a created payment.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// The persisted payment.
    pub payment: tutoria_db::entities::payments::Model,
    /// Refreshed student summary after allocation.
    pub summary: tutoria_db::repositories::finance::StudentSummary,
}

// ============================================================================
// Helpers
// ============================================================================

fn finance_error_response(e: &FinanceError) -> Response {
    let app_error = match e {
        FinanceError::StudentNotFound(_) | FinanceError::ChargeNotFound { .. } => {
            AppError::NotFound(e.to_string())
        }
        FinanceError::NonPositiveAmount(_) | FinanceError::Tuition(_) => {
            AppError::Validation(e.to_string())
        }
        FinanceError::Database(_) => {
            error!(error = %e, "Finance database error");
            AppError::Database("An error occurred".to_string())
        }
    };

    error_response(&app_error)
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST /finance/payments - Record a payment, allocate it, return the
/// refreshed summary.
async fn create_payment(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreatePaymentRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, FINANCE_ROLES) {
        return response;
    }

    let repo = FinanceRepository::new((*state.db).clone());
    let input = CreatePaymentInput {
        student_id: payload.student_id,
        group_id: payload.group_id,
        amount: payload.amount,
        method: payload.method,
        paid_at: payload.paid_at,
        reference: payload.reference,
        comment: payload.comment,
    };

    match repo.create_payment(input, auth.user_id()).await {
        Ok((payment, summary)) => {
            (StatusCode::CREATED, Json(PaymentResponse { payment, summary })).into_response()
        }
        Err(e) => finance_error_response(&e),
    }
}

/// POST /finance/expenses - Record a money-out event.
async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, FINANCE_ROLES) {
        return response;
    }

    let repo = FinanceRepository::new((*state.db).clone());
    let input = CreateExpenseInput {
        title: payload.title,
        category: payload.category,
        amount: payload.amount,
        method: payload.method,
        paid_at: payload.paid_at,
        note: payload.note,
    };

    match repo.create_expense(input, auth.user_id()).await {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => finance_error_response(&e),
    }
}

/// GET /finance/students/{id}/summary - Per-student totals and recent
/// payments.
async fn student_summary(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(student_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, FINANCE_ROLES) {
        return response;
    }

    let repo = FinanceRepository::new((*state.db).clone());
    match repo.student_summary(student_id).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => finance_error_response(&e),
    }
}

/// GET /finance/overview - Income vs expenses for a date range.
async fn overview(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<OverviewQuery>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, FINANCE_ROLES) {
        return response;
    }

    let now = Utc::now();
    let from = query
        .from
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map_or_else(
            || {
                Utc.with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
                    .single()
                    .unwrap_or(now)
            },
            |dt| Utc.from_utc_datetime(&dt),
        );
    let to = query
        .to
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map_or(now, |dt| Utc.from_utc_datetime(&dt));

    let repo = FinanceRepository::new((*state.db).clone());
    match repo.finance_overview(from, to, query.method).await {
        Ok(overview) => Json(overview).into_response(),
        Err(e) => finance_error_response(&e),
    }
}

/// GET /finance/debtors - Students with positive aggregate debt.
async fn debtors(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<DebtorsQuery>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, FINANCE_ROLES) {
        return response;
    }

    let repo = FinanceRepository::new((*state.db).clone());
    match repo.debtors(query.min_debt.unwrap_or(Decimal::ZERO)).await {
        Ok(debtors) => Json(debtors).into_response(),
        Err(e) => finance_error_response(&e),
    }
}

/// GET /finance/balance - Institution-wide totals.
async fn balance(State(state): State<AppState>, auth: AuthUser) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, FINANCE_ROLES) {
        return response;
    }

    let repo = FinanceRepository::new((*state.db).clone());
    match repo.global_balance().await {
        Ok(balance) => Json(balance).into_response(),
        Err(e) => finance_error_response(&e),
    }
}

/// POST /finance/discounts - Apply a discount to one monthly charge.
async fn apply_discount(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ApplyDiscountRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_role(&auth, FINANCE_ROLES) {
        return response;
    }

    if payload.discount_amount < Decimal::ZERO {
        return error_response(&AppError::Validation(
            "Discount cannot be negative".to_string(),
        ));
    }

    let repo = FinanceRepository::new((*state.db).clone());
    let input = ApplyDiscountInput {
        student_id: payload.student_id,
        group_id: payload.group_id,
        year: payload.year,
        month: payload.month,
        discount_amount: payload.discount_amount,
    };

    match repo.apply_discount(input).await {
        Ok(charge) => Json(charge).into_response(),
        Err(e) => finance_error_response(&e),
    }
}
