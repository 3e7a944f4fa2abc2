use chrono::{DateTime, NaiveDate, Utc};
use common::{FeeType, PaymentStatus, fee};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_non_negative, validate_text};
use crate::entity::fee as fee_entity;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateFeeRequest {
    pub student_id: i32,
    pub fee_type: FeeType,
    #[schema(value_type = String, example = "1200.00")]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[serde(default)]
    #[schema(value_type = String, example = "0.00")]
    pub paid_amount: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub transaction_id: Option<String>,
    #[schema(example = "2025-2026")]
    pub academic_year: String,
    pub semester: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateFeeRequest {
    pub fee_type: Option<FeeType>,
    #[schema(value_type = Option<String>)]
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub paid_amount: Option<Decimal>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub payment_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub transaction_id: Option<Option<String>>,
    pub academic_year: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub semester: Option<Option<String>>,
}

/// A payment towards a fee. Adds to the amount already paid.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RecordPaymentRequest {
    #[schema(value_type = String, example = "600.00")]
    pub amount: Decimal,
    /// Defaults to today.
    pub payment_date: Option<NaiveDate>,
    pub transaction_id: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeeListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub student_id: Option<i32>,
    pub payment_status: Option<PaymentStatus>,
    pub fee_type: Option<FeeType>,
    pub academic_year: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct FeeResponse {
    pub id: i32,
    pub student_id: i32,
    pub fee_type: FeeType,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    #[schema(value_type = String)]
    pub paid_amount: Decimal,
    /// `amount - paid_amount`.
    #[schema(value_type = String)]
    pub balance: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_date: Option<NaiveDate>,
    pub transaction_id: Option<String>,
    pub academic_year: String,
    pub semester: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<fee_entity::Model> for FeeResponse {
    fn from(m: fee_entity::Model) -> Self {
        Self {
            balance: fee::balance(m.amount, m.paid_amount),
            id: m.id,
            student_id: m.student_id,
            fee_type: m.fee_type,
            amount: m.amount,
            due_date: m.due_date,
            paid_amount: m.paid_amount,
            payment_status: m.payment_status,
            payment_date: m.payment_date,
            transaction_id: m.transaction_id,
            academic_year: m.academic_year,
            semester: m.semester,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_fee(req: &CreateFeeRequest) -> Result<(), AppError> {
    validate_non_negative("Amount", req.amount)?;
    validate_non_negative("Paid amount", req.paid_amount)?;
    validate_text("Academic year", &req.academic_year, 20)?;
    Ok(())
}

pub fn validate_update_fee(req: &UpdateFeeRequest) -> Result<(), AppError> {
    if let Some(amount) = req.amount {
        validate_non_negative("Amount", amount)?;
    }
    if let Some(paid) = req.paid_amount {
        validate_non_negative("Paid amount", paid)?;
    }
    if let Some(ref year) = req.academic_year {
        validate_text("Academic year", year, 20)?;
    }
    Ok(())
}

/// A payment must be positive and not exceed what is still owed.
pub fn validate_payment(payment: Decimal, outstanding: Decimal) -> Result<(), AppError> {
    if payment <= Decimal::ZERO {
        return Err(AppError::Validation("Payment must be positive".into()));
    }
    if payment > outstanding {
        return Err(AppError::Validation(format!(
            "Payment exceeds the outstanding balance of {outstanding}"
        )));
    }
    Ok(())
}
