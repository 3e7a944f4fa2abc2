use chrono::{DateTime, NaiveDate, Utc};
use common::grade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_non_negative, validate_text};
use crate::entity::result;
use crate::error::AppError;

fn default_total_marks() -> i32 {
    100
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateResultRequest {
    pub student_id: i32,
    pub subject_id: Option<i32>,
    #[schema(value_type = String, example = "78.50")]
    pub marks: Decimal,
    #[serde(default = "default_total_marks")]
    pub total_marks: i32,
    #[schema(example = "Midterm 2025")]
    pub exam_name: String,
    pub exam_date: NaiveDate,
    /// Letter grade. Derived from the percentage when omitted.
    pub grade: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateResultRequest {
    #[schema(value_type = Option<String>)]
    pub marks: Option<Decimal>,
    pub total_marks: Option<i32>,
    pub exam_name: Option<String>,
    pub exam_date: Option<NaiveDate>,
    /// `null` clears the grade so it is derived again.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub grade: Option<Option<String>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResultListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub exam_name: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ResultResponse {
    pub id: i32,
    pub student_id: i32,
    pub subject_id: Option<i32>,
    #[schema(value_type = String)]
    pub marks: Decimal,
    pub total_marks: i32,
    /// `marks / total_marks * 100`, two decimals.
    #[schema(value_type = String)]
    pub percentage: Decimal,
    pub exam_name: String,
    pub exam_date: NaiveDate,
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<result::Model> for ResultResponse {
    fn from(m: result::Model) -> Self {
        Self {
            percentage: common::stats::round2(grade::percentage(m.marks, m.total_marks)),
            id: m.id,
            student_id: m.student_id,
            subject_id: m.subject_id,
            marks: m.marks,
            total_marks: m.total_marks,
            exam_name: m.exam_name,
            exam_date: m.exam_date,
            grade: m.grade,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

fn validate_marks(marks: Decimal, total_marks: i32) -> Result<(), AppError> {
    validate_non_negative("Marks", marks)?;
    if total_marks < 0 {
        return Err(AppError::Validation(
            "Total marks must not be negative".into(),
        ));
    }
    Ok(())
}

fn validate_grade(grade: &str) -> Result<(), AppError> {
    if grade.trim().chars().count() > 4 {
        return Err(AppError::Validation(
            "Grade must be at most 4 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_result(req: &CreateResultRequest) -> Result<(), AppError> {
    validate_marks(req.marks, req.total_marks)?;
    validate_text("Exam name", &req.exam_name, 100)?;
    if let Some(ref grade) = req.grade {
        validate_grade(grade)?;
    }
    Ok(())
}

pub fn validate_update_result(req: &UpdateResultRequest) -> Result<(), AppError> {
    if let Some(marks) = req.marks {
        validate_non_negative("Marks", marks)?;
    }
    if let Some(total) = req.total_marks {
        validate_marks(Decimal::ZERO, total)?;
    }
    if let Some(ref name) = req.exam_name {
        validate_text("Exam name", name, 100)?;
    }
    if let Some(Some(ref grade)) = req.grade {
        validate_grade(grade)?;
    }
    Ok(())
}
