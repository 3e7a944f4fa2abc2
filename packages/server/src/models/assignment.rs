use chrono::{DateTime, NaiveDate, Utc};
use common::Grade;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_non_negative, validate_text, validate_title};
use crate::entity::{assignment, submission};
use crate::error::AppError;

fn default_total_marks() -> i32 {
    100
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateAssignmentRequest {
    #[schema(example = "Fractions worksheet")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub subject_id: Option<i32>,
    pub classroom_id: Option<i32>,
    /// Opaque reference to an uploaded file.
    pub file: Option<String>,
    pub due_date: Option<NaiveDate>,
    #[serde(default = "default_total_marks")]
    pub total_marks: i32,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub subject_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub classroom_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub file: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub due_date: Option<Option<NaiveDate>>,
    pub total_marks: Option<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AssignmentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub subject_id: Option<i32>,
    pub classroom_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AssignmentResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub subject_id: Option<i32>,
    pub classroom_id: Option<i32>,
    /// Teacher profile that set the assignment.
    pub uploaded_by: Option<i32>,
    pub file: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub total_marks: i32,
    /// The due date has passed.
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssignmentResponse {
    pub fn new(m: assignment::Model, today: NaiveDate) -> Self {
        Self {
            is_overdue: is_late(today, m.due_date),
            id: m.id,
            title: m.title,
            description: m.description,
            subject_id: m.subject_id,
            classroom_id: m.classroom_id,
            uploaded_by: m.uploaded_by,
            file: m.file,
            due_date: m.due_date,
            total_marks: m.total_marks,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_create_assignment(req: &CreateAssignmentRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    if req.total_marks < 0 {
        return Err(AppError::Validation(
            "Total marks must not be negative".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_assignment(req: &UpdateAssignmentRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if req.total_marks.is_some_and(|t| t < 0) {
        return Err(AppError::Validation(
            "Total marks must not be negative".into(),
        ));
    }
    Ok(())
}

/// Work is late when handed in on a day after the due date. Anything
/// submitted on the due date itself is on time, and assignments without a
/// due date are never late.
pub fn is_late(submitted_on: NaiveDate, due_date: Option<NaiveDate>) -> bool {
    due_date.is_some_and(|due| submitted_on > due)
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitAssignmentRequest {
    /// Opaque reference to the uploaded work.
    pub file: String,
    pub remarks: Option<String>,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct GradeSubmissionRequest {
    #[schema(value_type = String, example = "17.5")]
    pub marks_obtained: Decimal,
    pub remarks: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SubmissionListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub assignment_id: Option<i32>,
    pub student_id: Option<i32>,
    /// `true` for graded submissions only, `false` for ungraded only.
    pub graded: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub assignment_id: i32,
    pub student_id: i32,
    pub file: String,
    pub submitted_at: DateTime<Utc>,
    pub remarks: Option<String>,
    #[schema(value_type = Option<String>)]
    pub marks_obtained: Option<Decimal>,
    pub is_late: bool,
    pub graded_at: Option<DateTime<Utc>>,
    /// Teacher profile that graded the work.
    pub graded_by: Option<i32>,
}

impl From<submission::Model> for SubmissionResponse {
    fn from(m: submission::Model) -> Self {
        Self {
            id: m.id,
            assignment_id: m.assignment_id,
            student_id: m.student_id,
            file: m.file,
            submitted_at: m.submitted_at,
            remarks: m.remarks,
            marks_obtained: m.marks_obtained,
            is_late: m.is_late,
            graded_at: m.graded_at,
            graded_by: m.graded_by,
        }
    }
}

/// Graded submission with the letter grade its marks earn.
#[derive(Serialize, utoipa::ToSchema)]
pub struct GradedSubmissionResponse {
    #[serde(flatten)]
    pub submission: SubmissionResponse,
    pub grade: Grade,
}

pub fn validate_submit(req: &SubmitAssignmentRequest) -> Result<(), AppError> {
    validate_text("File", &req.file, 255)
}

pub fn validate_grade(req: &GradeSubmissionRequest, total_marks: i32) -> Result<(), AppError> {
    validate_non_negative("Marks", req.marks_obtained)?;
    if req.marks_obtained > Decimal::from(total_marks) {
        return Err(AppError::Validation(format!(
            "Marks must not exceed the assignment total of {total_marks}"
        )));
    }
    Ok(())
}
