use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::ExamType;
use serde::{Deserialize, Serialize};

use super::shared::{validate_positive_int, validate_text};
use crate::entity::exam;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateExamRequest {
    #[schema(example = "Term 1 algebra")]
    pub name: String,
    pub exam_type: ExamType,
    pub subject_id: i32,
    pub classroom_id: i32,
    pub date: NaiveDate,
    #[schema(value_type = String, example = "10:00:00")]
    pub start_time: NaiveTime,
    /// Minutes.
    #[schema(example = 90)]
    pub duration: i32,
    pub total_marks: i32,
    #[serde(default)]
    pub instructions: String,
    /// Students only see published exams.
    #[serde(default)]
    pub is_published: bool,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateExamRequest {
    pub name: Option<String>,
    pub exam_type: Option<ExamType>,
    pub date: Option<NaiveDate>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    pub duration: Option<i32>,
    pub total_marks: Option<i32>,
    pub instructions: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExamListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub subject_id: Option<i32>,
    pub classroom_id: Option<i32>,
    pub exam_type: Option<ExamType>,
    /// Only exams on or after this date.
    pub from: Option<NaiveDate>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ExamResponse {
    pub id: i32,
    pub name: String,
    pub exam_type: ExamType,
    pub subject_id: i32,
    pub classroom_id: i32,
    pub date: NaiveDate,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    pub duration: i32,
    pub total_marks: i32,
    pub instructions: String,
    /// Teacher profile that scheduled the exam.
    pub created_by: Option<i32>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl From<exam::Model> for ExamResponse {
    fn from(m: exam::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            exam_type: m.exam_type,
            subject_id: m.subject_id,
            classroom_id: m.classroom_id,
            date: m.date,
            start_time: m.start_time,
            duration: m.duration,
            total_marks: m.total_marks,
            instructions: m.instructions,
            created_by: m.created_by,
            is_published: m.is_published,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_exam(req: &CreateExamRequest) -> Result<(), AppError> {
    validate_text("Name", &req.name, 200)?;
    validate_positive_int("Duration", req.duration)?;
    validate_positive_int("Total marks", req.total_marks)?;
    Ok(())
}

pub fn validate_update_exam(req: &UpdateExamRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("Name", name, 200)?;
    }
    if let Some(duration) = req.duration {
        validate_positive_int("Duration", duration)?;
    }
    if let Some(total) = req.total_marks {
        validate_positive_int("Total marks", total)?;
    }
    Ok(())
}
