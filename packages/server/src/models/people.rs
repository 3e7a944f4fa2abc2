use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::result::ResultResponse;
use super::shared::{double_option, validate_text};
use crate::entity::{student, subject, teacher, user};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateStudentRequest {
    /// Account with role `student` this profile extends.
    pub user_id: i32,
    #[schema(example = "2025-07-014")]
    pub roll_no: String,
    pub classroom_id: Option<i32>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    /// Defaults to today.
    pub admission_date: Option<NaiveDate>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateStudentRequest {
    pub roll_no: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub classroom_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub parent_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub parent_phone: Option<Option<String>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StudentListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub classroom_id: Option<i32>,
    pub is_active: Option<bool>,
    /// Matches roll number.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentResponse {
    pub id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub roll_no: String,
    pub classroom_id: Option<i32>,
    pub parent_name: Option<String>,
    pub parent_phone: Option<String>,
    pub admission_date: NaiveDate,
    pub is_active: bool,
}

impl StudentResponse {
    pub fn new(m: student::Model, account: Option<&user::Model>) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            username: account.map(|u| u.username.clone()),
            full_name: account.map(user::Model::full_name),
            roll_no: m.roll_no,
            classroom_id: m.classroom_id,
            parent_name: m.parent_name,
            parent_phone: m.parent_phone,
            admission_date: m.admission_date,
            is_active: m.is_active,
        }
    }
}

/// Attendance rate and results for one student.
#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentSummary {
    pub student: StudentResponse,
    pub attendance_total: u64,
    pub attendance_present: u64,
    #[schema(value_type = String, example = "92.50")]
    pub attendance_percentage: Decimal,
    pub results: Vec<ResultResponse>,
}

pub fn validate_create_student(req: &CreateStudentRequest) -> Result<(), AppError> {
    validate_text("Roll number", &req.roll_no, 32)?;
    if let Some(ref phone) = req.parent_phone {
        validate_text("Parent phone", phone, 32)?;
    }
    Ok(())
}

pub fn validate_update_student(req: &UpdateStudentRequest) -> Result<(), AppError> {
    if let Some(ref roll_no) = req.roll_no {
        validate_text("Roll number", roll_no, 32)?;
    }
    if let Some(Some(ref phone)) = req.parent_phone {
        validate_text("Parent phone", phone, 32)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTeacherRequest {
    /// Account with role `teacher` this profile extends.
    pub user_id: i32,
    pub qualification: Option<String>,
    #[serde(default)]
    pub experience_years: i32,
    /// Defaults to today.
    pub joining_date: Option<NaiveDate>,
    #[serde(default)]
    pub subject_ids: Vec<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateTeacherRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub qualification: Option<Option<String>>,
    pub experience_years: Option<i32>,
    pub joining_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Replaces the full set of subjects a teacher teaches.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct SetTeacherSubjectsRequest {
    pub subject_ids: Vec<i32>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TeacherListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub is_active: Option<bool>,
    /// Teachers of this subject only.
    pub subject_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubjectRef {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
}

impl From<subject::Model> for SubjectRef {
    fn from(m: subject::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            code: m.code,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeacherResponse {
    pub id: i32,
    pub user_id: i32,
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub qualification: Option<String>,
    pub experience_years: i32,
    pub joining_date: NaiveDate,
    pub is_active: bool,
    pub subjects: Vec<SubjectRef>,
}

impl TeacherResponse {
    pub fn new(m: teacher::Model, account: Option<&user::Model>, subjects: Vec<SubjectRef>) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            username: account.map(|u| u.username.clone()),
            full_name: account.map(user::Model::full_name),
            qualification: m.qualification,
            experience_years: m.experience_years,
            joining_date: m.joining_date,
            is_active: m.is_active,
            subjects,
        }
    }
}

pub fn validate_experience(years: i32) -> Result<(), AppError> {
    if !(0..=80).contains(&years) {
        return Err(AppError::Validation(
            "Experience years must be between 0 and 80".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classroom_can_be_cleared_or_left_alone() {
        let cleared: UpdateStudentRequest =
            serde_json::from_str(r#"{"classroom_id": null}"#).unwrap();
        assert_eq!(cleared.classroom_id, Some(None));

        let untouched: UpdateStudentRequest = serde_json::from_str("{}").unwrap();
        assert!(untouched == UpdateStudentRequest::default());
    }

    #[test]
    fn negative_experience_is_rejected() {
        assert!(validate_experience(-1).is_err());
        assert!(validate_experience(0).is_ok());
    }
}
