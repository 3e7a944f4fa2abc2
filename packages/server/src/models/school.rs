use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_text};
use crate::entity::{classroom, subject};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateClassroomRequest {
    #[schema(example = "Grade 7")]
    pub name: String,
    #[schema(example = "B")]
    pub section: Option<String>,
    pub class_teacher_id: Option<i32>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateClassroomRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub section: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub class_teacher_id: Option<Option<i32>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ClassroomResponse {
    pub id: i32,
    pub name: String,
    pub section: Option<String>,
    /// `name` and `section` joined for display, e.g. `Grade 7 - B`.
    pub display_name: String,
    pub class_teacher_id: Option<i32>,
    pub student_count: u64,
    pub created_at: DateTime<Utc>,
}

/// `Grade 7 - B`, or just the name when there is no section.
pub fn display_name(name: &str, section: Option<&str>) -> String {
    match section {
        Some(section) if !section.is_empty() => format!("{name} - {section}"),
        _ => name.to_string(),
    }
}

impl ClassroomResponse {
    pub fn new(m: classroom::Model, student_count: u64) -> Self {
        let display_name = display_name(&m.name, m.section.as_deref());
        Self {
            id: m.id,
            name: m.name,
            section: m.section,
            display_name,
            class_teacher_id: m.class_teacher_id,
            student_count,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_classroom(req: &CreateClassroomRequest) -> Result<(), AppError> {
    validate_text("Name", &req.name, 100)?;
    if let Some(ref section) = req.section {
        validate_text("Section", section, 10)?;
    }
    Ok(())
}

pub fn validate_update_classroom(req: &UpdateClassroomRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("Name", name, 100)?;
    }
    if let Some(Some(ref section)) = req.section {
        validate_text("Section", section, 10)?;
    }
    Ok(())
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateSubjectRequest {
    #[schema(example = "Mathematics")]
    pub name: String,
    #[schema(example = "MATH")]
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub code: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubjectResponse {
    pub id: i32,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<subject::Model> for SubjectResponse {
    fn from(m: subject::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            code: m.code,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

pub fn validate_create_subject(req: &CreateSubjectRequest) -> Result<(), AppError> {
    validate_text("Name", &req.name, 100)?;
    if let Some(ref code) = req.code {
        validate_text("Code", code, 20)?;
    }
    Ok(())
}

pub fn validate_update_subject(req: &UpdateSubjectRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_text("Name", name, 100)?;
    }
    if let Some(Some(ref code)) = req.code {
        validate_text("Code", code, 20)?;
    }
    Ok(())
}
