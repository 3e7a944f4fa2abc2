use chrono::{DateTime, NaiveDate, Utc};
use common::AttendanceStatus;
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_text};
use crate::entity::attendance;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct MarkAttendanceRequest {
    pub student_id: i32,
    /// Omit for a whole-day mark.
    pub subject_id: Option<i32>,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    pub status: AttendanceStatus,
    pub remarks: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateAttendanceRequest {
    pub status: Option<AttendanceStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub remarks: Option<Option<String>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AttendanceListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub student_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub date: Option<NaiveDate>,
    pub status: Option<AttendanceStatus>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AttendanceResponse {
    pub id: i32,
    pub student_id: i32,
    pub subject_id: Option<i32>,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    /// Teacher profile that recorded the mark.
    pub marked_by: Option<i32>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<attendance::Model> for AttendanceResponse {
    fn from(m: attendance::Model) -> Self {
        Self {
            id: m.id,
            student_id: m.student_id,
            subject_id: m.subject_id,
            date: m.date,
            status: m.status,
            marked_by: m.marked_by,
            remarks: m.remarks,
            created_at: m.created_at,
        }
    }
}

pub fn validate_remarks(remarks: Option<&str>) -> Result<(), AppError> {
    match remarks {
        Some(r) if !r.trim().is_empty() => validate_text("Remarks", r, 500),
        _ => Ok(()),
    }
}
