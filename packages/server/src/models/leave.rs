use chrono::{DateTime, NaiveDate, Utc};
use common::LeaveStatus;
use common::leave::{ReviewDecision, leave_duration};
use serde::{Deserialize, Serialize};

use super::shared::validate_text;
use crate::entity::leave_application;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ApplyLeaveRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(example = "Family wedding")]
    pub reason: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReviewLeaveRequest {
    pub decision: ReviewDecision,
    pub remarks: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LeaveListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<LeaveStatus>,
    pub applicant_id: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaveResponse {
    pub id: i32,
    /// Applying user account.
    pub applicant_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive number of days.
    #[schema(example = 3)]
    pub duration_days: i64,
    pub reason: String,
    pub status: LeaveStatus,
    pub applied_on: DateTime<Utc>,
    pub reviewed_by: Option<i32>,
    pub reviewed_on: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl From<leave_application::Model> for LeaveResponse {
    fn from(m: leave_application::Model) -> Self {
        Self {
            duration_days: leave_duration(m.start_date, m.end_date),
            id: m.id,
            applicant_id: m.applicant_id,
            start_date: m.start_date,
            end_date: m.end_date,
            reason: m.reason,
            status: m.status,
            applied_on: m.applied_on,
            reviewed_by: m.reviewed_by,
            reviewed_on: m.reviewed_on,
            remarks: m.remarks,
        }
    }
}

pub fn validate_apply_leave(req: &ApplyLeaveRequest) -> Result<(), AppError> {
    validate_text("Reason", &req.reason, 2000)?;
    if req.end_date < req.start_date {
        return Err(AppError::Validation(
            "End date must not be before the start date".into(),
        ));
    }
    Ok(())
}
