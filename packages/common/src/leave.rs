use chrono::NaiveDate;
use serde::Deserialize;

use crate::enums::LeaveStatus;

/// Reviewer's verdict on a pending application.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("leave application has already been {0}")]
    AlreadyReviewed(LeaveStatus),
}

impl LeaveStatus {
    /// Apply a review. Only pending applications can be reviewed.
    pub fn review(self, decision: ReviewDecision) -> Result<LeaveStatus, ReviewError> {
        if self.is_terminal() {
            return Err(ReviewError::AlreadyReviewed(self));
        }
        Ok(match decision {
            ReviewDecision::Approve => LeaveStatus::Approved,
            ReviewDecision::Reject => LeaveStatus::Rejected,
        })
    }
}

/// Inclusive number of days covered by a leave.
pub fn leave_duration(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
