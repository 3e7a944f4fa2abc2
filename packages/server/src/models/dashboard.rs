use std::collections::BTreeMap;

use common::grade::percentage;
use common::stats::average;
use rust_decimal::Decimal;
use serde::Serialize;

use super::assignment::AssignmentResponse;
use super::notice::NoticeResponse;
use super::people::SubjectRef;
use super::result::ResultResponse;
use super::user::UserSummary;

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentDashboard {
    pub recent_notices: Vec<NoticeResponse>,
    /// Assignments set for the student's classroom, nearest due first.
    pub assignments: Vec<AssignmentResponse>,
    pub recent_results: Vec<ResultResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TeacherDashboard {
    pub recent_notices: Vec<NoticeResponse>,
    /// Assignments the teacher uploaded, newest first.
    pub assignments: Vec<AssignmentResponse>,
    pub subjects: Vec<SubjectRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminDashboard {
    pub active_students: u64,
    pub active_teachers: u64,
    pub subjects: u64,
    pub classrooms: u64,
    pub recent_notices: Vec<NoticeResponse>,
    /// Accounts awaiting approval.
    pub pending_users: Vec<UserSummary>,
}

/// Landing-page data, shaped by the caller's role.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum DashboardResponse {
    Student(StudentDashboard),
    Teacher(TeacherDashboard),
    Admin(AdminDashboard),
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubjectAverage {
    pub subject_id: Option<i32>,
    pub subject_name: Option<String>,
    /// Mean percentage over the subject's results.
    #[schema(value_type = String, example = "78.50")]
    pub average_percentage: Decimal,
    pub results: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StudentAnalytics {
    pub student_id: i32,
    #[schema(value_type = String, example = "92.31")]
    pub attendance_percentage: Decimal,
    pub attendance_total: u64,
    pub attendance_present: u64,
    /// Mean percentage over all results.
    #[schema(value_type = String)]
    pub average_marks: Decimal,
    pub subject_averages: Vec<SubjectAverage>,
    /// Fees not yet fully paid.
    pub pending_fees: u64,
    #[schema(value_type = String)]
    pub outstanding_balance: Decimal,
}

/// Read-only branding for clients.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SiteResponse {
    #[schema(example = "School Management System")]
    pub header: String,
    #[schema(example = "School Admin")]
    pub title: String,
}

/// Overall mean percentage plus per-subject means, in subject id order
/// with unassigned results first. Items are `(subject_id, marks, total)`.
pub fn result_averages(
    results: impl IntoIterator<Item = (Option<i32>, Decimal, i32)>,
) -> (Decimal, Vec<(Option<i32>, Decimal, usize)>) {
    let mut by_subject: BTreeMap<Option<i32>, Vec<Decimal>> = BTreeMap::new();
    let mut all = Vec::new();
    for (subject_id, marks, total) in results {
        let p = percentage(marks, total);
        all.push(p);
        by_subject.entry(subject_id).or_default().push(p);
    }
    let per_subject = by_subject
        .into_iter()
        .map(|(subject_id, ps)| (subject_id, average(&ps), ps.len()))
        .collect();
    (average(&all), per_subject)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_group_by_subject() {
        let (overall, per_subject) = result_averages([
            (Some(2), Decimal::from(80), 100),
            (Some(1), Decimal::from(45), 50),
            (Some(2), Decimal::from(60), 100),
            (None, Decimal::from(10), 20),
        ]);
        assert_eq!(overall, Decimal::new(7000, 2));
        assert_eq!(
            per_subject,
            vec![
                (None, Decimal::from(50), 1),
                (Some(1), Decimal::from(90), 1),
                (Some(2), Decimal::from(70), 2),
            ]
        );
    }

    #[test]
    fn no_results_average_zero() {
        let (overall, per_subject) = result_averages(Vec::new());
        assert_eq!(overall, Decimal::ZERO);
        assert!(per_subject.is_empty());
    }
}
