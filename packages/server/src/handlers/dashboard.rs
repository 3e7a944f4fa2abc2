use axum::Json;
use axum::extract::State;
use common::fee::{balance, is_outstanding};
use common::stats::attendance_percentage;
use sea_orm::*;
use tracing::instrument;

use super::students::attendance_counts;
use super::teachers::subjects_by_teacher;
use crate::entity::{assignment, classroom, fee, notice, result, student, subject, teacher, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::assignment::AssignmentResponse;
use crate::models::dashboard::*;
use crate::models::notice::NoticeResponse;
use crate::models::result::ResultResponse;
use crate::models::user::UserSummary;
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::scope::visible;

/// Items per dashboard section.
const RECENT: u64 = 5;

async fn recent_notices(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> Result<Vec<NoticeResponse>, AppError> {
    let (_, select) = visible::<notice::Entity>(&auth_user.actor, clock::today());
    let rows = select
        .order_by_desc(notice::Column::PublishDate)
        .order_by_desc(notice::Column::Id)
        .limit(RECENT)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(NoticeResponse::from).collect())
}

async fn student_dashboard(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> Result<StudentDashboard, AppError> {
    let recent_notices = recent_notices(db, auth_user).await?;
    let warning = auth_user.actor.profile_warning();

    let (scope, select) = visible::<assignment::Entity>(&auth_user.actor, clock::today());
    let assignments = if scope.is_nothing() {
        Vec::new()
    } else {
        let today = clock::today();
        select
            .filter(
                Condition::any()
                    .add(assignment::Column::DueDate.is_null())
                    .add(assignment::Column::DueDate.gte(today)),
            )
            .order_by_asc(assignment::Column::DueDate)
            .limit(RECENT)
            .all(db)
            .await?
            .into_iter()
            .map(|m| AssignmentResponse::new(m, today))
            .collect()
    };

    let recent_results = match auth_user.actor.student_id() {
        Some(student_id) => result::Entity::find()
            .filter(result::Column::StudentId.eq(student_id))
            .order_by_desc(result::Column::ExamDate)
            .limit(RECENT)
            .all(db)
            .await?
            .into_iter()
            .map(ResultResponse::from)
            .collect(),
        None => Vec::new(),
    };

    Ok(StudentDashboard {
        recent_notices,
        assignments,
        recent_results,
        warning,
    })
}

async fn teacher_dashboard(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> Result<TeacherDashboard, AppError> {
    let recent_notices = recent_notices(db, auth_user).await?;
    let Some(teacher_id) = auth_user.actor.teacher_id() else {
        return Ok(TeacherDashboard {
            recent_notices,
            assignments: Vec::new(),
            subjects: Vec::new(),
            warning: auth_user.actor.profile_warning(),
        });
    };

    let today = clock::today();
    let assignments = assignment::Entity::find()
        .filter(assignment::Column::UploadedBy.eq(teacher_id))
        .order_by_desc(assignment::Column::CreatedAt)
        .limit(RECENT)
        .all(db)
        .await?
        .into_iter()
        .map(|m| AssignmentResponse::new(m, today))
        .collect();
    let subjects = subjects_by_teacher(db, &[teacher_id])
        .await?
        .remove(&teacher_id)
        .unwrap_or_default();

    Ok(TeacherDashboard {
        recent_notices,
        assignments,
        subjects,
        warning: None,
    })
}

async fn admin_dashboard(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
) -> Result<AdminDashboard, AppError> {
    let active_students = student::Entity::find()
        .filter(student::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let active_teachers = teacher::Entity::find()
        .filter(teacher::Column::IsActive.eq(true))
        .count(db)
        .await?;
    let subjects = subject::Entity::find().count(db).await?;
    let classrooms = classroom::Entity::find().count(db).await?;

    let pending = user::Entity::find()
        .filter(user::Column::IsActive.eq(false))
        .order_by_asc(user::Column::CreatedAt)
        .limit(RECENT)
        .all(db)
        .await?;

    Ok(AdminDashboard {
        active_students,
        active_teachers,
        subjects,
        classrooms,
        recent_notices: recent_notices(db, auth_user).await?,
        pending_users: pending.iter().map(UserSummary::from).collect(),
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Dashboard",
    operation_id = "getDashboard",
    summary = "Landing page data for the caller's role",
    description = "The `role` field says which shape was returned. Missing profiles produce empty sections and a `warning`.",
    responses(
        (status = 200, description = "Dashboard", body = DashboardResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id()))]
pub async fn get_dashboard(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard = if auth_user.actor.is_admin() {
        DashboardResponse::Admin(admin_dashboard(&state.db, &auth_user).await?)
    } else if auth_user.actor.is_teacher() {
        DashboardResponse::Teacher(teacher_dashboard(&state.db, &auth_user).await?)
    } else {
        DashboardResponse::Student(student_dashboard(&state.db, &auth_user).await?)
    };
    Ok(Json(dashboard))
}

#[utoipa::path(
    get,
    path = "/student",
    tag = "Analytics",
    operation_id = "getStudentAnalytics",
    summary = "Performance overview of the calling student",
    responses(
        (status = 200, description = "Analytics", body = StudentAnalytics),
        (status = 403, description = "Not a student (PERMISSION_DENIED)", body = ErrorBody),
        (status = 422, description = "Student profile missing (PROFILE_MISSING)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id()))]
pub async fn student_analytics(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StudentAnalytics>, AppError> {
    let student_id = auth_user.require_student_profile()?;
    let (present, total) = attendance_counts(&state.db, student_id).await?;

    let results = result::Entity::find()
        .filter(result::Column::StudentId.eq(student_id))
        .all(&state.db)
        .await?;
    let (average_marks, per_subject) =
        result_averages(results.iter().map(|r| (r.subject_id, r.marks, r.total_marks)));

    let subject_ids: Vec<i32> = per_subject.iter().filter_map(|(id, _, _)| *id).collect();
    let names: std::collections::HashMap<i32, String> = if subject_ids.is_empty() {
        Default::default()
    } else {
        subject::Entity::find()
            .filter(subject::Column::Id.is_in(subject_ids))
            .all(&state.db)
            .await?
            .into_iter()
            .map(|s| (s.id, s.name))
            .collect()
    };
    let subject_averages = per_subject
        .into_iter()
        .map(|(subject_id, average_percentage, count)| SubjectAverage {
            subject_name: subject_id.and_then(|id| names.get(&id).cloned()),
            subject_id,
            average_percentage,
            results: count,
        })
        .collect();

    let fees = fee::Entity::find()
        .filter(fee::Column::StudentId.eq(student_id))
        .all(&state.db)
        .await?;
    let outstanding: Vec<&fee::Model> = fees
        .iter()
        .filter(|f| is_outstanding(f.payment_status))
        .collect();

    Ok(Json(StudentAnalytics {
        student_id,
        attendance_percentage: attendance_percentage(present, total),
        attendance_total: total,
        attendance_present: present,
        average_marks,
        subject_averages,
        pending_fees: outstanding.len() as u64,
        outstanding_balance: outstanding
            .iter()
            .map(|f| balance(f.amount, f.paid_amount))
            .sum(),
    }))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Site",
    operation_id = "getSite",
    summary = "Site header and title",
    description = "Public. Configured at startup.",
    responses(
        (status = 200, description = "Site branding", body = SiteResponse),
    ),
)]
pub async fn get_site(State(state): State<AppState>) -> Json<SiteResponse> {
    Json(SiteResponse {
        header: state.config.site.header.clone(),
        title: state.config.site.title.clone(),
    })
}
