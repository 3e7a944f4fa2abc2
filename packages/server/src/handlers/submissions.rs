use axum::Json;
use axum::extract::{Path, Query, State};
use common::{Capability, Grade};
use sea_orm::*;
use tracing::instrument;

use super::attendance::acting_teacher;
use crate::entity::{assignment, submission};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::assignment::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{find, find_visible};
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Submissions",
    operation_id = "listSubmissions",
    summary = "List submissions",
    description = "Students see only their own submissions.",
    params(SubmissionListQuery),
    responses(
        (status = 200, description = "Submissions, newest first", body = Page<SubmissionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<SubmissionListQuery>,
) -> Result<Json<Page<SubmissionResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (scope, mut select) = visible::<submission::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(assignment_id) = query.assignment_id {
        select = select.filter(submission::Column::AssignmentId.eq(assignment_id));
    }
    if let Some(student_id) = query.student_id {
        select = select.filter(submission::Column::StudentId.eq(student_id));
    }
    match query.graded {
        Some(true) => select = select.filter(submission::Column::MarksObtained.is_not_null()),
        Some(false) => select = select.filter(submission::Column::MarksObtained.is_null()),
        None => {}
    }

    let select = select.order_by_desc(submission::Column::SubmittedAt);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(SubmissionResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Submissions",
    operation_id = "getSubmission",
    summary = "Get a submission",
    params(("id" = i32, Path, description = "Submission ID")),
    responses(
        (status = 200, description = "Submission", body = SubmissionResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<SubmissionResponse>, AppError> {
    let model =
        find_visible::<submission::Entity, _>(&state.db, &auth_user.actor, id, "Submission")
            .await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/grade",
    tag = "Submissions",
    operation_id = "gradeSubmission",
    summary = "Grade a submission",
    description = "Teachers and admins. Regrading overwrites the previous marks.",
    params(("id" = i32, Path, description = "Submission ID")),
    request_body = GradeSubmissionRequest,
    responses(
        (status = 200, description = "Submission graded", body = GradedSubmissionResponse),
        (status = 400, description = "Marks out of range (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Teacher profile missing (PROFILE_MISSING)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn grade_submission(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<GradeSubmissionRequest>,
) -> Result<Json<GradedSubmissionResponse>, AppError> {
    auth_user.require(Capability::GradeSubmission)?;
    let graded_by = acting_teacher(&auth_user)?;

    let existing = find::<submission::Entity, _>(&state.db, id, "Submission").await?;
    let assignment =
        find::<assignment::Entity, _>(&state.db, existing.assignment_id, "Assignment").await?;
    validate_grade(&payload, assignment.total_marks)?;

    let mut active: submission::ActiveModel = existing.into();
    active.marks_obtained = Set(Some(payload.marks_obtained));
    if payload.remarks.is_some() {
        active.remarks = Set(payload.remarks);
    }
    active.graded_at = Set(Some(chrono::Utc::now()));
    active.graded_by = Set(graded_by);

    let model = active.update(&state.db).await?;
    let grade = Grade::from_marks(payload.marks_obtained, assignment.total_marks);
    tracing::info!(submission_id = model.id, %grade, "Submission graded");

    Ok(Json(GradedSubmissionResponse {
        submission: model.into(),
        grade,
    }))
}
