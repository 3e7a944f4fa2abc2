use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{assignment, submission};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::assignment::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::find_visible;
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Assignments",
    operation_id = "listAssignments",
    summary = "List assignments",
    description = "Teachers see the assignments they set; students see those for their classroom; admins see all.",
    params(AssignmentListQuery),
    responses(
        (status = 200, description = "Assignments, newest first", body = Page<AssignmentResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_assignments(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AssignmentListQuery>,
) -> Result<Json<Page<AssignmentResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (scope, mut select) = visible::<assignment::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(subject_id) = query.subject_id {
        select = select.filter(assignment::Column::SubjectId.eq(subject_id));
    }
    if let Some(classroom_id) = query.classroom_id {
        select = select.filter(assignment::Column::ClassroomId.eq(classroom_id));
    }

    let select = select.order_by_desc(assignment::Column::CreatedAt);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    let today = clock::today();
    Ok(Json(Page::new(
        rows.into_iter()
            .map(|m| AssignmentResponse::new(m, today))
            .collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Assignments",
    operation_id = "createAssignment",
    summary = "Set an assignment",
    description = "Teachers only. The caller's teacher profile is recorded as the uploader.",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 201, description = "Assignment created", body = AssignmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 422, description = "Teacher profile missing (PROFILE_MISSING)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::CreateAssignment)?;
    validate_create_assignment(&payload)?;
    let teacher_id = auth_user.require_teacher_profile()?;

    let now = chrono::Utc::now();
    let model = assignment::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        subject_id: Set(payload.subject_id),
        classroom_id: Set(payload.classroom_id),
        uploaded_by: Set(Some(teacher_id)),
        file: Set(payload.file),
        due_date: Set(payload.due_date),
        total_marks: Set(payload.total_marks),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict("Assignment already exists"))?;

    Ok((
        StatusCode::CREATED,
        Json(AssignmentResponse::new(model, clock::today())),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Assignments",
    operation_id = "getAssignment",
    summary = "Get an assignment",
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment", body = AssignmentResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AssignmentResponse>, AppError> {
    let model =
        find_visible::<assignment::Entity, _>(&state.db, &auth_user.actor, id, "Assignment")
            .await?;
    Ok(Json(AssignmentResponse::new(model, clock::today())))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Assignments",
    operation_id = "updateAssignment",
    summary = "Edit an assignment",
    description = "The teacher who set it, or an admin.",
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = UpdateAssignmentRequest,
    responses(
        (status = 200, description = "Assignment updated", body = AssignmentResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAssignmentRequest>,
) -> Result<Json<AssignmentResponse>, AppError> {
    validate_update_assignment(&payload)?;

    let existing =
        find_visible::<assignment::Entity, _>(&state.db, &auth_user.actor, id, "Assignment")
            .await?;
    let is_uploader = existing.uploaded_by.is_some()
        && existing.uploaded_by == auth_user.actor.teacher_id();
    if !(auth_user.actor.is_admin() || is_uploader) {
        return Err(AppError::PermissionDenied);
    }

    let now = chrono::Utc::now();
    if payload == UpdateAssignmentRequest::default() {
        return Ok(Json(AssignmentResponse::new(existing, clock::today())));
    }

    let mut active: assignment::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(subject_id) = payload.subject_id {
        active.subject_id = Set(subject_id);
    }
    if let Some(classroom_id) = payload.classroom_id {
        active.classroom_id = Set(classroom_id);
    }
    if let Some(file) = payload.file {
        active.file = Set(file);
    }
    if let Some(due_date) = payload.due_date {
        active.due_date = Set(due_date);
    }
    if let Some(total_marks) = payload.total_marks {
        active.total_marks = Set(total_marks);
    }
    active.updated_at = Set(now);

    let model = active
        .update(&state.db)
        .await
        .map_err(AppError::on_conflict("Assignment already exists"))?;
    Ok(Json(AssignmentResponse::new(model, clock::today())))
}

#[utoipa::path(
    get,
    path = "/{id}/submissions",
    tag = "Assignments",
    operation_id = "listAssignmentSubmissions",
    summary = "Submissions for an assignment",
    description = "Staff see every submission; a student sees only their own.",
    params(("id" = i32, Path, description = "Assignment ID"), PageQuery),
    responses(
        (status = 200, description = "Submissions, earliest first", body = Page<SubmissionResponse>),
        (status = 404, description = "Assignment not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(id))]
pub async fn list_assignment_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<SubmissionResponse>>, AppError> {
    let assignment =
        find_visible::<assignment::Entity, _>(&state.db, &auth_user.actor, id, "Assignment")
            .await?;

    let (scope, select) = visible::<submission::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &query,
            auth_user.actor.profile_warning(),
        )));
    }
    let select = select
        .filter(submission::Column::AssignmentId.eq(assignment.id))
        .order_by_asc(submission::Column::SubmittedAt);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(SubmissionResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/{id}/submissions",
    tag = "Assignments",
    operation_id = "submitAssignment",
    summary = "Submit work for an assignment",
    description = "Students only, once per assignment. Work arriving after the due date is flagged late.",
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = SubmitAssignmentRequest,
    responses(
        (status = 201, description = "Submission recorded", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Assignment not found or not visible (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already submitted (CONFLICT)", body = ErrorBody),
        (status = 422, description = "Student profile missing (PROFILE_MISSING)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn submit_assignment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<SubmitAssignmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::SubmitAssignment)?;
    validate_submit(&payload)?;
    let student_id = auth_user.require_student_profile()?;

    let assignment =
        find_visible::<assignment::Entity, _>(&state.db, &auth_user.actor, id, "Assignment")
            .await?;

    let now = chrono::Utc::now();
    let late = is_late(clock::today(), assignment.due_date);
    let model = submission::ActiveModel {
        assignment_id: Set(assignment.id),
        student_id: Set(student_id),
        file: Set(payload.file.trim().to_string()),
        submitted_at: Set(now),
        remarks: Set(payload.remarks),
        is_late: Set(late),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict(
        "You have already submitted this assignment",
    ))?;

    tracing::info!(submission_id = model.id, is_late = late, "Assignment submitted");
    Ok((StatusCode::CREATED, Json(SubmissionResponse::from(model))))
}
