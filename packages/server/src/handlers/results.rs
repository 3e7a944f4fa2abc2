use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use common::grade::resolve_grade;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{result, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::result::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{find, find_visible};
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Results",
    operation_id = "listResults",
    summary = "List exam results",
    description = "Students see only their own results.",
    params(ResultListQuery),
    responses(
        (status = 200, description = "Results, newest exam first", body = Page<ResultResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_results(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ResultListQuery>,
) -> Result<Json<Page<ResultResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (scope, mut select) = visible::<result::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(student_id) = query.student_id {
        select = select.filter(result::Column::StudentId.eq(student_id));
    }
    if let Some(subject_id) = query.subject_id {
        select = select.filter(result::Column::SubjectId.eq(subject_id));
    }
    if let Some(ref exam_name) = query.exam_name {
        select = select.filter(result::Column::ExamName.eq(exam_name.trim()));
    }

    let select = select
        .order_by_desc(result::Column::ExamDate)
        .order_by_asc(result::Column::StudentId);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(ResultResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Results",
    operation_id = "createResult",
    summary = "Record an exam result",
    description = "Teachers and admins. The grade is derived from the percentage unless given. One result per student, subject and exam.",
    request_body = CreateResultRequest,
    responses(
        (status = 201, description = "Result recorded", body = ResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate result (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_id = payload.student_id))]
pub async fn create_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateResultRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::WriteResult)?;
    validate_create_result(&payload)?;

    let student = find::<student::Entity, _>(&state.db, payload.student_id, "Student").await?;
    let grade = resolve_grade(
        payload.grade.as_deref(),
        None,
        payload.marks,
        payload.total_marks,
    );

    let now = chrono::Utc::now();
    let model = result::ActiveModel {
        student_id: Set(student.id),
        subject_id: Set(payload.subject_id),
        marks: Set(payload.marks),
        total_marks: Set(payload.total_marks),
        exam_name: Set(payload.exam_name.trim().to_string()),
        exam_date: Set(payload.exam_date),
        grade: Set(Some(grade)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict(
        "A result for this student, subject and exam already exists",
    ))?;

    Ok((StatusCode::CREATED, Json(ResultResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Results",
    operation_id = "getResult",
    summary = "Get a result",
    params(("id" = i32, Path, description = "Result ID")),
    responses(
        (status = 200, description = "Result", body = ResultResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ResultResponse>, AppError> {
    let model =
        find_visible::<result::Entity, _>(&state.db, &auth_user.actor, id, "Result").await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Results",
    operation_id = "updateResult",
    summary = "Correct a result",
    description = "An existing grade is kept when marks change. Send `grade: null` to have it derived again.",
    params(("id" = i32, Path, description = "Result ID")),
    request_body = UpdateResultRequest,
    responses(
        (status = 200, description = "Result updated", body = ResultResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Result not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Duplicate result (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_result(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateResultRequest>,
) -> Result<Json<ResultResponse>, AppError> {
    auth_user.require(Capability::WriteResult)?;
    validate_update_result(&payload)?;

    let existing = find::<result::Entity, _>(&state.db, id, "Result").await?;
    if payload == UpdateResultRequest::default() {
        return Ok(Json(existing.into()));
    }

    let marks = payload.marks.unwrap_or(existing.marks);
    let total_marks = payload.total_marks.unwrap_or(existing.total_marks);
    let (explicit, kept) = match payload.grade {
        Some(Some(ref g)) => (Some(g.as_str()), None),
        Some(None) => (None, None),
        None => (None, existing.grade.as_deref()),
    };
    let grade = resolve_grade(explicit, kept, marks, total_marks);

    let mut active: result::ActiveModel = existing.into();
    active.marks = Set(marks);
    active.total_marks = Set(total_marks);
    if let Some(exam_name) = payload.exam_name {
        active.exam_name = Set(exam_name.trim().to_string());
    }
    if let Some(exam_date) = payload.exam_date {
        active.exam_date = Set(exam_date);
    }
    active.grade = Set(Some(grade));
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await.map_err(AppError::on_conflict(
        "A result for this student, subject and exam already exists",
    ))?;
    Ok(Json(model.into()))
}
