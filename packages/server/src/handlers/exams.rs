use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use sea_orm::*;
use tracing::instrument;

use super::attendance::acting_teacher;
use crate::entity::exam;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::exam::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::find_visible;
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Exams",
    operation_id = "listExams",
    summary = "List exams",
    description = "Teachers see exams they scheduled; students see published exams for their classroom.",
    params(ExamListQuery),
    responses(
        (status = 200, description = "Exams by date", body = Page<ExamResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_exams(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ExamListQuery>,
) -> Result<Json<Page<ExamResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (scope, mut select) = visible::<exam::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(subject_id) = query.subject_id {
        select = select.filter(exam::Column::SubjectId.eq(subject_id));
    }
    if let Some(classroom_id) = query.classroom_id {
        select = select.filter(exam::Column::ClassroomId.eq(classroom_id));
    }
    if let Some(exam_type) = query.exam_type {
        select = select.filter(exam::Column::ExamType.eq(exam_type));
    }
    if let Some(from) = query.from {
        select = select.filter(exam::Column::Date.gte(from));
    }

    let select = select
        .order_by_asc(exam::Column::Date)
        .order_by_asc(exam::Column::StartTime);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(ExamResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Exams",
    operation_id = "createExam",
    summary = "Schedule an exam",
    description = "Teachers and admins. A teacher is recorded as the exam's creator.",
    request_body = CreateExamRequest,
    responses(
        (status = 201, description = "Exam created", body = ExamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 422, description = "Teacher profile missing (PROFILE_MISSING)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_exam(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::CreateExam)?;
    validate_create_exam(&payload)?;
    let created_by = acting_teacher(&auth_user)?;

    let model = exam::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        exam_type: Set(payload.exam_type),
        subject_id: Set(payload.subject_id),
        classroom_id: Set(payload.classroom_id),
        date: Set(payload.date),
        start_time: Set(payload.start_time),
        duration: Set(payload.duration),
        total_marks: Set(payload.total_marks),
        instructions: Set(payload.instructions),
        created_by: Set(created_by),
        is_published: Set(payload.is_published),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict("Exam already exists"))?;

    Ok((StatusCode::CREATED, Json(ExamResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Exams",
    operation_id = "getExam",
    summary = "Get an exam",
    params(("id" = i32, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam", body = ExamResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_exam(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ExamResponse>, AppError> {
    let model = find_visible::<exam::Entity, _>(&state.db, &auth_user.actor, id, "Exam").await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Exams",
    operation_id = "updateExam",
    summary = "Edit or publish an exam",
    description = "Only the teacher who scheduled it, or an admin.",
    params(("id" = i32, Path, description = "Exam ID")),
    request_body = UpdateExamRequest,
    responses(
        (status = 200, description = "Exam updated", body = ExamResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_exam(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateExamRequest>,
) -> Result<Json<ExamResponse>, AppError> {
    auth_user.require(Capability::CreateExam)?;
    validate_update_exam(&payload)?;

    let existing =
        find_visible::<exam::Entity, _>(&state.db, &auth_user.actor, id, "Exam").await?;
    let is_creator =
        existing.created_by.is_some() && existing.created_by == auth_user.actor.teacher_id();
    if !(auth_user.actor.is_admin() || is_creator) {
        return Err(AppError::PermissionDenied);
    }
    if payload == UpdateExamRequest::default() {
        return Ok(Json(existing.into()));
    }

    let mut active: exam::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(exam_type) = payload.exam_type {
        active.exam_type = Set(exam_type);
    }
    if let Some(date) = payload.date {
        active.date = Set(date);
    }
    if let Some(start_time) = payload.start_time {
        active.start_time = Set(start_time);
    }
    if let Some(duration) = payload.duration {
        active.duration = Set(duration);
    }
    if let Some(total) = payload.total_marks {
        active.total_marks = Set(total);
    }
    if let Some(instructions) = payload.instructions {
        active.instructions = Set(instructions);
    }
    if let Some(published) = payload.is_published {
        active.is_published = Set(published);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}
