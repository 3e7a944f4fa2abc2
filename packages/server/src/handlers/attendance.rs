use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{attendance, student};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::attendance::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{find, find_visible};
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

/// Teacher profile to stamp on a write, `None` for administrators.
pub(crate) fn acting_teacher(auth_user: &AuthUser) -> Result<Option<i32>, AppError> {
    if auth_user.actor.is_teacher() && !auth_user.actor.is_admin() {
        auth_user.require_teacher_profile().map(Some)
    } else {
        Ok(auth_user.actor.teacher_id())
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Attendance",
    operation_id = "listAttendance",
    summary = "List attendance records",
    description = "Students see only their own records; staff see all.",
    params(AttendanceListQuery),
    responses(
        (status = 200, description = "Attendance, newest first", body = Page<AttendanceResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<AttendanceListQuery>,
) -> Result<Json<Page<AttendanceResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (scope, mut select) = visible::<attendance::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(student_id) = query.student_id {
        select = select.filter(attendance::Column::StudentId.eq(student_id));
    }
    if let Some(subject_id) = query.subject_id {
        select = select.filter(attendance::Column::SubjectId.eq(subject_id));
    }
    if let Some(date) = query.date {
        select = select.filter(attendance::Column::Date.eq(date));
    }
    if let Some(status) = query.status {
        select = select.filter(attendance::Column::Status.eq(status));
    }

    let select = select
        .order_by_desc(attendance::Column::Date)
        .order_by_asc(attendance::Column::StudentId);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(AttendanceResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Attendance",
    operation_id = "markAttendance",
    summary = "Mark attendance for a student",
    description = "Teachers and admins. One mark per student, date and subject; a whole-day mark omits the subject.",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already marked (CONFLICT)", body = ErrorBody),
        (status = 422, description = "Teacher profile missing (PROFILE_MISSING)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(student_id = payload.student_id))]
pub async fn mark_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<MarkAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::MarkAttendance)?;
    validate_remarks(payload.remarks.as_deref())?;
    let marked_by = acting_teacher(&auth_user)?;

    let student = find::<student::Entity, _>(&state.db, payload.student_id, "Student").await?;

    let model = attendance::ActiveModel {
        student_id: Set(student.id),
        subject_id: Set(payload.subject_id),
        date: Set(payload.date.unwrap_or_else(clock::today)),
        status: Set(payload.status),
        marked_by: Set(marked_by),
        remarks: Set(payload.remarks),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict(
        "Attendance already marked for this student, date and subject",
    ))?;

    Ok((StatusCode::CREATED, Json(AttendanceResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Attendance",
    operation_id = "getAttendance",
    summary = "Get an attendance record",
    params(("id" = i32, Path, description = "Attendance ID")),
    responses(
        (status = 200, description = "Attendance record", body = AttendanceResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<AttendanceResponse>, AppError> {
    let model =
        find_visible::<attendance::Entity, _>(&state.db, &auth_user.actor, id, "Attendance")
            .await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Attendance",
    operation_id = "updateAttendance",
    summary = "Correct an attendance mark",
    params(("id" = i32, Path, description = "Attendance ID")),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Attendance updated", body = AttendanceResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Attendance not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_attendance(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateAttendanceRequest>,
) -> Result<Json<AttendanceResponse>, AppError> {
    auth_user.require(Capability::MarkAttendance)?;
    if let Some(Some(ref remarks)) = payload.remarks {
        validate_remarks(Some(remarks))?;
    }

    let existing = find::<attendance::Entity, _>(&state.db, id, "Attendance").await?;
    if payload == UpdateAttendanceRequest::default() {
        return Ok(Json(existing.into()));
    }
    let marked_by = acting_teacher(&auth_user)?;

    let mut active: attendance::ActiveModel = existing.into();
    if let Some(status) = payload.status {
        active.status = Set(status);
    }
    if let Some(remarks) = payload.remarks {
        active.remarks = Set(remarks);
    }
    if marked_by.is_some() {
        active.marked_by = Set(marked_by);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}
