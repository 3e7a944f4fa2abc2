use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::instrument;

use crate::entity::timetable;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Page, PageQuery, validate_text};
use crate::models::timetable::*;
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::{find, find_visible};
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

const SLOT_TAKEN: &str = "This classroom already has a lesson starting at that time";

#[utoipa::path(
    get,
    path = "/",
    tag = "Timetable",
    operation_id = "listTimetable",
    summary = "List timetable slots",
    description = "Teachers see the lessons they teach; students see their classroom's week. Ordered Monday first, then by start time.",
    params(TimetableListQuery),
    responses(
        (status = 200, description = "Timetable slots", body = Page<TimetableResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_timetable(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<TimetableListQuery>,
) -> Result<Json<Page<TimetableResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (scope, mut select) = visible::<timetable::Entity>(&auth_user.actor, clock::today());
    if scope.is_nothing() {
        return Ok(Json(Page::degraded(
            &page_query,
            auth_user.actor.profile_warning(),
        )));
    }

    if let Some(classroom_id) = query.classroom_id {
        select = select.filter(timetable::Column::ClassroomId.eq(classroom_id));
    }
    if let Some(teacher_id) = query.teacher_id {
        select = select.filter(timetable::Column::TeacherId.eq(teacher_id));
    }
    if let Some(weekday) = query.weekday {
        select = select.filter(timetable::Column::Weekday.eq(weekday));
    }

    let select = select
        .order_by(Expr::cust(weekday_rank_sql()), Order::Asc)
        .order_by_asc(timetable::Column::StartTime)
        .order_by_asc(timetable::Column::ClassroomId);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(TimetableResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Timetable",
    operation_id = "createTimetableSlot",
    summary = "Add a timetable slot",
    request_body = CreateTimetableRequest,
    responses(
        (status = 201, description = "Slot created", body = TimetableResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Slot taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(classroom_id = payload.classroom_id))]
pub async fn create_timetable_slot(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateTimetableRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_admin()?;
    validate_slot(payload.start_time, payload.end_time)?;
    if let Some(ref room) = payload.room_number {
        validate_text("Room number", room, 20)?;
    }

    let model = timetable::ActiveModel {
        classroom_id: Set(payload.classroom_id),
        subject_id: Set(payload.subject_id),
        teacher_id: Set(payload.teacher_id),
        weekday: Set(payload.weekday),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        room_number: Set(payload.room_number),
        ..Default::default()
    }
    .insert(&state.db)
    .await
    .map_err(AppError::on_conflict(SLOT_TAKEN))?;

    Ok((StatusCode::CREATED, Json(TimetableResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Timetable",
    operation_id = "getTimetableSlot",
    summary = "Get a timetable slot",
    params(("id" = i32, Path, description = "Timetable slot ID")),
    responses(
        (status = 200, description = "Slot", body = TimetableResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_timetable_slot(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<TimetableResponse>, AppError> {
    let model =
        find_visible::<timetable::Entity, _>(&state.db, &auth_user.actor, id, "Timetable slot")
            .await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Timetable",
    operation_id = "updateTimetableSlot",
    summary = "Move or reassign a timetable slot",
    params(("id" = i32, Path, description = "Timetable slot ID")),
    request_body = UpdateTimetableRequest,
    responses(
        (status = 200, description = "Slot updated", body = TimetableResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Slot not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slot taken (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_timetable_slot(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateTimetableRequest>,
) -> Result<Json<TimetableResponse>, AppError> {
    auth_user.require_admin()?;
    if let Some(Some(ref room)) = payload.room_number {
        validate_text("Room number", room, 20)?;
    }

    let existing = find::<timetable::Entity, _>(&state.db, id, "Timetable slot").await?;
    if payload == UpdateTimetableRequest::default() {
        return Ok(Json(existing.into()));
    }

    let start = payload.start_time.unwrap_or(existing.start_time);
    let end = payload.end_time.unwrap_or(existing.end_time);
    validate_slot(start, end)?;

    let mut active: timetable::ActiveModel = existing.into();
    if let Some(subject_id) = payload.subject_id {
        active.subject_id = Set(subject_id);
    }
    if let Some(teacher_id) = payload.teacher_id {
        active.teacher_id = Set(teacher_id);
    }
    if let Some(weekday) = payload.weekday {
        active.weekday = Set(weekday);
    }
    active.start_time = Set(start);
    active.end_time = Set(end);
    if let Some(room) = payload.room_number {
        active.room_number = Set(room);
    }

    let model = active
        .update(&state.db)
        .await
        .map_err(AppError::on_conflict(SLOT_TAKEN))?;
    Ok(Json(model.into()))
}
