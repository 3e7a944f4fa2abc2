use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use sea_orm::*;
use tracing::instrument;

use crate::entity::event;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::event::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::find_visible;
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Events",
    operation_id = "listEvents",
    summary = "List school events",
    description = "Teachers and students see active events aimed at them or at everyone.",
    params(EventListQuery),
    responses(
        (status = 200, description = "Events by start date", body = Page<EventResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_events(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Page<EventResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (_, mut select) = visible::<event::Entity>(&auth_user.actor, clock::today());

    if let Some(event_type) = query.event_type {
        select = select.filter(event::Column::EventType.eq(event_type));
    }
    if let Some(from) = query.from {
        select = select.filter(event::Column::EndDate.gte(from));
    }

    let select = select
        .order_by_asc(event::Column::StartDate)
        .order_by_asc(event::Column::Id);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(EventResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Events",
    operation_id = "createEvent",
    summary = "Create an event",
    description = "Admin only. The caller is recorded as organiser.",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::ManageSchool)?;
    validate_create_event(&payload)?;

    let model = event::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        description: Set(payload.description),
        event_type: Set(payload.event_type),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        start_time: Set(payload.start_time),
        location: Set(payload.location.trim().to_string()),
        organized_by: Set(Some(auth_user.user_id())),
        target_audience: Set(payload.target_audience),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(EventResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Events",
    operation_id = "getEvent",
    summary = "Get an event",
    params(("id" = i32, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Event", body = EventResponse),
        (status = 404, description = "Not found or not visible (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<EventResponse>, AppError> {
    let model = find_visible::<event::Entity, _>(&state.db, &auth_user.actor, id, "Event").await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Events",
    operation_id = "updateEvent",
    summary = "Update or deactivate an event",
    description = "Admin only.",
    params(("id" = i32, Path, description = "Event ID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Event updated", body = EventResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Event not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_event(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateEventRequest>,
) -> Result<Json<EventResponse>, AppError> {
    auth_user.require(Capability::ManageSchool)?;
    validate_update_event(&payload)?;

    let existing = find_visible::<event::Entity, _>(&state.db, &auth_user.actor, id, "Event").await?;
    if payload == UpdateEventRequest::default() {
        return Ok(Json(existing.into()));
    }
    validate_dates(
        payload.start_date.unwrap_or(existing.start_date),
        payload.end_date.unwrap_or(existing.end_date),
    )?;

    let mut active: event::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(event_type) = payload.event_type {
        active.event_type = Set(event_type);
    }
    if let Some(start) = payload.start_date {
        active.start_date = Set(start);
    }
    if let Some(end) = payload.end_date {
        active.end_date = Set(end);
    }
    if let Some(start_time) = payload.start_time {
        active.start_time = Set(start_time);
    }
    if let Some(location) = payload.location {
        active.location = Set(location.trim().to_string());
    }
    if let Some(audience) = payload.target_audience {
        active.target_audience = Set(audience);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}
