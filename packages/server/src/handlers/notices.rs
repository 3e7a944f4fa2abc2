use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use common::capability::can_edit_authored;
use sea_orm::*;
use tracing::instrument;

use crate::entity::notice;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::notice::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::find_visible;
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

#[utoipa::path(
    get,
    path = "/",
    tag = "Notices",
    operation_id = "listNotices",
    summary = "List notices addressed to the caller",
    description = "Admins see every notice. Teachers see active notices for everyone or teachers. Students see active notices for everyone or students that are published and not expired.",
    params(NoticeListQuery),
    responses(
        (status = 200, description = "Notices, newest first", body = Page<NoticeResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_notices(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<NoticeListQuery>,
) -> Result<Json<Page<NoticeResponse>>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (_, mut select) = visible::<notice::Entity>(&auth_user.actor, clock::today());
    if let Some(target) = query.target_role {
        select = select.filter(notice::Column::TargetRole.eq(target));
    }

    let select = select
        .order_by_desc(notice::Column::PublishDate)
        .order_by_desc(notice::Column::Id);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(NoticeResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Notices",
    operation_id = "createNotice",
    summary = "Publish a notice",
    description = "Teachers and admins. The caller is recorded as the author.",
    request_body = CreateNoticeRequest,
    responses(
        (status = 201, description = "Notice created", body = NoticeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_notice(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNoticeRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::CreateNotice)?;
    validate_create_notice(&payload)?;

    let publish_date = payload.publish_date.unwrap_or_else(clock::today);
    validate_window(publish_date, payload.expiry_date)?;

    let now = chrono::Utc::now();
    let model = notice::ActiveModel {
        title: Set(payload.title.trim().to_string()),
        content: Set(payload.content),
        created_by: Set(Some(auth_user.user_id())),
        target_role: Set(payload.target_role),
        publish_date: Set(publish_date),
        expiry_date: Set(payload.expiry_date),
        is_active: Set(payload.is_active),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(NoticeResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Notices",
    operation_id = "getNotice",
    summary = "Get a notice",
    params(("id" = i32, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice", body = NoticeResponse),
        (status = 404, description = "Not found or not addressed to the caller (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_notice(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<NoticeResponse>, AppError> {
    let model =
        find_visible::<notice::Entity, _>(&state.db, &auth_user.actor, id, "Notice").await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Notices",
    operation_id = "updateNotice",
    summary = "Edit a notice",
    description = "Only the author or an admin. `is_active=false` withdraws the notice.",
    params(("id" = i32, Path, description = "Notice ID")),
    request_body = UpdateNoticeRequest,
    responses(
        (status = 200, description = "Notice updated", body = NoticeResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Notice not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_notice(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateNoticeRequest>,
) -> Result<Json<NoticeResponse>, AppError> {
    validate_update_notice(&payload)?;

    let existing =
        find_visible::<notice::Entity, _>(&state.db, &auth_user.actor, id, "Notice").await?;
    if !can_edit_authored(&auth_user.actor, existing.created_by) {
        return Err(AppError::PermissionDenied);
    }
    if payload == UpdateNoticeRequest::default() {
        return Ok(Json(existing.into()));
    }

    let publish = payload.publish_date.unwrap_or(existing.publish_date);
    let expiry = payload.expiry_date.unwrap_or(existing.expiry_date);
    validate_window(publish, expiry)?;

    let mut active: notice::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(target) = payload.target_role {
        active.target_role = Set(target);
    }
    active.publish_date = Set(publish);
    active.expiry_date = Set(expiry);
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}
