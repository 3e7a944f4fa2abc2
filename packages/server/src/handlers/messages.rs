use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Capability;
use common::message::ReadState;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{message, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::message::*;
use crate::models::shared::{Page, PageQuery};
use crate::state::AppState;
use crate::utils::clock;
use crate::utils::lookup::find;
use crate::utils::page::fetch_page;
use crate::utils::scope::visible;

/// A message the caller sent or received. Anything else is 404.
async fn find_own_message<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    id: i32,
) -> Result<message::Model, AppError> {
    message::Entity::find_by_id(id)
        .filter(
            Condition::any()
                .add(message::Column::SenderId.eq(user_id))
                .add(message::Column::RecipientId.eq(user_id)),
        )
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Message not found".into()))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Messages",
    operation_id = "listInbox",
    summary = "List received messages",
    description = "The caller's inbox, newest first, with the total unread count.",
    params(MessageListQuery),
    responses(
        (status = 200, description = "Inbox", body = InboxResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id()))]
pub async fn list_inbox(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<MessageListQuery>,
) -> Result<Json<InboxResponse>, AppError> {
    let page_query = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (_, inbox) = visible::<message::Entity>(&auth_user.actor, clock::today());

    let unread_count = inbox
        .clone()
        .filter(message::Column::IsRead.eq(false))
        .count(&state.db)
        .await?;

    let mut select = inbox;
    if query.unread == Some(true) {
        select = select.filter(message::Column::IsRead.eq(false));
    }
    let select = select
        .order_by_desc(message::Column::SentAt)
        .order_by_desc(message::Column::Id);
    let (rows, pagination) = fetch_page(&state.db, select, &page_query).await?;

    Ok(Json(InboxResponse {
        data: rows.into_iter().map(MessageResponse::from).collect(),
        pagination,
        unread_count,
    }))
}

#[utoipa::path(
    get,
    path = "/sent",
    tag = "Messages",
    operation_id = "listSentMessages",
    summary = "List sent messages",
    params(PageQuery),
    responses(
        (status = 200, description = "Sent messages, newest first", body = Page<MessageResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id()))]
pub async fn list_sent(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<MessageResponse>>, AppError> {
    let select = message::Entity::find()
        .filter(message::Column::SenderId.eq(auth_user.user_id()))
        .order_by_desc(message::Column::SentAt)
        .order_by_desc(message::Column::Id);
    let (rows, pagination) = fetch_page(&state.db, select, &query).await?;

    Ok(Json(Page::new(
        rows.into_iter().map(MessageResponse::from).collect(),
        pagination,
    )))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Messages",
    operation_id = "sendMessage",
    summary = "Send a message to another user",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Message sent", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Recipient not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(recipient_id = payload.recipient_id))]
pub async fn send_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<SendMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::SendMessage)?;
    validate_send(&payload)?;

    let recipient = find::<user::Entity, _>(&state.db, payload.recipient_id, "Recipient").await?;

    let model = message::ActiveModel {
        sender_id: Set(auth_user.user_id()),
        recipient_id: Set(recipient.id),
        subject: Set(payload.subject.trim().to_string()),
        body: Set(payload.body),
        sent_at: Set(chrono::Utc::now()),
        is_read: Set(false),
        read_at: Set(None),
        parent_message_id: Set(None),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Messages",
    operation_id = "getMessage",
    summary = "Read a message",
    description = "The recipient reading a message marks it read; `read_at` is set once.",
    params(("id" = i32, Path, description = "Message ID")),
    responses(
        (status = 200, description = "Message", body = MessageResponse),
        (status = 404, description = "Not found or not yours (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, AppError> {
    let model = find_own_message(&state.db, auth_user.user_id(), id).await?;
    if model.recipient_id != auth_user.user_id() {
        return Ok(Json(model.into()));
    }

    let mut read = ReadState {
        is_read: model.is_read,
        read_at: model.read_at.map(|t| t.naive_utc()),
    };
    if !read.mark_read(clock::now_naive()) {
        return Ok(Json(model.into()));
    }

    let mut active: message::ActiveModel = model.into();
    active.is_read = Set(read.is_read);
    active.read_at = Set(read.read_at.map(|t| t.and_utc()));
    let model = active.update(&state.db).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    post,
    path = "/{id}/reply",
    tag = "Messages",
    operation_id = "replyMessage",
    summary = "Reply to a message",
    params(("id" = i32, Path, description = "Message being replied to")),
    request_body = ReplyMessageRequest,
    responses(
        (status = 201, description = "Reply sent", body = MessageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Not found or not yours (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn reply_message(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReplyMessageRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require(Capability::SendMessage)?;
    validate_reply(&payload)?;

    let parent = find_own_message(&state.db, auth_user.user_id(), id).await?;
    let recipient_id = if parent.sender_id == auth_user.user_id() {
        parent.recipient_id
    } else {
        parent.sender_id
    };
    let subject = match payload.subject {
        Some(s) => s.trim().to_string(),
        None => reply_subject(&parent.subject),
    };

    let model = message::ActiveModel {
        sender_id: Set(auth_user.user_id()),
        recipient_id: Set(recipient_id),
        subject: Set(subject),
        body: Set(payload.body),
        sent_at: Set(chrono::Utc::now()),
        is_read: Set(false),
        read_at: Set(None),
        parent_message_id: Set(Some(parent.id)),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    Ok((StatusCode::CREATED, Json(MessageResponse::from(model))))
}
