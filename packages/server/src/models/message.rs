use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::{Pagination, validate_text, validate_title};
use crate::entity::message;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SendMessageRequest {
    /// Receiving user account.
    pub recipient_id: i32,
    #[schema(example = "Parent meeting")]
    pub subject: String,
    pub body: String,
}

/// Replies go to the other party of the original message.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReplyMessageRequest {
    pub body: String,
    /// Defaults to `Re: <original subject>`.
    pub subject: Option<String>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MessageListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Only unread (inbox) messages.
    pub unread: Option<bool>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub id: i32,
    pub sender_id: i32,
    pub recipient_id: i32,
    pub subject: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub parent_message_id: Option<i32>,
}

impl From<message::Model> for MessageResponse {
    fn from(m: message::Model) -> Self {
        Self {
            id: m.id,
            sender_id: m.sender_id,
            recipient_id: m.recipient_id,
            subject: m.subject,
            body: m.body,
            sent_at: m.sent_at,
            is_read: m.is_read,
            read_at: m.read_at,
            parent_message_id: m.parent_message_id,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InboxResponse {
    pub data: Vec<MessageResponse>,
    pub pagination: Pagination,
    /// Unread messages across the whole inbox, not just this page.
    #[schema(example = 2)]
    pub unread_count: u64,
}

pub fn validate_send(req: &SendMessageRequest) -> Result<(), AppError> {
    validate_title(&req.subject)?;
    validate_text("Body", &req.body, 10_000)
}

pub fn validate_reply(req: &ReplyMessageRequest) -> Result<(), AppError> {
    if let Some(ref subject) = req.subject {
        validate_title(subject)?;
    }
    validate_text("Body", &req.body, 10_000)
}

/// `Re: ` prefixed once, however deep the thread goes.
pub fn reply_subject(original: &str) -> String {
    if original.starts_with("Re: ") {
        original.to_string()
    } else {
        format!("Re: {original}")
    }
}
