use chrono::{DateTime, NaiveDate, Utc};
use common::Audience;
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_text, validate_title};
use crate::entity::notice;
use crate::error::AppError;

fn default_audience() -> Audience {
    Audience::All
}

fn default_true() -> bool {
    true
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateNoticeRequest {
    #[schema(example = "Sports day moved to Friday")]
    pub title: String,
    pub content: String,
    #[serde(default = "default_audience")]
    pub target_role: Audience,
    /// Defaults to today. Students only see the notice from this date.
    pub publish_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateNoticeRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub target_role: Option<Audience>,
    pub publish_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub expiry_date: Option<Option<NaiveDate>>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NoticeListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub target_role: Option<Audience>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NoticeResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_by: Option<i32>,
    pub target_role: Audience,
    pub publish_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<notice::Model> for NoticeResponse {
    fn from(m: notice::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            content: m.content,
            created_by: m.created_by,
            target_role: m.target_role,
            publish_date: m.publish_date,
            expiry_date: m.expiry_date,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

pub fn validate_window(publish: NaiveDate, expiry: Option<NaiveDate>) -> Result<(), AppError> {
    match expiry {
        Some(expiry) if expiry < publish => Err(AppError::Validation(
            "Expiry date must not be before the publish date".into(),
        )),
        _ => Ok(()),
    }
}

pub fn validate_create_notice(req: &CreateNoticeRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    validate_text("Content", &req.content, 10_000)?;
    Ok(())
}

pub fn validate_update_notice(req: &UpdateNoticeRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref content) = req.content {
        validate_text("Content", content, 10_000)?;
    }
    Ok(())
}
