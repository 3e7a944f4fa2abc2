use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use common::{Audience, EventType};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_text, validate_title};
use crate::entity::event;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Annual sports day")]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = Option<String>, example = "09:00:00")]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_audience")]
    pub target_audience: Audience,
}

fn default_audience() -> Audience {
    Audience::All
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<EventType>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub start_time: Option<Option<NaiveTime>>,
    pub location: Option<String>,
    pub target_audience: Option<Audience>,
    /// `false` hides the event from teachers and students.
    pub is_active: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub event_type: Option<EventType>,
    /// Events ending on or after this date.
    pub from: Option<NaiveDate>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct EventResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub event_type: EventType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    pub location: String,
    pub organized_by: Option<i32>,
    pub target_audience: Audience,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<event::Model> for EventResponse {
    fn from(m: event::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            description: m.description,
            event_type: m.event_type,
            start_date: m.start_date,
            end_date: m.end_date,
            start_time: m.start_time,
            location: m.location,
            organized_by: m.organized_by,
            target_audience: m.target_audience,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

pub fn validate_dates(start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::Validation(
            "End date must not be before the start date".into(),
        ));
    }
    Ok(())
}

pub fn validate_create_event(req: &CreateEventRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    if req.location.chars().count() > 200 {
        return Err(AppError::Validation(
            "Location must be at most 200 characters".into(),
        ));
    }
    validate_dates(req.start_date, req.end_date)
}

pub fn validate_update_event(req: &UpdateEventRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_title(title)?;
    }
    if let Some(ref location) = req.location {
        validate_text("Location", location, 200)?;
    }
    Ok(())
}
