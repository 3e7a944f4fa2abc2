use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use common::meeting::{meeting_duration, meeting_is_today, meeting_is_upcoming};
use common::{MeetingStatus, MeetingType};
use serde::{Deserialize, Serialize};

use super::shared::{double_option, validate_text, validate_title};
use crate::entity::meeting;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateMeetingRequest {
    #[schema(example = "Term planning")]
    pub title: String,
    pub meeting_type: MeetingType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub topic: String,
    pub meeting_date: NaiveDate,
    #[schema(value_type = String, example = "14:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "15:30:00")]
    pub end_time: NaiveTime,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub is_virtual: bool,
    pub meeting_link: Option<String>,
    /// Invited user accounts. The organiser is not a participant.
    #[serde(default)]
    pub participant_ids: Vec<i32>,
}

/// Only the organiser edits a meeting, and only these fields.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateMeetingRequest {
    pub status: Option<MeetingStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub meeting_notes: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub action_items: Option<Option<String>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MeetingListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub status: Option<MeetingStatus>,
    pub meeting_type: Option<MeetingType>,
    /// Meetings on or after this date.
    pub from: Option<NaiveDate>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MeetingResponse {
    pub id: i32,
    pub title: String,
    pub meeting_type: MeetingType,
    pub description: String,
    pub topic: String,
    pub meeting_date: NaiveDate,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    /// e.g. `1h 30m`.
    #[schema(example = "1h 30m")]
    pub duration: String,
    pub location: String,
    pub organized_by: i32,
    pub participant_ids: Vec<i32>,
    pub status: MeetingStatus,
    pub is_virtual: bool,
    pub meeting_link: Option<String>,
    pub meeting_notes: Option<String>,
    pub action_items: Option<String>,
    pub is_upcoming: bool,
    pub is_today: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MeetingResponse {
    pub fn new(m: meeting::Model, participant_ids: Vec<i32>, now: NaiveDateTime) -> Self {
        Self {
            duration: meeting_duration(m.start_time, m.end_time),
            is_upcoming: meeting_is_upcoming(m.status, m.meeting_date, m.start_time, now),
            is_today: meeting_is_today(m.meeting_date, now.date()),
            participant_ids,
            id: m.id,
            title: m.title,
            meeting_type: m.meeting_type,
            description: m.description,
            topic: m.topic,
            meeting_date: m.meeting_date,
            start_time: m.start_time,
            end_time: m.end_time,
            location: m.location,
            organized_by: m.organized_by,
            status: m.status,
            is_virtual: m.is_virtual,
            meeting_link: m.meeting_link,
            meeting_notes: m.meeting_notes,
            action_items: m.action_items,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Everything the meetings page shows for the caller.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeetingPortalResponse {
    pub organized: Vec<MeetingResponse>,
    pub invited: Vec<MeetingResponse>,
    pub upcoming: Vec<MeetingResponse>,
    pub today: Vec<MeetingResponse>,
    /// Whether the caller may schedule meetings.
    pub can_create: bool,
}

pub fn validate_create_meeting(req: &CreateMeetingRequest) -> Result<(), AppError> {
    validate_title(&req.title)?;
    if req.start_time == req.end_time {
        return Err(AppError::Validation(
            "A meeting must end after it starts".into(),
        ));
    }
    if req.is_virtual {
        match req.meeting_link {
            Some(ref link) => validate_text("Meeting link", link, 500)?,
            None => {
                return Err(AppError::Validation(
                    "Virtual meetings need a meeting link".into(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(is_virtual: bool, link: Option<&str>) -> CreateMeetingRequest {
        CreateMeetingRequest {
            title: "Staff briefing".into(),
            meeting_type: MeetingType::Staff,
            description: String::new(),
            topic: String::new(),
            meeting_date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            location: "Room 4".into(),
            is_virtual,
            meeting_link: link.map(str::to_string),
            participant_ids: vec![],
        }
    }

    #[test]
    fn virtual_meeting_needs_link() {
        assert!(validate_create_meeting(&request(true, None)).is_err());
        assert!(validate_create_meeting(&request(true, Some("https://meet.example/abc"))).is_ok());
        assert!(validate_create_meeting(&request(false, None)).is_ok());
    }

    #[test]
    fn zero_length_meeting_is_rejected() {
        let mut req = request(false, None);
        req.end_time = req.start_time;
        assert!(validate_create_meeting(&req).is_err());
    }

    #[test]
    fn notes_can_be_cleared() {
        let req: UpdateMeetingRequest =
            serde_json::from_str(r#"{"meeting_notes": null}"#).unwrap();
        assert_eq!(req.meeting_notes, Some(None));
        assert_eq!(req.action_items, None);
    }
}
