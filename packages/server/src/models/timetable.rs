use chrono::NaiveTime;
use common::Weekday;
use serde::{Deserialize, Serialize};

use super::shared::double_option;
use crate::entity::timetable;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateTimetableRequest {
    pub classroom_id: i32,
    pub subject_id: i32,
    pub teacher_id: Option<i32>,
    pub weekday: Weekday,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "09:45:00")]
    pub end_time: NaiveTime,
    pub room_number: Option<String>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateTimetableRequest {
    pub subject_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub teacher_id: Option<Option<i32>>,
    pub weekday: Option<Weekday>,
    #[schema(value_type = Option<String>)]
    pub start_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>)]
    pub end_time: Option<NaiveTime>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub room_number: Option<Option<String>>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TimetableListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub classroom_id: Option<i32>,
    pub teacher_id: Option<i32>,
    pub weekday: Option<Weekday>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TimetableResponse {
    pub id: i32,
    pub classroom_id: i32,
    pub subject_id: i32,
    pub teacher_id: Option<i32>,
    pub weekday: Weekday,
    #[schema(value_type = String)]
    pub start_time: NaiveTime,
    #[schema(value_type = String)]
    pub end_time: NaiveTime,
    pub room_number: Option<String>,
}

impl From<timetable::Model> for TimetableResponse {
    fn from(m: timetable::Model) -> Self {
        Self {
            id: m.id,
            classroom_id: m.classroom_id,
            subject_id: m.subject_id,
            teacher_id: m.teacher_id,
            weekday: m.weekday,
            start_time: m.start_time,
            end_time: m.end_time,
            room_number: m.room_number,
        }
    }
}

pub fn validate_slot(start: NaiveTime, end: NaiveTime) -> Result<(), AppError> {
    if end <= start {
        return Err(AppError::Validation(
            "End time must be after start time".into(),
        ));
    }
    Ok(())
}

/// `CASE` expression ranking weekdays Monday first, for `ORDER BY`.
pub fn weekday_rank_sql() -> String {
    let arms: String = Weekday::ALL
        .iter()
        .map(|d| format!(" WHEN '{}' THEN {}", d.as_str(), d.index()))
        .collect();
    format!(r#"CASE "timetable"."weekday"{arms} END"#)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn slot_must_end_after_it_starts() {
        assert!(validate_slot(t(9, 0), t(9, 0)).is_err());
        assert!(validate_slot(t(9, 45), t(9, 0)).is_err());
        assert!(validate_slot(t(9, 0), t(9, 45)).is_ok());
    }

    #[test]
    fn weekday_rank_starts_on_monday() {
        let sql = weekday_rank_sql();
        assert!(sql.starts_with(r#"CASE "timetable"."weekday" WHEN 'monday' THEN 0"#));
        assert!(sql.ends_with("WHEN 'saturday' THEN 5 END"));
    }
}
