use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::enums::MeetingStatus;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// A scheduled meeting whose start still lies ahead of `now`.
pub fn meeting_is_upcoming(
    status: MeetingStatus,
    date: NaiveDate,
    start_time: NaiveTime,
    now: NaiveDateTime,
) -> bool {
    status == MeetingStatus::Scheduled && date.and_time(start_time) > now
}

pub fn meeting_is_today(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

/// Human readable length such as `1h 30m` or `45m`.
///
/// An end time before the start is treated as running past midnight.
pub fn meeting_duration(start_time: NaiveTime, end_time: NaiveTime) -> String {
    let start = start_time.num_seconds_from_midnight();
    let end = end_time.num_seconds_from_midnight();
    let seconds = (end + SECONDS_PER_DAY - start) % SECONDS_PER_DAY;

    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    #[test]
    fn duration_labels() {
        assert_eq!(meeting_duration(t(9, 0), t(10, 30)), "1h 30m");
        assert_eq!(meeting_duration(t(9, 0), t(9, 45)), "45m");
        assert_eq!(meeting_duration(t(9, 0), t(11, 0)), "2h 0m");
        assert_eq!(meeting_duration(t(9, 0), t(9, 0)), "0m");
    }

    #[test]
    fn duration_wraps_past_midnight() {
        assert_eq!(meeting_duration(t(23, 30), t(0, 15)), "45m");
    }

    #[test]
    fn upcoming_requires_scheduled_and_future_start() {
        let now = d(10).and_time(t(12, 0));
        assert!(meeting_is_upcoming(MeetingStatus::Scheduled, d(10), t(13, 0), now));
        assert!(!meeting_is_upcoming(MeetingStatus::Scheduled, d(10), t(11, 0), now));
        assert!(!meeting_is_upcoming(MeetingStatus::Cancelled, d(11), t(9, 0), now));
        assert!(!meeting_is_upcoming(MeetingStatus::Ongoing, d(11), t(9, 0), now));
    }

    #[test]
    fn today_compares_dates_only() {
        assert!(meeting_is_today(d(10), d(10)));
        assert!(!meeting_is_today(d(11), d(10)));
    }
}
