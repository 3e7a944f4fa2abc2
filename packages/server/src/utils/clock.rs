use chrono::{NaiveDate, NaiveDateTime, Utc};

/// Current UTC date. All "today" comparisons go through here.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Current UTC wall-clock time without zone.
pub fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}
