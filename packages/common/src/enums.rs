//! String-backed enums shared by the API and the database layer.
//!
//! With the `sea-orm` feature enabled each enum derives `DeriveActiveEnum`
//! and can be used directly as an entity column.

#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error when parsing an unknown enum value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind} '{invalid}'. Valid values: {valid}")]
pub struct ParseEnumError {
    kind: &'static str,
    invalid: String,
    valid: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $value:tt, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
        #[cfg_attr(
            feature = "sea-orm",
            derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
            sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $value)]
                #[cfg_attr(feature = "sea-orm", sea_orm(string_value = $value))]
                $variant,
            )+
        }

        impl $name {
            /// All possible values, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        invalid: s.to_string(),
                        valid: $name::ALL
                            .iter()
                            .map(|v| v.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Access-control classifier of a user. Fixed at account creation.
    pub enum Role ("role") {
        Admin = "admin",
        Teacher = "teacher",
        Student = "student",
    }
}

string_enum! {
    /// Who a notice or event is addressed to.
    pub enum Audience ("audience") {
        All = "all",
        Teacher = "teacher",
        Student = "student",
    }
}

string_enum! {
    pub enum AttendanceStatus ("attendance status") {
        Present = "present",
        Absent = "absent",
        Leave = "leave",
    }
}

string_enum! {
    /// Review state of a leave application.
    pub enum LeaveStatus ("leave status") {
        Pending = "pending",
        Approved = "approved",
        Rejected = "rejected",
    }
}

string_enum! {
    pub enum PaymentStatus ("payment status") {
        Pending = "pending",
        Paid = "paid",
        Partial = "partial",
        Overdue = "overdue",
    }
}

string_enum! {
    pub enum FeeType ("fee type") {
        Tuition = "tuition",
        Library = "library",
        Lab = "lab",
        Sports = "sports",
        Exam = "exam",
        Transport = "transport",
        Other = "other",
    }
}

string_enum! {
    /// Meeting lifecycle. Only the organiser moves a meeting between states.
    pub enum MeetingStatus ("meeting status") {
        Scheduled = "scheduled",
        Ongoing = "ongoing",
        Completed = "completed",
        Cancelled = "cancelled",
    }
}

string_enum! {
    pub enum MeetingType ("meeting type") {
        Staff = "staff",
        Parent = "parent",
        Student = "student",
        General = "general",
    }
}

string_enum! {
    /// School days a timetable slot can fall on.
    pub enum Weekday ("weekday") {
        Monday = "monday",
        Tuesday = "tuesday",
        Wednesday = "wednesday",
        Thursday = "thursday",
        Friday = "friday",
        Saturday = "saturday",
    }
}

string_enum! {
    pub enum ExamType ("exam type") {
        Midterm = "midterm",
        Final = "final",
        Quiz = "quiz",
        Test = "test",
        Practical = "practical",
    }
}

string_enum! {
    pub enum EventType ("event type") {
        Academic = "academic",
        Sports = "sports",
        Cultural = "cultural",
        Holiday = "holiday",
        Meeting = "meeting",
        Exam = "exam",
        Other = "other",
    }
}

impl Role {
    /// The notice/event audience matching this role, if any.
    pub fn audience(&self) -> Option<Audience> {
        match self {
            Role::Admin => None,
            Role::Teacher => Some(Audience::Teacher),
            Role::Student => Some(Audience::Student),
        }
    }
}

impl Weekday {
    /// Position in the school week, Monday first.
    pub fn index(&self) -> usize {
        Weekday::ALL
            .iter()
            .position(|d| d == self)
            .unwrap_or(Weekday::ALL.len())
    }
}

impl LeaveStatus {
    /// Approved and rejected applications are never reviewed again.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LeaveStatus::Pending)
    }
}

impl Default for LeaveStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl Default for MeetingStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl Default for AttendanceStatus {
    fn default() -> Self {
        Self::Present
    }
}

impl Default for Audience {
    fn default() -> Self {
        Self::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parses_lowercase_names() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert!("Teacher".parse::<Role>().is_err());
    }

    #[test]
    fn parse_error_lists_valid_values() {
        let err = "weekly".parse::<PaymentStatus>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("payment status"));
        assert!(msg.contains("pending, paid, partial, overdue"));
    }

    #[test]
    fn serde_uses_the_stored_string() {
        let json = serde_json::to_string(&MeetingStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
        let parsed: Weekday = serde_json::from_str("\"friday\"").unwrap();
        assert_eq!(parsed, Weekday::Friday);
    }

    #[test]
    fn weekday_index_follows_the_school_week() {
        assert_eq!(Weekday::Monday.index(), 0);
        assert_eq!(Weekday::Saturday.index(), 5);
    }

    #[test]
    fn only_pending_leave_is_open() {
        assert!(!LeaveStatus::Pending.is_terminal());
        assert!(LeaveStatus::Approved.is_terminal());
        assert!(LeaveStatus::Rejected.is_terminal());
    }
}
