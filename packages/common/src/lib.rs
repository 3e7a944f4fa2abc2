pub mod actor;
pub mod capability;
pub mod enums;
pub mod fee;
pub mod grade;
pub mod leave;
pub mod library;
pub mod meeting;
pub mod message;
pub mod scope;
pub mod stats;

pub use actor::{Actor, Profile};
pub use capability::Capability;
pub use enums::{
    AttendanceStatus, Audience, EventType, ExamType, FeeType, LeaveStatus, MeetingStatus,
    MeetingType, ParseEnumError, PaymentStatus, Role, Weekday,
};
pub use grade::Grade;
pub use scope::{Resource, Scope, scope_for};
