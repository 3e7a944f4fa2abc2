pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod events;
pub mod exams;
pub mod fees;
pub mod leaves;
pub mod library;
pub mod meetings;
pub mod messages;
pub mod notices;
pub mod results;
pub mod school;
pub mod students;
pub mod submissions;
pub mod teachers;
pub mod timetable;
pub mod users;
