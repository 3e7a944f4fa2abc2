pub mod assignment;
pub mod attendance;
pub mod book_issue;
pub mod classroom;
pub mod event;
pub mod exam;
pub mod fee;
pub mod leave_application;
pub mod library_book;
pub mod meeting;
pub mod meeting_participant;
pub mod message;
pub mod notice;
pub mod result;
pub mod student;
pub mod subject;
pub mod submission;
pub mod teacher;
pub mod teacher_subject;
pub mod timetable;
pub mod user;
