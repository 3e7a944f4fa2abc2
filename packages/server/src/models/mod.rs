pub mod assignment;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod event;
pub mod exam;
pub mod fee;
pub mod leave;
pub mod library;
pub mod meeting;
pub mod message;
pub mod notice;
pub mod people;
pub mod result;
pub mod school;
pub mod shared;
pub mod timetable;
pub mod user;
