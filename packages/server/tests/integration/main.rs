mod common;

mod attendance;
mod auth;
mod coursework;
mod fees;
mod leaves;
mod library;
mod meetings;
mod messages;
mod scoping;
