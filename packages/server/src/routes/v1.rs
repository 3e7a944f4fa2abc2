use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::*;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/users", user_routes())
        .nest("/students", student_routes())
        .nest("/teachers", teacher_routes())
        .nest("/classrooms", classroom_routes())
        .nest("/subjects", subject_routes())
        .nest("/attendance", attendance_routes())
        .nest("/notices", notice_routes())
        .nest("/assignments", assignment_routes())
        .nest("/submissions", submission_routes())
        .nest("/results", result_routes())
        .nest("/timetable", timetable_routes())
        .nest("/exams", exam_routes())
        .nest("/leaves", leave_routes())
        .nest("/fees", fee_routes())
        .nest("/messages", message_routes())
        .nest("/events", event_routes())
        .nest("/library", library_routes())
        .nest("/meetings", meeting_routes())
        .nest("/dashboard", OpenApiRouter::new().routes(routes!(dashboard::get_dashboard)))
        .nest(
            "/analytics",
            OpenApiRouter::new().routes(routes!(dashboard::student_analytics)),
        )
        .nest("/site", OpenApiRouter::new().routes(routes!(dashboard::get_site)))
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(auth::register))
        .routes(routes!(auth::login))
        .routes(routes!(auth::me))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(users::list_users, users::create_user))
        .routes(routes!(users::get_user, users::update_user))
}

fn student_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(students::list_students, students::create_student))
        .routes(routes!(students::get_student, students::update_student))
        .routes(routes!(students::list_student_results))
        .routes(routes!(students::list_student_attendance))
        .routes(routes!(students::get_student_summary))
}

fn teacher_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(teachers::list_teachers, teachers::create_teacher))
        .routes(routes!(teachers::get_teacher, teachers::update_teacher))
        .routes(routes!(teachers::set_teacher_subjects))
}

fn classroom_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(school::list_classrooms, school::create_classroom))
        .routes(routes!(school::get_classroom, school::update_classroom))
        .routes(routes!(school::list_classroom_students))
}

fn subject_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(school::list_subjects, school::create_subject))
        .routes(routes!(school::get_subject, school::update_subject))
}

fn attendance_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(attendance::list_attendance, attendance::mark_attendance))
        .routes(routes!(attendance::get_attendance, attendance::update_attendance))
}

fn notice_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(notices::list_notices, notices::create_notice))
        .routes(routes!(notices::get_notice, notices::update_notice))
}

fn assignment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(assignments::list_assignments, assignments::create_assignment))
        .routes(routes!(assignments::get_assignment, assignments::update_assignment))
        .routes(routes!(
            assignments::list_assignment_submissions,
            assignments::submit_assignment
        ))
}

fn submission_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(submissions::list_submissions))
        .routes(routes!(submissions::get_submission))
        .routes(routes!(submissions::grade_submission))
}

fn result_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(results::list_results, results::create_result))
        .routes(routes!(results::get_result, results::update_result))
}

fn timetable_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(timetable::list_timetable, timetable::create_timetable_slot))
        .routes(routes!(
            timetable::get_timetable_slot,
            timetable::update_timetable_slot
        ))
}

fn exam_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(exams::list_exams, exams::create_exam))
        .routes(routes!(exams::get_exam, exams::update_exam))
}

fn leave_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(leaves::list_leaves, leaves::apply_leave))
        .routes(routes!(leaves::get_leave))
        .routes(routes!(leaves::review_leave))
}

fn fee_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(fees::list_fees, fees::create_fee))
        .routes(routes!(fees::get_fee, fees::update_fee))
        .routes(routes!(fees::record_payment))
}

fn message_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(messages::list_inbox, messages::send_message))
        .routes(routes!(messages::list_sent))
        .routes(routes!(messages::get_message))
        .routes(routes!(messages::reply_message))
}

fn event_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(events::list_events, events::create_event))
        .routes(routes!(events::get_event, events::update_event))
}

fn library_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(library::list_books, library::create_book))
        .routes(routes!(library::get_book, library::update_book))
        .routes(routes!(library::list_issues, library::issue_book))
        .routes(routes!(library::get_issue))
        .routes(routes!(library::return_book))
        .routes(routes!(library::my_books))
}

fn meeting_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(meetings::list_meetings, meetings::create_meeting))
        .routes(routes!(meetings::meeting_portal))
        .routes(routes!(meetings::get_meeting, meetings::update_meeting))
}
