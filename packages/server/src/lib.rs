pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "School Management API",
        version = "1.0.0",
        description = "Students, teachers, classes and the day-to-day records of a school"
    ),
    tags(
        (name = "Auth", description = "Registration, login and the current user"),
        (name = "Users", description = "Account administration and approval"),
        (name = "Students", description = "Student profiles and their records"),
        (name = "Teachers", description = "Teacher profiles and subject assignments"),
        (name = "Classrooms", description = "Class sections"),
        (name = "Subjects", description = "Subjects taught"),
        (name = "Attendance", description = "Daily and per-subject attendance"),
        (name = "Notices", description = "Announcements by audience"),
        (name = "Assignments", description = "Homework and submissions"),
        (name = "Submissions", description = "Submitted work and grading"),
        (name = "Results", description = "Exam marks and grades"),
        (name = "Timetable", description = "Weekly class schedule"),
        (name = "Exams", description = "Exam schedule"),
        (name = "Leaves", description = "Leave applications and review"),
        (name = "Fees", description = "Fees and payments"),
        (name = "Messages", description = "Direct messages between users"),
        (name = "Events", description = "School calendar"),
        (name = "Library", description = "Catalogue, loans and fines"),
        (name = "Meetings", description = "Meetings and participants"),
        (name = "Dashboard", description = "Role-specific landing data"),
        (name = "Analytics", description = "Student performance overview"),
        (name = "Site", description = "Public site branding"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    router
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api))
}
