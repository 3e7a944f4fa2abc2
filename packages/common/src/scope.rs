//! Role-scoped visibility.
//!
//! [`scope_for`] decides, from the resource kind and the acting user alone,
//! which rows a listing may return. The server lowers the resulting
//! [`Scope`] into a query condition for the matching table.

use crate::actor::Actor;
use crate::enums::{Audience, Role};

/// Listable record kinds that carry a role filter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Attendance,
    Notice,
    Assignment,
    Submission,
    Result,
    Exam,
    Timetable,
    LeaveApplication,
    Fee,
    Meeting,
    Event,
    BookIssue,
    Message,
}

/// Row filter for one resource.
///
/// Ownership variants name a profile or user id; which column they
/// compare against depends on the resource (e.g. `Teacher` is
/// `uploaded_by` for assignments but `created_by` for exams).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Every row.
    All,
    /// No row at all.
    Nothing,
    /// Rows belonging to this student profile.
    Student(i32),
    /// Rows owned by this teacher profile.
    Teacher(i32),
    /// Rows owned by this user account.
    User(i32),
    /// Rows addressed to this classroom.
    Classroom {
        classroom_id: i32,
        published_only: bool,
    },
    /// Active rows targeted at one of `audiences`.
    Audience {
        audiences: Vec<Audience>,
        /// Additionally require the publish date to have passed and the
        /// expiry date (if any) not to have.
        within_publish_window: bool,
    },
    /// Meetings the user is invited to, plus those they organise when
    /// `include_organized` is set.
    Meetings { user_id: i32, include_organized: bool },
}

impl Scope {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Scope::Nothing)
    }

    /// Whether a row owned by `student_id` is visible under this scope.
    ///
    /// Only meaningful for student-owned resources.
    pub fn admits_student(&self, student_id: i32) -> bool {
        match self {
            Scope::All => true,
            Scope::Student(id) => *id == student_id,
            _ => false,
        }
    }
}

fn own_student(actor: &Actor) -> Scope {
    actor.student_id().map_or(Scope::Nothing, Scope::Student)
}

fn own_teacher(actor: &Actor) -> Scope {
    actor.teacher_id().map_or(Scope::Nothing, Scope::Teacher)
}

fn own_classroom(actor: &Actor, published_only: bool) -> Scope {
    actor
        .classroom_id()
        .map_or(Scope::Nothing, |classroom_id| Scope::Classroom {
            classroom_id,
            published_only,
        })
}

fn audience(actor: &Actor, within_publish_window: bool) -> Scope {
    let audiences = match actor.role.audience() {
        Some(own) => vec![Audience::All, own],
        None => Audience::ALL.to_vec(),
    };
    Scope::Audience {
        audiences,
        within_publish_window,
    }
}

/// Visibility of `resource` for `actor`.
pub fn scope_for(resource: Resource, actor: &Actor) -> Scope {
    if actor.is_admin() {
        return match resource {
            Resource::Notice | Resource::Event => Scope::Audience {
                audiences: Audience::ALL.to_vec(),
                within_publish_window: false,
            },
            Resource::Meeting => Scope::Meetings {
                user_id: actor.user_id,
                include_organized: true,
            },
            Resource::Message => Scope::User(actor.user_id),
            _ => Scope::All,
        };
    }

    match (resource, actor.role) {
        (Resource::Meeting, _) => Scope::Meetings {
            user_id: actor.user_id,
            include_organized: false,
        },
        (Resource::Message, _) => Scope::User(actor.user_id),
        (Resource::Notice, Role::Student) => audience(actor, true),
        (Resource::Notice | Resource::Event, _) => audience(actor, false),

        (
            Resource::Attendance
            | Resource::Submission
            | Resource::Result
            | Resource::LeaveApplication
            | Resource::Fee
            | Resource::BookIssue,
            Role::Teacher,
        ) => Scope::All,
        (Resource::Assignment | Resource::Exam | Resource::Timetable, Role::Teacher) => {
            own_teacher(actor)
        }

        (
            Resource::Attendance
            | Resource::Submission
            | Resource::Result
            | Resource::Fee
            | Resource::BookIssue,
            Role::Student,
        ) => own_student(actor),
        (Resource::LeaveApplication, Role::Student) => Scope::User(actor.user_id),
        (Resource::Assignment | Resource::Timetable, Role::Student) => own_classroom(actor, false),
        (Resource::Exam, Role::Student) => own_classroom(actor, true),

        // Unreachable after the admin short-circuit; fail closed.
        (_, Role::Admin) => Scope::Nothing,
    }
}
