//! Lowering of [`common::Scope`] into sea-orm conditions.
//!
//! Each listable entity says which of its columns a scope variant compares
//! against. Variants that make no sense for an entity match no rows.

use chrono::NaiveDate;
use common::{Actor, Resource, Scope, scope_for};
use sea_orm::sea_query::Query as SeaQuery;
use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, Select};

use crate::entity::{
    assignment, attendance, book_issue, event, exam, fee, leave_application, meeting,
    meeting_participant, message, notice, result, submission, timetable,
};

/// An entity whose listings are filtered by role.
pub trait Scoped: EntityTrait {
    const RESOURCE: Resource;

    /// Row condition for `scope`. `today` bounds publish windows.
    fn condition(scope: &Scope, today: NaiveDate) -> Condition;
}

fn nothing(id: impl ColumnTrait) -> Condition {
    Condition::all().add(id.is_null())
}

fn everything() -> Condition {
    Condition::all()
}

/// `E::find()` restricted to what `actor` may see, plus the scope used.
pub fn visible<E: Scoped>(actor: &Actor, today: NaiveDate) -> (Scope, Select<E>) {
    let scope = scope_for(E::RESOURCE, actor);
    let select = E::find().filter(E::condition(&scope, today));
    (scope, select)
}

impl Scoped for attendance::Entity {
    const RESOURCE: Resource = Resource::Attendance;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Student(id) => Condition::all().add(attendance::Column::StudentId.eq(*id)),
            _ => nothing(attendance::Column::Id),
        }
    }
}

impl Scoped for submission::Entity {
    const RESOURCE: Resource = Resource::Submission;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Student(id) => Condition::all().add(submission::Column::StudentId.eq(*id)),
            _ => nothing(submission::Column::Id),
        }
    }
}

impl Scoped for result::Entity {
    const RESOURCE: Resource = Resource::Result;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Student(id) => Condition::all().add(result::Column::StudentId.eq(*id)),
            _ => nothing(result::Column::Id),
        }
    }
}

impl Scoped for fee::Entity {
    const RESOURCE: Resource = Resource::Fee;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Student(id) => Condition::all().add(fee::Column::StudentId.eq(*id)),
            _ => nothing(fee::Column::Id),
        }
    }
}

impl Scoped for book_issue::Entity {
    const RESOURCE: Resource = Resource::BookIssue;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Student(id) => Condition::all().add(book_issue::Column::StudentId.eq(*id)),
            _ => nothing(book_issue::Column::Id),
        }
    }
}

impl Scoped for leave_application::Entity {
    const RESOURCE: Resource = Resource::LeaveApplication;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::User(id) => {
                Condition::all().add(leave_application::Column::ApplicantId.eq(*id))
            }
            _ => nothing(leave_application::Column::Id),
        }
    }
}

impl Scoped for assignment::Entity {
    const RESOURCE: Resource = Resource::Assignment;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Teacher(id) => Condition::all().add(assignment::Column::UploadedBy.eq(*id)),
            Scope::Classroom { classroom_id, .. } => {
                Condition::all().add(assignment::Column::ClassroomId.eq(*classroom_id))
            }
            _ => nothing(assignment::Column::Id),
        }
    }
}

impl Scoped for exam::Entity {
    const RESOURCE: Resource = Resource::Exam;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Teacher(id) => Condition::all().add(exam::Column::CreatedBy.eq(*id)),
            Scope::Classroom {
                classroom_id,
                published_only,
            } => {
                let mut cond = Condition::all().add(exam::Column::ClassroomId.eq(*classroom_id));
                if *published_only {
                    cond = cond.add(exam::Column::IsPublished.eq(true));
                }
                cond
            }
            _ => nothing(exam::Column::Id),
        }
    }
}

impl Scoped for timetable::Entity {
    const RESOURCE: Resource = Resource::Timetable;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Teacher(id) => Condition::all().add(timetable::Column::TeacherId.eq(*id)),
            Scope::Classroom { classroom_id, .. } => {
                Condition::all().add(timetable::Column::ClassroomId.eq(*classroom_id))
            }
            _ => nothing(timetable::Column::Id),
        }
    }
}

impl Scoped for notice::Entity {
    const RESOURCE: Resource = Resource::Notice;

    fn condition(scope: &Scope, today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Audience {
                audiences,
                within_publish_window,
            } => {
                let mut cond = Condition::all()
                    .add(notice::Column::IsActive.eq(true))
                    .add(notice::Column::TargetRole.is_in(audiences.iter().copied()));
                if *within_publish_window {
                    cond = cond.add(notice::Column::PublishDate.lte(today)).add(
                        Condition::any()
                            .add(notice::Column::ExpiryDate.is_null())
                            .add(notice::Column::ExpiryDate.gte(today)),
                    );
                }
                cond
            }
            _ => nothing(notice::Column::Id),
        }
    }
}

impl Scoped for event::Entity {
    const RESOURCE: Resource = Resource::Event;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Audience { audiences, .. } => Condition::all()
                .add(event::Column::IsActive.eq(true))
                .add(event::Column::TargetAudience.is_in(audiences.iter().copied())),
            _ => nothing(event::Column::Id),
        }
    }
}

impl Scoped for message::Entity {
    const RESOURCE: Resource = Resource::Message;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::User(id) => Condition::all().add(message::Column::RecipientId.eq(*id)),
            _ => nothing(message::Column::Id),
        }
    }
}

impl Scoped for meeting::Entity {
    const RESOURCE: Resource = Resource::Meeting;

    fn condition(scope: &Scope, _today: NaiveDate) -> Condition {
        match scope {
            Scope::All => everything(),
            Scope::Meetings {
                user_id,
                include_organized,
            } => {
                let invited = meeting::Column::Id.in_subquery(
                    SeaQuery::select()
                        .column(meeting_participant::Column::MeetingId)
                        .from(meeting_participant::Entity)
                        .and_where(meeting_participant::Column::UserId.eq(*user_id))
                        .to_owned(),
                );
                let mut cond = Condition::any().add(invited);
                if *include_organized {
                    cond = cond.add(meeting::Column::OrganizedBy.eq(*user_id));
                }
                cond
            }
            _ => nothing(meeting::Column::Id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Profile, Role};
    use sea_orm::{DbBackend, QueryTrait};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn sql<E: Scoped>(actor: &Actor) -> String {
        let (_, select) = visible::<E>(actor, today());
        select.build(DbBackend::Postgres).to_string()
    }

    fn student() -> Actor {
        Actor::new(
            3,
            Role::Student,
            false,
            Some(Profile::Student {
                student_id: 30,
                classroom_id: Some(5),
            }),
        )
    }

    fn teacher() -> Actor {
        Actor::new(2, Role::Teacher, false, Some(Profile::Teacher { teacher_id: 20 }))
    }

    fn admin() -> Actor {
        Actor::new(1, Role::Admin, false, None)
    }

    #[test]
    fn student_results_filter_on_own_profile() {
        let q = sql::<result::Entity>(&student());
        assert!(q.contains(r#""result"."student_id" = 30"#), "{q}");
    }

    #[test]
    fn admin_results_are_unfiltered() {
        let q = sql::<result::Entity>(&admin());
        assert!(!q.contains(r#""student_id" ="#), "{q}");
        assert!(!q.contains("IS NULL"), "{q}");
    }

    #[test]
    fn student_leave_filters_on_applicant_user() {
        let q = sql::<leave_application::Entity>(&student());
        assert!(q.contains(r#""leave_application"."applicant_id" = 3"#), "{q}");
    }

    #[test]
    fn student_notices_respect_audience_and_window() {
        let q = sql::<notice::Entity>(&student());
        assert!(q.contains(r#""notice"."is_active" = TRUE"#), "{q}");
        assert!(q.contains(r#""notice"."target_role" IN ('all', 'student')"#), "{q}");
        assert!(q.contains(r#""notice"."publish_date" <= '2025-03-10'"#), "{q}");
        assert!(q.contains(r#""notice"."expiry_date" IS NULL"#), "{q}");
    }

    #[test]
    fn teacher_notices_have_no_publish_window() {
        let q = sql::<notice::Entity>(&teacher());
        assert!(q.contains(r#"IN ('all', 'teacher')"#), "{q}");
        assert!(!q.contains("publish_date"), "{q}");
    }

    #[test]
    fn student_exams_are_published_and_in_classroom() {
        let q = sql::<exam::Entity>(&student());
        assert!(q.contains(r#""exam"."classroom_id" = 5"#), "{q}");
        assert!(q.contains(r#""exam"."is_published" = TRUE"#), "{q}");
    }

    #[test]
    fn teacher_assignments_are_their_uploads() {
        let q = sql::<assignment::Entity>(&teacher());
        assert!(q.contains(r#""assignment"."uploaded_by" = 20"#), "{q}");
    }

    #[test]
    fn admin_meetings_include_organised() {
        let q = sql::<meeting::Entity>(&admin());
        assert!(q.contains(r#""meeting_participant"."user_id" = 1"#), "{q}");
        assert!(q.contains(r#"OR "meeting"."organized_by" = 1"#), "{q}");
    }

    #[test]
    fn teacher_meetings_are_invitations_only() {
        let q = sql::<meeting::Entity>(&teacher());
        assert!(q.contains("IN (SELECT"), "{q}");
        assert!(!q.contains("organized_by"), "{q}");
    }

    #[test]
    fn profileless_student_matches_nothing() {
        let bare = Actor::new(3, Role::Student, false, None);
        let (scope, select) = visible::<fee::Entity>(&bare, today());
        assert!(scope.is_nothing());
        let q = select.build(DbBackend::Postgres).to_string();
        assert!(q.contains(r#""fee"."id" IS NULL"#), "{q}");
    }

    #[test]
    fn inbox_is_recipient_only() {
        let q = sql::<message::Entity>(&teacher());
        assert!(q.contains(r#""message"."recipient_id" = 2"#), "{q}");
    }
}
