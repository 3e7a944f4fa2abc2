//! Write-permission gates, checked before any mutation.

use crate::actor::Actor;
use crate::enums::Role;

/// An action that requires more than being signed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    MarkAttendance,
    CreateNotice,
    CreateAssignment,
    SubmitAssignment,
    GradeSubmission,
    WriteResult,
    ReviewLeave,
    ApplyLeave,
    SendMessage,
    CreateMeeting,
    CreateExam,
    IssueBooks,
    /// Maintain users, profiles, classrooms, subjects, timetables, fees,
    /// events and the library catalogue.
    ManageSchool,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MarkAttendance => "attendance:mark",
            Self::CreateNotice => "notice:create",
            Self::CreateAssignment => "assignment:create",
            Self::SubmitAssignment => "assignment:submit",
            Self::GradeSubmission => "submission:grade",
            Self::WriteResult => "result:write",
            Self::ReviewLeave => "leave:review",
            Self::ApplyLeave => "leave:apply",
            Self::SendMessage => "message:send",
            Self::CreateMeeting => "meeting:create",
            Self::CreateExam => "exam:create",
            Self::IssueBooks => "library:issue",
            Self::ManageSchool => "school:manage",
        }
    }
}

impl Actor {
    /// Whether the actor's role grants `capability`.
    ///
    /// Profile presence is not checked here; paths that stamp a profile id
    /// onto the row report a missing profile separately.
    pub fn can(&self, capability: Capability) -> bool {
        let admin = self.is_admin();
        let teacher = self.role == Role::Teacher;
        let student = self.role == Role::Student;
        match capability {
            Capability::MarkAttendance
            | Capability::CreateNotice
            | Capability::GradeSubmission
            | Capability::WriteResult
            | Capability::ReviewLeave
            | Capability::CreateExam
            | Capability::IssueBooks => admin || teacher,
            Capability::CreateAssignment => teacher,
            Capability::SubmitAssignment => student,
            Capability::ApplyLeave | Capability::SendMessage => true,
            Capability::CreateMeeting | Capability::ManageSchool => admin,
        }
    }

    /// All capabilities the actor holds, for `me`-style responses.
    pub fn capabilities(&self) -> Vec<&'static str> {
        ALL_CAPABILITIES
            .iter()
            .filter(|c| self.can(**c))
            .map(|c| c.as_str())
            .collect()
    }
}

const ALL_CAPABILITIES: &[Capability] = &[
    Capability::MarkAttendance,
    Capability::CreateNotice,
    Capability::CreateAssignment,
    Capability::SubmitAssignment,
    Capability::GradeSubmission,
    Capability::WriteResult,
    Capability::ReviewLeave,
    Capability::ApplyLeave,
    Capability::SendMessage,
    Capability::CreateMeeting,
    Capability::CreateExam,
    Capability::IssueBooks,
    Capability::ManageSchool,
];

/// Only the organiser may edit a meeting's notes and status.
pub fn can_update_meeting(actor: &Actor, organizer_id: i32) -> bool {
    actor.user_id == organizer_id
}

/// Authored records (notices, exams) are editable by their author or an admin.
pub fn can_edit_authored(actor: &Actor, author_user_id: Option<i32>) -> bool {
    actor.is_admin() || author_user_id == Some(actor.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Profile;

    fn admin() -> Actor {
        Actor::new(1, Role::Admin, false, None)
    }

    fn teacher() -> Actor {
        Actor::new(2, Role::Teacher, false, Some(Profile::Teacher { teacher_id: 20 }))
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

    #[test]
    fn attendance_is_marked_by_teachers_and_admins() {
        assert!(admin().can(Capability::MarkAttendance));
        assert!(teacher().can(Capability::MarkAttendance));
        assert!(!student().can(Capability::MarkAttendance));
    }

    #[test]
    fn only_teachers_create_assignments() {
        assert!(teacher().can(Capability::CreateAssignment));
        assert!(!admin().can(Capability::CreateAssignment));
        assert!(!student().can(Capability::CreateAssignment));
    }

    #[test]
    fn only_students_submit() {
        assert!(student().can(Capability::SubmitAssignment));
        assert!(!teacher().can(Capability::SubmitAssignment));
        assert!(!admin().can(Capability::SubmitAssignment));
    }

    #[test]
    fn meetings_are_created_by_admin_or_staff() {
        assert!(admin().can(Capability::CreateMeeting));
        assert!(!teacher().can(Capability::CreateMeeting));
        let staff = Actor::new(4, Role::Teacher, true, None);
        assert!(staff.can(Capability::CreateMeeting));
    }

    #[test]
    fn everyone_can_message_and_apply_for_leave() {
        for actor in [admin(), teacher(), student()] {
            assert!(actor.can(Capability::SendMessage));
            assert!(actor.can(Capability::ApplyLeave));
        }
    }

    #[test]
    fn leave_review_excludes_students() {
        assert!(admin().can(Capability::ReviewLeave));
        assert!(teacher().can(Capability::ReviewLeave));
        assert!(!student().can(Capability::ReviewLeave));
    }

    #[test]
    fn meeting_updates_belong_to_the_organiser() {
        assert!(can_update_meeting(&admin(), 1));
        assert!(!can_update_meeting(&teacher(), 1));
    }

    #[test]
    fn authored_records_editable_by_author_or_admin() {
        assert!(can_edit_authored(&teacher(), Some(2)));
        assert!(!can_edit_authored(&teacher(), Some(7)));
        assert!(can_edit_authored(&admin(), None));
    }

    #[test]
    fn capability_listing_matches_can() {
        let caps = student().capabilities();
        assert_eq!(caps, vec!["assignment:submit", "leave:apply", "message:send"]);
    }
}
