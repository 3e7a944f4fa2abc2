use serde::Serialize;

use crate::enums::Role;

/// Side profile attached to a user account.
///
/// A teacher or student account may exist before its profile has been
/// created, so actors carry `Option<Profile>` and every consumer has to
/// handle the absent case.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Profile {
    Teacher {
        teacher_id: i32,
    },
    Student {
        student_id: i32,
        classroom_id: Option<i32>,
    },
}

/// The authenticated user a request acts on behalf of.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
    pub is_staff: bool,
    pub profile: Option<Profile>,
}

impl Actor {
    pub fn new(user_id: i32, role: Role, is_staff: bool, profile: Option<Profile>) -> Self {
        Self {
            user_id,
            role,
            is_staff,
            profile,
        }
    }

    /// Admins and staff accounts share the administrative view.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin || self.is_staff
    }

    pub fn is_teacher(&self) -> bool {
        self.role == Role::Teacher
    }

    pub fn is_student(&self) -> bool {
        self.role == Role::Student
    }

    /// Teacher profile id, only when the actor is a teacher with a profile.
    pub fn teacher_id(&self) -> Option<i32> {
        match (self.role, self.profile) {
            (Role::Teacher, Some(Profile::Teacher { teacher_id })) => Some(teacher_id),
            _ => None,
        }
    }

    /// Student profile id, only when the actor is a student with a profile.
    pub fn student_id(&self) -> Option<i32> {
        match (self.role, self.profile) {
            (Role::Student, Some(Profile::Student { student_id, .. })) => Some(student_id),
            _ => None,
        }
    }

    pub fn classroom_id(&self) -> Option<i32> {
        match (self.role, self.profile) {
            (Role::Student, Some(Profile::Student { classroom_id, .. })) => classroom_id,
            _ => None,
        }
    }

    /// True when the role implies a profile that does not exist.
    pub fn missing_profile(&self) -> bool {
        match self.role {
            Role::Admin => false,
            Role::Teacher => self.teacher_id().is_none(),
            Role::Student => self.student_id().is_none(),
        }
    }

    /// User-facing warning for a role whose profile is missing.
    pub fn profile_warning(&self) -> Option<String> {
        if !self.missing_profile() {
            return None;
        }
        Some(format!("Please complete your {} profile.", self.role))
    }
}
