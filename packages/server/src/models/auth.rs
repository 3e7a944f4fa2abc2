use common::{Actor, Role};
use serde::{Deserialize, Serialize};

use super::shared::validate_text;
use crate::error::AppError;

/// Request body for self-registration. Accounts start inactive.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterRequest {
    /// Unique username (1-32 chars, alphanumeric and underscores).
    #[schema(example = "asha_k")]
    pub username: String,
    /// Password (8-128 characters).
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
    /// `teacher` or `student`. Admin accounts cannot be self-registered.
    pub role: Role,
    #[schema(example = "asha@example.org")]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

pub fn validate_username(username: &str) -> Result<(), AppError> {
    let username = username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < 8 || password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_text("Email", email, 254)?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(AppError::Validation("Email address is not valid".into())),
    }
}

pub fn validate_register_request(payload: &RegisterRequest) -> Result<(), AppError> {
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;
    validate_email(&payload.email)?;
    if payload.role == Role::Admin {
        return Err(AppError::Validation(
            "Only teacher or student accounts can register".into(),
        ));
    }
    Ok(())
}

/// Request body for user login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[schema(example = "asha_k")]
    pub username: String,
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Successful registration response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegisterResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "asha_k")]
    pub username: String,
    pub role: Role,
    /// Always `false` until an administrator approves the account.
    pub is_active: bool,
}

impl From<crate::entity::user::Model> for RegisterResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            is_active: user.is_active,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// JWT bearer token.
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "asha_k")]
    pub username: String,
    pub role: Role,
}

/// Current authenticated user, with profile and capabilities.
#[derive(Serialize, utoipa::ToSchema)]
pub struct MeResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "asha_k")]
    pub username: String,
    pub role: Role,
    pub is_staff: bool,
    /// Teacher profile id, when the user is a teacher with a profile.
    pub teacher_id: Option<i32>,
    /// Student profile id, when the user is a student with a profile.
    pub student_id: Option<i32>,
    pub classroom_id: Option<i32>,
    /// Actions the user may perform.
    #[schema(example = json!(["attendance:mark", "leave:apply"]))]
    pub capabilities: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl MeResponse {
    pub fn new(username: String, actor: &Actor) -> Self {
        Self {
            id: actor.user_id,
            username,
            role: actor.role,
            is_staff: actor.is_staff,
            teacher_id: actor.teacher_id(),
            student_id: actor.student_id(),
            classroom_id: actor.classroom_id(),
            capabilities: actor.capabilities().into_iter().map(String::from).collect(),
            warning: actor.profile_warning(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(role: Role, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: "asha_k".into(),
            password: "long enough".into(),
            role,
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    #[test]
    fn admins_cannot_self_register() {
        assert!(validate_register_request(&register(Role::Admin, "a@b.org")).is_err());
        assert!(validate_register_request(&register(Role::Student, "a@b.org")).is_ok());
    }

    #[test]
    fn email_needs_local_part_and_domain() {
        assert!(validate_email("nobody").is_err());
        assert!(validate_email("@example.org").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a@example.org").is_ok());
    }

    #[test]
    fn usernames_are_restricted() {
        assert!(validate_username("no spaces!").is_err());
        assert!(validate_username(&"a".repeat(33)).is_err());
        assert!(validate_username("ok_name_1").is_ok());
    }
}
