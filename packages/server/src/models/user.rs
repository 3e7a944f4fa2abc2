use chrono::{DateTime, NaiveDate, Utc};
use common::Role;
use serde::{Deserialize, Serialize};

use super::auth::{validate_email, validate_password, validate_username};
use super::shared::{double_option, validate_text};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub is_staff: bool,
}

/// PATCH body. The role is deliberately absent: it never changes.
#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<NaiveDate>)]
    pub date_of_birth: Option<Option<NaiveDate>>,
    /// Activating a self-registered account approves it.
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub role: Option<Role>,
    /// `false` lists accounts awaiting approval.
    pub is_active: Option<bool>,
    /// Case-insensitive match on username, first or last name.
    pub search: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub username: String,
    pub role: Role,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub is_active: bool,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

impl From<crate::entity::user::Model> for UserResponse {
    fn from(m: crate::entity::user::Model) -> Self {
        Self {
            full_name: m.full_name(),
            id: m.id,
            username: m.username,
            role: m.role,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            phone: m.phone,
            address: m.address,
            date_of_birth: m.date_of_birth,
            is_active: m.is_active,
            is_staff: m.is_staff,
            created_at: m.created_at,
        }
    }
}

/// Compact user reference embedded in other responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UserSummary {
    pub id: i32,
    pub username: String,
    pub full_name: String,
    pub role: Role,
}

impl From<&crate::entity::user::Model> for UserSummary {
    fn from(m: &crate::entity::user::Model) -> Self {
        Self {
            id: m.id,
            username: m.username.clone(),
            full_name: m.full_name(),
            role: m.role,
        }
    }
}

pub fn validate_create_user(req: &CreateUserRequest) -> Result<(), AppError> {
    validate_username(&req.username)?;
    validate_password(&req.password)?;
    validate_email(&req.email)?;
    if let Some(ref phone) = req.phone {
        validate_text("Phone", phone, 32)?;
    }
    Ok(())
}

pub fn validate_update_user(req: &UpdateUserRequest) -> Result<(), AppError> {
    if let Some(ref email) = req.email {
        validate_email(email)?;
    }
    if let Some(Some(ref phone)) = req.phone {
        validate_text("Phone", phone, 32)?;
    }
    Ok(())
}
