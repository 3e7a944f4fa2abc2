use axum::{extract::FromRequestParts, http::request::Parts};
use common::{Actor, Capability, Profile, Role};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::entity::{student, teacher, user};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// The token only names the account. Activity, role and the teacher/student
/// profile are loaded fresh, so deactivation and profile changes apply to
/// the next request.
pub struct AuthUser {
    pub username: String,
    pub actor: Actor,
}

impl AuthUser {
    pub fn user_id(&self) -> i32 {
        self.actor.user_id
    }

    /// Returns `Ok(())` if the actor holds `capability`, `Err(PermissionDenied)` otherwise.
    pub fn require(&self, capability: Capability) -> Result<(), AppError> {
        if self.actor.can(capability) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require(Capability::ManageSchool)
    }

    /// Teacher profile id for writes that stamp it onto a row.
    pub fn require_teacher_profile(&self) -> Result<i32, AppError> {
        self.actor.teacher_id().ok_or_else(|| self.missing_profile())
    }

    /// Student profile id for writes that stamp it onto a row.
    pub fn require_student_profile(&self) -> Result<i32, AppError> {
        self.actor.student_id().ok_or_else(|| self.missing_profile())
    }

    fn missing_profile(&self) -> AppError {
        AppError::MissingProfile(
            self.actor
                .profile_warning()
                .unwrap_or_else(|| "Profile not found".into()),
        )
    }
}

/// Load the teacher or student profile matching `role`, if one exists.
pub async fn load_profile<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    role: Role,
) -> Result<Option<Profile>, AppError> {
    let profile = match role {
        Role::Admin => None,
        Role::Teacher => teacher::Entity::find()
            .filter(teacher::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .map(|t| Profile::Teacher { teacher_id: t.id }),
        Role::Student => student::Entity::find()
            .filter(student::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .map(|s| Profile::Student {
                student_id: s.id,
                classroom_id: s.classroom_id,
            }),
    };
    Ok(profile)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        let user = user::Entity::find_by_id(claims.uid)
            .one(&state.db)
            .await?
            .ok_or(AppError::TokenInvalid)?;

        if !user.is_active {
            return Err(AppError::AccountInactive);
        }

        let profile = load_profile(&state.db, user.id, user.role).await?;

        Ok(AuthUser {
            username: user.username,
            actor: Actor::new(user.id, user.role, user.is_staff, profile),
        })
    }
}
