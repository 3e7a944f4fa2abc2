use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use common::Role;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT Claims structure.
///
/// Only identifies the account; role, activity and profile are reloaded
/// from the database on every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Username
    pub uid: i32,    // User ID
    pub role: Role,
    pub exp: usize, // Expiration timestamp
}

/// Sign a new JWT token for a user.
pub fn sign(user_id: i32, username: &str, role: Role, secret: &str, ttl_hours: i64) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(ttl_hours))
        .context("token expiry out of range")?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid: user_id,
        role,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_token_round_trips() {
        let token = sign(7, "mira", Role::Teacher, "secret", 1).unwrap();
        let claims = verify(&token, "secret").unwrap();
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.sub, "mira");
        assert_eq!(claims.role, Role::Teacher);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(7, "mira", Role::Student, "secret", 1).unwrap();
        assert!(verify(&token, "other").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = sign(7, "mira", Role::Student, "secret", -2).unwrap();
        assert!(verify(&token, "secret").is_err());
    }
}
