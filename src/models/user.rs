use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::token::{TokenKeys, AUTH_ACCESS};
use crate::auth::RegisterRequest;
use crate::error::AppError;

/// A user record as stored in the `users` table.
///
/// The session token list is not a field here: tokens live as rows in the
/// `user_tokens` table so that appending and removing one is a single
/// statement, and concurrent logins/logouts against the same user cannot
/// overwrite each other.
#[derive(Debug, Serialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The public projection of a user returned by the API.
/// Never exposes the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
        }
    }
}

impl User {
    /// Registers a new user: validates the payload, hashes the password, inserts.
    ///
    /// Failures are field-scoped so callers can tell a malformed email from a
    /// too-short password from an already-registered email. The plaintext
    /// password is hashed before anything is persisted and never stored.
    pub async fn register(pool: &PgPool, request: &RegisterRequest) -> Result<User, AppError> {
        request.validate()?;
        let email = request.email.trim();

        // Check if email already exists
        let existing_user = sqlx::query("SELECT id FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        if existing_user.is_some() {
            return Err(AppError::Validation {
                field: "email".into(),
                reason: "email is already registered".into(),
            });
        }

        // Hash password
        let password_hash = hash_password(&request.password)?;

        // Insert new user. The unique index on email backs up the check above
        // when two registrations race.
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2)
             RETURNING id, email, password_hash, created_at",
        )
        .bind(email)
        .bind(&password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => AppError::Validation {
                field: "email".into(),
                reason: "email is already registered".into(),
            },
            _ => AppError::from(e),
        })
    }

    /// Looks up a user by email and checks the password against the stored hash.
    ///
    /// An unknown email and a wrong password fail with the same generic error,
    /// so the response never reveals whether an account exists.
    pub async fn find_by_credentials(
        pool: &PgPool,
        email: &str,
        password: &str,
    ) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;

        match user {
            Some(user) => {
                if verify_password(password, &user.password_hash)? {
                    Ok(user)
                } else {
                    Err(AppError::BadRequest("Invalid credentials".into()))
                }
            }
            None => Err(AppError::BadRequest("Invalid credentials".into())),
        }
    }

    /// Mints a session token for `user_id` and appends it to the user's stored
    /// token list in one INSERT. The token string is only returned once the
    /// row is persisted.
    pub async fn issue_session(
        pool: &PgPool,
        keys: &TokenKeys,
        user_id: i32,
    ) -> Result<String, AppError> {
        let token = keys.issue(user_id)?;

        sqlx::query("INSERT INTO user_tokens (user_id, access, token) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(AUTH_ACCESS)
            .bind(&token)
            .execute(pool)
            .await?;

        Ok(token)
    }

    /// Resolves a presented token string to its owning user.
    ///
    /// The signature is checked first; a failure short-circuits without touching
    /// the database. A valid signature is still not enough: the exact string
    /// must also be live in the subject's stored token list. A logged-out token
    /// keeps its valid signature but fails the membership join here.
    pub async fn find_by_token(
        pool: &PgPool,
        keys: &TokenKeys,
        token: &str,
    ) -> Result<User, AppError> {
        let claims = keys.verify(token)?;

        let user = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password_hash, u.created_at
             FROM users u
             JOIN user_tokens t ON t.user_id = u.id
             WHERE u.id = $1 AND t.token = $2 AND t.access = $3",
        )
        .bind(claims.sub)
        .bind(token)
        .bind(AUTH_ACCESS)
        .fetch_optional(pool)
        .await?;

        user.ok_or_else(|| AppError::Unauthorized("Invalid token".into()))
    }

    /// Removes the matching token row, ending that session.
    ///
    /// Other sessions of the same user keep their tokens. Removing a token that
    /// is already gone is a no-op, not an error.
    pub async fn remove_token(pool: &PgPool, user_id: i32, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2 AND access = $3")
            .bind(user_id)
            .bind(token)
            .bind(AUTH_ACCESS)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_projection_hides_the_hash() {
        let user = User {
            id: 1,
            email: "test@example.com".to_string(),
            password_hash: "$2b$10$abcdefghijklmnopqrstuv".to_string(),
            created_at: Utc::now(),
        };

        let public = PublicUser::from(&user);
        assert_eq!(public.id, 1);
        assert_eq!(public.email, "test@example.com");

        let json = serde_json::to_value(&public).unwrap();
        assert!(json.get("password_hash").is_none());

        // Serializing the full record must not leak the hash either.
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
