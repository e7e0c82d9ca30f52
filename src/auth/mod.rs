pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::Deserialize;
use validator::Validate;

// Re-export necessary items
pub use extractors::AuthSession;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenKeys, AUTH_ACCESS};

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account.
    /// Must be a valid email format.
    #[validate(email(message = "not a valid email address"))]
    pub email: String,
    /// Password for the new account.
    /// Must be at least 8 characters long.
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
}

/// Represents the payload for a user login request.
///
/// The password deliberately carries no length rule here: any credential pair
/// that does not match a stored account fails the same way, without hinting at
/// the password policy.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address of the account.
    #[validate(email(message = "not a valid email address"))]
    pub email: String,
    /// Password to check against the stored hash.
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let invalid_email_register = RegisterRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_register.validate().is_err());

        let short_password_register = RegisterRequest {
            email: "test@example.com".to_string(),
            // 7 characters, one below the minimum
            password: "1234567".to_string(),
        };
        assert!(short_password_register.validate().is_err());
    }

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let invalid_email_login = LoginRequest {
            email: "testexample.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(invalid_email_login.validate().is_err());

        // A short password is still a well-formed login attempt; it must fail
        // as a credential mismatch later, not as a validation error here.
        let short_password_login = LoginRequest {
            email: "test@example.com".to_string(),
            password: "wrong".to_string(),
        };
        assert!(short_password_login.validate().is_ok());
    }
}
