use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// The single access scope issued by this system. Every session token carries it.
pub const AUTH_ACCESS: &str = "auth";

/// Represents the claims encoded within a session token.
///
/// The payload is signed but not encrypted: it guarantees integrity, so it must
/// never carry secrets. Tokens have no expiry claim; a session ends only when
/// its token is removed from the owner's stored token list.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the owning user's unique identifier.
    pub sub: i32,
    /// Access scope label, always [`AUTH_ACCESS`].
    pub access: String,
}

/// Holds the HS256 signing key pair for the process.
///
/// Built once from the configured secret and injected as application data,
/// rather than read from ambient environment state, so tests can construct
/// isolated instances with their own secrets.
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Signs a token binding `user_id` to the `"auth"` scope.
    ///
    /// Signing is deterministic: the same user id and secret always produce the
    /// same token string.
    pub fn issue(&self, user_id: i32) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            access: AUTH_ACCESS.to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to sign token: {}", e)))
    }

    /// Verifies a token string and decodes its claims.
    ///
    /// Fails with `AppError::Unauthorized` if the string is empty, malformed,
    /// tampered with, signed with a different secret, or carries an unexpected
    /// access scope. Nothing from an unverified payload is ever trusted.
    ///
    /// Note this only proves the token was issued by us; callers still have to
    /// confirm the string is live in the owner's stored token list.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        // Tokens carry no `exp` claim, so expiry validation must be disabled;
        // jsonwebtoken otherwise requires one by default.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let claims = decode::<Claims>(token, &self.decoding, &validation)?.claims;

        if claims.access != AUTH_ACCESS {
            return Err(AppError::Unauthorized(
                "Invalid token: unexpected access scope".into(),
            ));
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_issue_and_verify() {
        let keys = TokenKeys::from_secret("test_secret_for_issue_verify");
        let user_id = 1;
        let token = keys.issue(user_id).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.access, AUTH_ACCESS);
    }

    #[test]
    fn test_issue_is_deterministic() {
        let keys = TokenKeys::from_secret("test_secret_deterministic");
        assert_eq!(keys.issue(42).unwrap(), keys.issue(42).unwrap());
    }

    #[test]
    fn test_garbage_tokens_are_rejected() {
        let keys = TokenKeys::from_secret("test_secret_garbage");
        for garbage in ["", "not-a-token", "a.b.c"] {
            match keys.verify(garbage) {
                Err(AppError::Unauthorized(_)) => {}
                Ok(_) => panic!("Garbage token {:?} should not verify", garbage),
                Err(e) => panic!("Unexpected error type for garbage token: {:?}", e),
            }
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuing_keys = TokenKeys::from_secret("one_secret");
        let verifying_keys = TokenKeys::from_secret("a_completely_different_secret");

        let token = issuing_keys.issue(7).unwrap();
        match verifying_keys.verify(&token) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("Invalid token"));
            }
            Ok(_) => panic!("Token should have been invalid due to signature mismatch"),
            Err(e) => panic!("Unexpected error type for invalid signature: {:?}", e),
        }
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let keys = TokenKeys::from_secret("test_secret_tamper");
        let token = keys.issue(1).unwrap();

        // Swap the payload segment for one claiming a different user.
        let other = keys.issue(2).unwrap();
        let mut parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        parts[1] = other_parts[1];
        let tampered = parts.join(".");

        assert!(keys.verify(&tampered).is_err());
    }

    #[test]
    fn test_foreign_access_scope_is_rejected() {
        let secret = "test_secret_scope";
        let keys = TokenKeys::from_secret(secret);

        let foreign = encode(
            &Header::default(),
            &Claims {
                sub: 1,
                access: "admin".to_string(),
            },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        match keys.verify(&foreign) {
            Err(AppError::Unauthorized(msg)) => {
                assert!(msg.contains("access scope"));
            }
            Ok(_) => panic!("Token with a foreign scope should not verify"),
            Err(e) => panic!("Unexpected error type for foreign scope: {:?}", e),
        }
    }
}
