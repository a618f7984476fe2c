/// JWT Claims structure
///
/// Fixed claim set carried by access tokens. Unknown fields are rejected
/// and every field is required, so a token either decodes into exactly
/// this shape or it is invalid.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AuthError;

/// Issuer stamped into every access token
pub const ISSUER: &str = "chirpy";

/// JWT Claims for access tokens
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Claims {
    /// Issuer
    pub iss: String,
    /// Subject (user ID as UUID string)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for `user_id` expiring `ttl` from now
    ///
    /// A negative `ttl` produces claims that are already expired.
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: now,
            exp: now + ttl.num_seconds(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// Returns `AuthError::TokenInvalid` if the subject is not a UUID
    pub fn user_id(&self) -> Result<Uuid, AuthError> {
        Uuid::parse_str(&self.sub).map_err(|_| AuthError::TokenInvalid)
    }

    /// Expired once the current second reaches `exp`
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::hours(1));

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_negative_ttl_is_expired() {
        let claims = Claims::new(Uuid::new_v4(), Duration::minutes(-1));
        assert!(claims.is_expired());
    }

    #[test]
    fn test_user_id_extraction() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(user_id, Duration::hours(1));

        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_invalid_user_id() {
        let mut claims = Claims::new(Uuid::new_v4(), Duration::hours(1));
        claims.sub = "invalid-uuid".to_string();

        assert!(matches!(claims.user_id(), Err(AuthError::TokenInvalid)));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = serde_json::json!({
            "iss": ISSUER,
            "sub": Uuid::new_v4().to_string(),
            "iat": 0,
            "exp": 1,
            "admin": true,
        });

        assert!(serde_json::from_value::<Claims>(json).is_err());
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let json = serde_json::json!({
            "iss": ISSUER,
            "exp": 1,
        });

        assert!(serde_json::from_value::<Claims>(json).is_err());
    }
}
