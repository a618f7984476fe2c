/// JWT Token Generation and Validation
///
/// Access tokens are HS256-signed compact JWS strings. Validity depends
/// only on the token and the shared secret; nothing is looked up or cached.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::auth::claims::{Claims, ISSUER};
use crate::error::AuthError;

/// Issue a new access token for a user
///
/// # Arguments
/// * `user_id` - Subject of the token
/// * `secret` - Shared HMAC secret
/// * `ttl` - Lifetime from now; negative values yield an already-expired token
///
/// # Errors
/// Returns `AuthError::Signing` if the claims cannot be encoded
pub fn issue_access_token(user_id: Uuid, secret: &str, ttl: Duration) -> Result<String, AuthError> {
    let claims = Claims::new(user_id, ttl);

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verify an access token and return its subject
///
/// The signature is always checked with `secret`, the same shared secret
/// used at issuance.
///
/// # Errors
/// - `AuthError::TokenExpired` once the current time reaches `exp`
/// - `AuthError::TokenInvalid` on a bad signature, wrong issuer, malformed
///   claims or a subject that is not a UUID
pub fn verify_access_token(token: &str, secret: &str) -> Result<Uuid, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
    validation.leeway = 0;

    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => {
            tracing::debug!("JWT validation error: {}", e);
            AuthError::TokenInvalid
        }
    })?;

    // The library treats `exp == now` as still valid
    if claims.is_expired() {
        return Err(AuthError::TokenExpired);
    }

    claims.user_id()
}
