/// Refresh Token Management
///
/// Handles refresh token generation, storage, usability checks and
/// revocation. Refresh tokens are:
/// - 64 random alphanumeric characters (~380 bits of entropy)
/// - Hashed with SHA-256 before storage (never store plaintext)
/// - Valid for a fixed 60 days from issuance, never extended
/// - Revocable, and never deleted or reissued in place

use chrono::{Duration, Utc};
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AuthError;
use crate::store::{NewRefreshToken, RefreshTokenRepository, RefreshTokenRow};

const REFRESH_TOKEN_LENGTH: usize = 64;

/// Lifetime of every refresh token
pub fn refresh_token_ttl() -> Duration {
    Duration::days(60)
}

/// Generate a new cryptographically secure refresh token
///
/// The token carries no structure; it cannot be decoded to reveal its owner.
pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a refresh token using SHA-256
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issues and tracks refresh tokens over a repository
///
/// Every call reads the repository; revocation state is never cached.
#[derive(Clone)]
pub struct RefreshTokenStore {
    repo: Arc<dyn RefreshTokenRepository>,
}

impl RefreshTokenStore {
    pub fn new(repo: Arc<dyn RefreshTokenRepository>) -> Self {
        Self { repo }
    }

    /// Issue and persist a new refresh token for `user_id`
    ///
    /// # Returns
    /// The plaintext token (what the client stores)
    ///
    /// # Errors
    /// Returns `AuthError::Storage` if persistence fails
    pub async fn issue(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = generate_refresh_token();

        self.repo
            .insert(NewRefreshToken {
                token_hash: hash_token(&token),
                user_id,
                expires_at: Utc::now() + refresh_token_ttl(),
            })
            .await?;

        Ok(token)
    }

    /// Look up who owns a token, whatever its revocation or expiry state
    ///
    /// # Errors
    /// Returns `AuthError::NotFound` if the token was never issued
    pub async fn resolve_owner(&self, token: &str) -> Result<Uuid, AuthError> {
        self.find(token).await.map(|row| row.user_id)
    }

    /// Fetch a token record if it may still be used
    ///
    /// Checks:
    /// 1. Token exists
    /// 2. Token has not been revoked
    /// 3. Token has not expired
    ///
    /// # Errors
    /// - `AuthError::NotFound` if the token was never issued
    /// - `AuthError::TokenRevokedOrExpired` if revoked or past expiry
    pub async fn check_usable(&self, token: &str) -> Result<RefreshTokenRow, AuthError> {
        let row = self.find(token).await?;

        if row.revoked_at.is_some() {
            tracing::warn!(user_id = %row.user_id, "Attempt to use revoked refresh token");
            return Err(AuthError::TokenRevokedOrExpired);
        }

        if !row.is_usable_at(Utc::now()) {
            tracing::info!(user_id = %row.user_id, "Refresh token expired");
            return Err(AuthError::TokenRevokedOrExpired);
        }

        Ok(row)
    }

    /// Revoke a single refresh token
    ///
    /// Revoking an already-revoked token succeeds and keeps the original
    /// revocation time.
    ///
    /// # Errors
    /// - `AuthError::NotFound` if the token was never issued
    /// - `AuthError::Storage` if the update fails
    pub async fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let matched = self.repo.revoke(&hash_token(token), Utc::now()).await?;

        if matched == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }

    async fn find(&self, token: &str) -> Result<RefreshTokenRow, AuthError> {
        self.repo
            .find_by_hash(&hash_token(token))
            .await?
            .ok_or_else(|| {
                tracing::warn!("Refresh token not found");
                AuthError::NotFound
            })
    }
}
