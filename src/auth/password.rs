/// Password Hashing and Verification
///
/// One-way salted hashing with bcrypt. No strength policy is enforced
/// here; callers decide what an acceptable password looks like.

use actix_web::web;
use bcrypt::{hash, verify};
use std::sync::Arc;

use crate::error::AuthError;

/// Hashed once per hasher so lookups for unknown users cost one verify
const DUMMY_PASSWORD: &str = "chirpy-unknown-user";

/// bcrypt hasher with a fixed work factor
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    cost: u32,
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    /// Create a hasher with the given bcrypt cost (4..=31)
    ///
    /// # Errors
    /// Returns `AuthError::Hashing` if bcrypt rejects the cost
    pub fn new(cost: u32) -> Result<Self, AuthError> {
        let dummy_hash =
            hash(DUMMY_PASSWORD, cost).map_err(|e| AuthError::Hashing(e.to_string()))?;

        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash a password
    ///
    /// # Errors
    /// Returns `AuthError::Hashing` if bcrypt fails internally
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash(password, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify a password against its hash
    ///
    /// A mismatch is `Ok(false)`. Only a structurally malformed hash is
    /// an error.
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        verify(password, password_hash).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Verify against a stored hash, or against the dummy hash when there is
    /// none. The missing case always reports a mismatch but costs the same
    /// bcrypt work as a real one.
    pub fn verify_or_dummy(
        &self,
        password: &str,
        password_hash: Option<&str>,
    ) -> Result<bool, AuthError> {
        match password_hash {
            Some(password_hash) => self.verify(password, password_hash),
            None => {
                self.verify(password, &self.dummy_hash)?;
                Ok(false)
            }
        }
    }

    /// `hash` on the blocking thread pool
    pub async fn spawn_hash(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();

        web::block(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }

    /// `verify_or_dummy` on the blocking thread pool
    pub async fn spawn_verify(
        &self,
        password: &str,
        password_hash: Option<&str>,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let password = password.to_owned();
        let password_hash = password_hash.map(str::to_owned);

        web::block(move || hasher.verify_or_dummy(&password, password_hash.as_deref()))
            .await
            .map_err(|e| AuthError::Hashing(e.to_string()))?
    }
}
