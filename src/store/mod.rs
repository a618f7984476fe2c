//! Storage collaborator
//!
//! Async repository traits the session core and the HTTP handlers reach
//! storage through, with a PostgreSQL and an in-memory implementation.

mod memory;
mod models;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StorageError;

pub use memory::InMemoryStore;
pub use models::{ChirpRow, NewRefreshToken, RefreshTokenRow, UserRow};
pub use postgres::PgStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a user; a taken email is `UniqueConstraintViolation`
    async fn create(&self, email: &str, password_hash: &str) -> StorageResult<UserRow>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<UserRow>>;

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRow>>;

    /// Replace email and password hash and revoke every live refresh token
    /// the user holds, all in one atomic write. Nothing changes on error:
    /// `NotFound` if the user is gone, `UniqueConstraintViolation` if the
    /// email is taken.
    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<UserRow>;

    /// Flip the elevated tier flag; `NotFound` if the user is gone
    async fn set_elevated_tier(&self, id: Uuid, elevated: bool) -> StorageResult<()>;

    /// Delete every user along with their chirps and refresh tokens
    async fn delete_all(&self) -> StorageResult<u64>;
}

/// Refresh token repository trait
///
/// Rows are keyed by the SHA-256 digest of the token, never the plaintext.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    async fn insert(&self, token: NewRefreshToken) -> StorageResult<RefreshTokenRow>;

    async fn find_by_hash(&self, token_hash: &str) -> StorageResult<Option<RefreshTokenRow>>;

    /// Mark a token revoked at `at`, keeping an earlier revocation time if
    /// one is already set. Returns the number of rows matched.
    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> StorageResult<u64>;
}

/// Ordering for chirp listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Chirp repository trait
#[async_trait]
pub trait ChirpRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, body: &str) -> StorageResult<ChirpRow>;

    /// List chirps by creation time, optionally for one author
    async fn list(&self, author_id: Option<Uuid>, order: SortOrder) -> StorageResult<Vec<ChirpRow>>;

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<ChirpRow>>;

    /// Returns the number of rows deleted
    async fn delete(&self, id: Uuid) -> StorageResult<u64>;
}
