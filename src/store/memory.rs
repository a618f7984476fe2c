//! In-memory repositories
//!
//! Used by the test-suite and for running without PostgreSQL. Mirrors the
//! constraints the SQL schema enforces: unique emails and cascading
//! deletes from users to their chirps and refresh tokens.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

use super::{
    ChirpRepository, ChirpRow, NewRefreshToken, RefreshTokenRepository, RefreshTokenRow,
    SortOrder, StorageResult, UserRepository, UserRow,
};
use crate::error::StorageError;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRow>,
    refresh_tokens: HashMap<String, RefreshTokenRow>,
    chirps: HashMap<Uuid, ChirpRow>,
}

/// Shared in-memory store implementing every repository trait
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| StorageError::UnexpectedError("store lock poisoned".to_string()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| StorageError::UnexpectedError("store lock poisoned".to_string()))
    }

    /// Overwrite a refresh token's expiry, for exercising expiry paths
    pub fn set_refresh_token_expiry(&self, token_hash: &str, expires_at: DateTime<Utc>) -> bool {
        match self.write() {
            Ok(mut tables) => match tables.refresh_tokens.get_mut(token_hash) {
                Some(row) => {
                    row.expires_at = expires_at;
                    true
                }
                None => false,
            },
            Err(_) => false,
        }
    }
}

fn user_not_found(id: Uuid) -> StorageError {
    StorageError::NotFound(format!("user {}", id))
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, email: &str, password_hash: &str) -> StorageResult<UserRow> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == email) {
            return Err(StorageError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        let now = Utc::now();
        let user = UserRow {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            is_chirpy_red: false,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<UserRow>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRow>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<UserRow> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&id) {
            return Err(user_not_found(id));
        }
        if tables.users.values().any(|u| u.email == email && u.id != id) {
            return Err(StorageError::UniqueConstraintViolation(
                "users_email_key".to_string(),
            ));
        }

        for row in tables
            .refresh_tokens
            .values_mut()
            .filter(|r| r.user_id == id && r.revoked_at.is_none())
        {
            row.revoked_at = Some(at);
            row.updated_at = at;
        }

        let user = tables.users.get_mut(&id).ok_or_else(|| user_not_found(id))?;
        user.email = email.to_string();
        user.password_hash = password_hash.to_string();
        user.updated_at = at;
        Ok(user.clone())
    }

    async fn set_elevated_tier(&self, id: Uuid, elevated: bool) -> StorageResult<()> {
        let mut tables = self.write()?;
        let user = tables.users.get_mut(&id).ok_or_else(|| user_not_found(id))?;
        user.is_chirpy_red = elevated;
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_all(&self) -> StorageResult<u64> {
        let mut tables = self.write()?;
        let deleted = tables.users.len() as u64;
        tables.users.clear();
        tables.chirps.clear();
        tables.refresh_tokens.clear();
        Ok(deleted)
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryStore {
    async fn insert(&self, token: NewRefreshToken) -> StorageResult<RefreshTokenRow> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&token.user_id) {
            return Err(StorageError::UnexpectedError(
                "refresh_tokens_user_id_fkey".to_string(),
            ));
        }
        if tables.refresh_tokens.contains_key(&token.token_hash) {
            return Err(StorageError::UniqueConstraintViolation(
                "refresh_tokens_pkey".to_string(),
            ));
        }

        let now = Utc::now();
        let row = RefreshTokenRow {
            token_hash: token.token_hash,
            user_id: token.user_id,
            created_at: now,
            updated_at: now,
            expires_at: token.expires_at,
            revoked_at: None,
        };
        tables.refresh_tokens.insert(row.token_hash.clone(), row.clone());
        Ok(row)
    }

    async fn find_by_hash(&self, token_hash: &str) -> StorageResult<Option<RefreshTokenRow>> {
        Ok(self.read()?.refresh_tokens.get(token_hash).cloned())
    }

    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> StorageResult<u64> {
        let mut tables = self.write()?;
        match tables.refresh_tokens.get_mut(token_hash) {
            Some(row) => {
                row.revoked_at.get_or_insert(at);
                row.updated_at = at;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[async_trait]
impl ChirpRepository for InMemoryStore {
    async fn create(&self, user_id: Uuid, body: &str) -> StorageResult<ChirpRow> {
        let mut tables = self.write()?;
        if !tables.users.contains_key(&user_id) {
            return Err(StorageError::UnexpectedError("chirps_user_id_fkey".to_string()));
        }

        let now = Utc::now();
        let chirp = ChirpRow {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body: body.to_string(),
            user_id,
        };
        tables.chirps.insert(chirp.id, chirp.clone());
        Ok(chirp)
    }

    async fn list(&self, author_id: Option<Uuid>, order: SortOrder) -> StorageResult<Vec<ChirpRow>> {
        let mut chirps: Vec<ChirpRow> = self
            .read()?
            .chirps
            .values()
            .filter(|c| author_id.map_or(true, |author| c.user_id == author))
            .cloned()
            .collect();

        chirps.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        if order == SortOrder::Descending {
            chirps.reverse();
        }
        Ok(chirps)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<ChirpRow>> {
        Ok(self.read()?.chirps.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> StorageResult<u64> {
        Ok(self.write()?.chirps.remove(&id).map_or(0, |_| 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        UserRepository::create(&store, "a@x.com", "hash").await.unwrap();

        let result = UserRepository::create(&store, "a@x.com", "hash").await;
        assert!(matches!(result, Err(StorageError::UniqueConstraintViolation(_))));
    }

    #[tokio::test]
    async fn test_revoke_keeps_first_revocation_time() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, "a@x.com", "hash").await.unwrap();
        store
            .insert(NewRefreshToken {
                token_hash: "h".to_string(),
                user_id: user.id,
                expires_at: Utc::now() + Duration::days(60),
            })
            .await
            .unwrap();

        let first = Utc::now();
        let later = first + Duration::seconds(30);
        assert_eq!(store.revoke("h", first).await.unwrap(), 1);
        assert_eq!(store.revoke("h", later).await.unwrap(), 1);

        let row = store.find_by_hash("h").await.unwrap().unwrap();
        assert_eq!(row.revoked_at, Some(first));
        assert_eq!(row.updated_at, later);
    }

    #[tokio::test]
    async fn test_revoke_unknown_matches_nothing() {
        let store = InMemoryStore::new();
        assert_eq!(store.revoke("missing", Utc::now()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_all_cascades() {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, "a@x.com", "hash").await.unwrap();
        let chirp = ChirpRepository::create(&store, user.id, "hello").await.unwrap();
        store
            .insert(NewRefreshToken {
                token_hash: "h".to_string(),
                user_id: user.id,
                expires_at: Utc::now() + Duration::days(60),
            })
            .await
            .unwrap();

        assert_eq!(store.delete_all().await.unwrap(), 1);
        assert!(ChirpRepository::find_by_id(&store, chirp.id).await.unwrap().is_none());
        assert!(store.find_by_hash("h").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_and_filters() {
        let store = InMemoryStore::new();
        let alice = UserRepository::create(&store, "alice@x.com", "hash").await.unwrap();
        let bob = UserRepository::create(&store, "bob@x.com", "hash").await.unwrap();
        let first = ChirpRepository::create(&store, alice.id, "one").await.unwrap();
        ChirpRepository::create(&store, bob.id, "two").await.unwrap();
        let third = ChirpRepository::create(&store, alice.id, "three").await.unwrap();

        let asc = store.list(Some(alice.id), SortOrder::Ascending).await.unwrap();
        assert_eq!(asc.len(), 2);
        assert!(asc[0].created_at <= asc[1].created_at);

        let desc = store.list(None, SortOrder::Descending).await.unwrap();
        assert_eq!(desc.len(), 3);
        assert!(desc[0].created_at >= desc[2].created_at);

        let ids: Vec<Uuid> = asc.iter().map(|c| c.id).collect();
        assert!(ids.contains(&first.id) && ids.contains(&third.id));
    }

    async fn store_with_session() -> (InMemoryStore, UserRow) {
        let store = InMemoryStore::new();
        let user = UserRepository::create(&store, "a@x.com", "old-hash").await.unwrap();
        store
            .insert(NewRefreshToken {
                token_hash: "h".to_string(),
                user_id: user.id,
                expires_at: Utc::now() + Duration::days(60),
            })
            .await
            .unwrap();
        (store, user)
    }

    #[tokio::test]
    async fn test_update_credentials_revokes_sessions() {
        let (store, user) = store_with_session().await;
        let at = Utc::now();

        let updated = store
            .update_credentials(user.id, "b@x.com", "new-hash", at)
            .await
            .unwrap();

        assert_eq!(updated.email, "b@x.com");
        assert_eq!(updated.password_hash, "new-hash");
        let row = store.find_by_hash("h").await.unwrap().unwrap();
        assert_eq!(row.revoked_at, Some(at));
    }

    #[tokio::test]
    async fn test_update_credentials_conflict_changes_nothing() {
        let (store, user) = store_with_session().await;
        UserRepository::create(&store, "taken@x.com", "hash").await.unwrap();

        let result = store
            .update_credentials(user.id, "taken@x.com", "new-hash", Utc::now())
            .await;
        assert!(matches!(result, Err(StorageError::UniqueConstraintViolation(_))));

        let unchanged = UserRepository::find_by_id(&store, user.id).await.unwrap().unwrap();
        assert_eq!(unchanged.email, "a@x.com");
        assert_eq!(unchanged.password_hash, "old-hash");
        let row = store.find_by_hash("h").await.unwrap().unwrap();
        assert!(row.revoked_at.is_none());
    }

    #[tokio::test]
    async fn test_update_credentials_for_missing_user() {
        let store = InMemoryStore::new();

        let result = store
            .update_credentials(Uuid::new_v4(), "a@x.com", "hash", Utc::now())
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }
}
