//! PostgreSQL repositories

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    ChirpRepository, ChirpRow, NewRefreshToken, RefreshTokenRepository, RefreshTokenRow,
    SortOrder, StorageResult, UserRepository, UserRow,
};
use crate::error::StorageError;

/// PostgreSQL-backed store implementing every repository trait
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_not_found(id: Uuid) -> StorageError {
    StorageError::NotFound(format!("user {}", id))
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create(&self, email: &str, password_hash: &str) -> StorageResult<UserRow> {
        let now = Utc::now();
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, is_chirpy_red, created_at, updated_at)
            VALUES ($1, $2, $3, FALSE, $4, $4)
            RETURNING id, email, password_hash, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> StorageResult<Option<UserRow>> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, is_chirpy_red, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
        at: DateTime<Utc>,
    ) -> StorageResult<UserRow> {
        let mut transaction = self.pool.begin().await?;

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, updated_at = $4
            WHERE id = $1
            RETURNING id, email, password_hash, is_chirpy_red, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .bind(at)
        .fetch_optional(&mut transaction)
        .await?
        .ok_or_else(|| user_not_found(id))?;

        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $1, updated_at = $1
            WHERE user_id = $2 AND revoked_at IS NULL
            "#,
        )
        .bind(at)
        .bind(id)
        .execute(&mut transaction)
        .await?;

        transaction.commit().await?;
        Ok(user)
    }

    async fn set_elevated_tier(&self, id: Uuid, elevated: bool) -> StorageResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_chirpy_red = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(elevated)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }
        Ok(())
    }

    async fn delete_all(&self) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM users").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RefreshTokenRepository for PgStore {
    async fn insert(&self, token: NewRefreshToken) -> StorageResult<RefreshTokenRow> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens (token_hash, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $3, $4, NULL)
            RETURNING token_hash, user_id, created_at, updated_at, expires_at, revoked_at
            "#,
        )
        .bind(&token.token_hash)
        .bind(token.user_id)
        .bind(now)
        .bind(token.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn find_by_hash(&self, token_hash: &str) -> StorageResult<Option<RefreshTokenRow>> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT token_hash, user_id, created_at, updated_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn revoke(&self, token_hash: &str, at: DateTime<Utc>) -> StorageResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = COALESCE(revoked_at, $1), updated_at = $1
            WHERE token_hash = $2
            "#,
        )
        .bind(at)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ChirpRepository for PgStore {
    async fn create(&self, user_id: Uuid, body: &str) -> StorageResult<ChirpRow> {
        let now = Utc::now();
        let chirp = sqlx::query_as::<_, ChirpRow>(
            r#"
            INSERT INTO chirps (id, created_at, updated_at, body, user_id)
            VALUES ($1, $2, $2, $3, $4)
            RETURNING id, created_at, updated_at, body, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(now)
        .bind(body)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn list(&self, author_id: Option<Uuid>, order: SortOrder) -> StorageResult<Vec<ChirpRow>> {
        let direction = match order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        let sql = format!(
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE ($1::uuid IS NULL OR user_id = $1)
            ORDER BY created_at {}
            "#,
            direction
        );

        let chirps = sqlx::query_as::<_, ChirpRow>(&sql)
            .bind(author_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(chirps)
    }

    async fn find_by_id(&self, id: Uuid) -> StorageResult<Option<ChirpRow>> {
        let chirp = sqlx::query_as::<_, ChirpRow>(
            r#"
            SELECT id, created_at, updated_at, body, user_id
            FROM chirps
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(chirp)
    }

    async fn delete(&self, id: Uuid) -> StorageResult<u64> {
        let result = sqlx::query("DELETE FROM chirps WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
