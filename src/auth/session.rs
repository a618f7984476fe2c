/// Session Service
///
/// Orchestrates password verification, access tokens and refresh tokens
/// into the login / refresh / revoke / authenticate protocol. This is the
/// boundary where internal auth failures become caller-visible errors:
/// every credential problem is `Unauthenticated`, entitlement problems are
/// `Forbidden`, and crypto or storage failures are a generic failure.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::{issue_access_token, verify_access_token};
use crate::auth::password::PasswordHasher;
use crate::auth::refresh_token::RefreshTokenStore;
use crate::error::{AppError, AuthError, ValidationError};
use crate::store::{RefreshTokenRepository, UserRepository, UserRow};

/// Default and maximum access token lifetime
pub fn default_access_token_ttl() -> Duration {
    Duration::hours(1)
}

/// Pick the access token lifetime for a login
///
/// A caller may only shorten the default window: a positive request is
/// capped at one hour, anything else falls back to one hour.
pub fn clamp_access_token_ttl(requested: Option<Duration>) -> Duration {
    let default = default_access_token_ttl();
    match requested {
        Some(ttl) if ttl > Duration::zero() => ttl.min(default),
        _ => default,
    }
}

/// Public profile of a user; never includes the password hash
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_chirpy_red: bool,
}

impl From<UserRow> for UserSummary {
    fn from(user: UserRow) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            is_chirpy_red: user.is_chirpy_red,
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    #[serde(flatten)]
    pub user: UserSummary,
    #[serde(rename = "token")]
    pub access_token: String,
    pub refresh_token: String,
}

/// The session protocol over a user repository and a refresh token store
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserRepository>,
    refresh_tokens: RefreshTokenStore,
    hasher: PasswordHasher,
    jwt_secret: String,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        hasher: PasswordHasher,
        jwt_secret: impl Into<String>,
    ) -> Self {
        Self {
            users,
            refresh_tokens: RefreshTokenStore::new(refresh_tokens),
            hasher,
            jwt_secret: jwt_secret.into(),
        }
    }

    /// Create a user with a freshly hashed password
    ///
    /// # Errors
    /// - `Validation` if email or password is empty
    /// - `Storage(UniqueConstraintViolation)` if the email is taken
    pub async fn register(&self, email: &str, password: &str) -> Result<UserSummary, AppError> {
        let email = required("email", email)?;
        required("password", password)?;

        let password_hash = self.hasher.spawn_hash(password).await?;
        let user = self.users.create(email, &password_hash).await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    /// Authenticate with email and password
    ///
    /// Unknown email and wrong password fail identically with
    /// `Unauthenticated`.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<Duration>,
    ) -> Result<LoginOutcome, AppError> {
        let user = self.users.find_by_email(email.trim()).await?;
        // Unknown emails still pay for one bcrypt verify
        let password_matches = self
            .hasher
            .spawn_verify(password, user.as_ref().map(|u| u.password_hash.as_str()))
            .await?;

        let user = match user {
            Some(user) if password_matches => user,
            Some(user) => {
                tracing::warn!(user_id = %user.id, "Login attempt with wrong password");
                return Err(AppError::Unauthenticated);
            }
            None => {
                tracing::warn!("Login attempt for unknown email");
                return Err(AppError::Unauthenticated);
            }
        };

        let ttl = clamp_access_token_ttl(requested_ttl);
        let access_token = issue_access_token(user.id, &self.jwt_secret, ttl)?;
        let refresh_token = self.refresh_tokens.issue(user.id).await?;

        tracing::info!(
            user_id = %user.id,
            access_ttl_seconds = ttl.num_seconds(),
            "User logged in"
        );

        Ok(LoginOutcome {
            user: user.into(),
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new one-hour access token
    ///
    /// The refresh token itself is neither rotated nor extended.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AppError> {
        let owner = self.refresh_tokens.resolve_owner(refresh_token).await?;
        self.refresh_tokens.check_usable(refresh_token).await?;

        let access_token =
            issue_access_token(owner, &self.jwt_secret, default_access_token_ttl())?;

        tracing::info!(user_id = %owner, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke a refresh token
    ///
    /// Unknown tokens are a silent no-op so the response never reveals
    /// whether a token exists.
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AppError> {
        match self.refresh_tokens.revoke(refresh_token).await {
            Ok(()) => {
                tracing::info!("Refresh token revoked");
                Ok(())
            }
            Err(AuthError::NotFound) => {
                tracing::debug!("Revoke requested for unknown refresh token");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify an access token and return the user it was issued to
    ///
    /// Every protected operation goes through here. A user deleted after
    /// issuance still authenticates until the token expires.
    pub fn authenticate(&self, access_token: &str) -> Result<Uuid, AppError> {
        Ok(verify_access_token(access_token, &self.jwt_secret)?)
    }

    /// Whether `requester` may modify a resource owned by `resource_owner`
    pub fn authorize_ownership(resource_owner: Uuid, requester: Uuid) -> bool {
        resource_owner == requester
    }

    /// `authorize_ownership` as a `Forbidden` error
    pub fn ensure_owner(resource_owner: Uuid, requester: Uuid) -> Result<(), AppError> {
        if Self::authorize_ownership(resource_owner, requester) {
            Ok(())
        } else {
            Err(AppError::Forbidden("not the owner".to_string()))
        }
    }

    /// Replace a user's email and password, then sign out every device
    pub async fn change_credentials(
        &self,
        user_id: Uuid,
        email: &str,
        password: &str,
    ) -> Result<UserSummary, AppError> {
        let email = required("email", email)?;
        required("password", password)?;

        let password_hash = self.hasher.spawn_hash(password).await?;
        let user = self
            .users
            .update_credentials(user_id, email, &password_hash, Utc::now())
            .await?;

        tracing::info!(user_id = %user_id, "User credentials updated");
        Ok(user.into())
    }
}

fn required<'a>(field: &str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field.to_string()));
    }
    Ok(trimmed)
}
