/// Authentication Routes
///
/// Handles registration, login, token refresh, token revocation and
/// credential changes. All protocol decisions live in `SessionService`;
/// these handlers only translate between HTTP and the service.

use actix_web::{web, HttpResponse};
use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::SessionService;
use crate::error::{AppError, ErrorContext};
use crate::extractors::{AuthenticatedUser, BearerToken};

/// Registration and credential update request
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// Login request
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Optional shorter access token lifetime
    pub expires_in_seconds: Option<i64>,
}

/// Refresh response
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /api/users
///
/// # Errors
/// - 400: Empty email or password
/// - 409: Email already registered
pub async fn register(
    form: web::Json<CredentialsRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_registration");

    let user = session
        .register(&form.email, &form.password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    Ok(HttpResponse::Created().json(user))
}

/// PUT /api/users
///
/// **Requires a valid access token.** Replaces the caller's email and
/// password and revokes all of their refresh tokens.
pub async fn update_credentials(
    user: AuthenticatedUser,
    form: web::Json<CredentialsRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_update").with_user_id(user.id().to_string());

    let updated = session
        .change_credentials(user.id(), &form.email, &form.password)
        .await
        .map_err(|e| {
            context.log_error(&e);
            e
        })?;

    Ok(HttpResponse::Ok().json(updated))
}

/// POST /api/login
///
/// Returns the user profile with an access token (`token`) and a refresh
/// token (`refresh_token`).
///
/// # Security Notes
/// - Unknown email and wrong password produce the same 401 response
/// - `expires_in_seconds` can only shorten the one-hour default
pub async fn login(
    form: web::Json<LoginRequest>,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::new("user_login");

    let outcome = session
        .login(
            &form.email,
            &form.password,
            form.expires_in_seconds.and_then(Duration::try_seconds),
        )
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %outcome.user.id,
        "Login succeeded"
    );

    Ok(HttpResponse::Ok().json(outcome))
}

/// POST /api/refresh
///
/// Takes the refresh token as `Authorization: Bearer <refresh_token>` and
/// returns a new one-hour access token.
///
/// # Errors
/// - 401: Missing, unknown, revoked or expired refresh token
pub async fn refresh(
    token: BearerToken,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    let access_token = session.refresh(&token.0).await?;

    Ok(HttpResponse::Ok().json(TokenResponse { token: access_token }))
}

/// POST /api/revoke
///
/// Always 204 for a well-formed request, whether or not the token exists.
pub async fn revoke(
    token: BearerToken,
    session: web::Data<SessionService>,
) -> Result<HttpResponse, AppError> {
    session.revoke(&token.0).await?;

    Ok(HttpResponse::NoContent().finish())
}
