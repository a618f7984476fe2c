//! Request extractors for credentials.
//!
//! Handlers take these as arguments instead of reading headers
//! themselves:
//!
//! ```ignore
//! // 401 unless a valid access token is presented
//! async fn protected(user: AuthenticatedUser) -> HttpResponse {
//!     HttpResponse::Ok().body(user.id().to_string())
//! }
//! ```

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::auth::{api_key, bearer_token, SessionService};
use crate::error::AppError;

/// A user whose bearer access token verified against the signing secret
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

impl AuthenticatedUser {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AppError> {
    let session = req
        .app_data::<web::Data<SessionService>>()
        .ok_or_else(|| AppError::Internal("session service not configured".to_string()))?;

    let token = bearer_token(req.headers())?;
    let user_id = session.authenticate(&token)?;

    tracing::debug!(user_id = %user_id, "Access token verified");
    Ok(AuthenticatedUser(user_id))
}

/// The raw value of `Authorization: Bearer <token>`, unverified
///
/// Used where the bearer value is a refresh token.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(
            bearer_token(req.headers())
                .map(BearerToken)
                .map_err(AppError::from),
        )
    }
}

/// The raw value of `Authorization: ApiKey <key>`, unverified
#[derive(Debug, Clone)]
pub struct ApiKey(pub String);

impl FromRequest for ApiKey {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(api_key(req.headers()).map(ApiKey).map_err(AppError::from))
    }
}
