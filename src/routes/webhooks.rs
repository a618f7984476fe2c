/// Billing Webhook
///
/// Receives upgrade events from the payment provider and flips the
/// user's elevated tier flag.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::secrets_match;
use crate::error::{AppError, StorageError};
use crate::extractors::ApiKey;
use crate::startup::WebhookKey;
use crate::store::UserRepository;

const USER_UPGRADED: &str = "user.upgraded";

#[derive(Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    pub data: WebhookData,
}

#[derive(Deserialize)]
pub struct WebhookData {
    pub user_id: Uuid,
}

/// POST /api/polka/webhooks
///
/// # Errors
/// - 401: Missing or wrong `ApiKey`
/// - 404: `user.upgraded` for an unknown user
pub async fn polka_webhook(
    key: ApiKey,
    expected: web::Data<WebhookKey>,
    form: web::Json<WebhookEvent>,
    users: web::Data<Arc<dyn UserRepository>>,
) -> Result<HttpResponse, AppError> {
    if !secrets_match(&key.0, &expected.0) {
        tracing::warn!("Webhook called with wrong API key");
        return Err(AppError::Unauthenticated);
    }

    if form.event != USER_UPGRADED {
        tracing::debug!(event = %form.event, "Ignoring webhook event");
        return Ok(HttpResponse::NoContent().finish());
    }

    match users.set_elevated_tier(form.data.user_id, true).await {
        Ok(()) => {
            tracing::info!(user_id = %form.data.user_id, "User upgraded to Chirpy Red");
            Ok(HttpResponse::NoContent().finish())
        }
        Err(StorageError::NotFound(_)) => Err(AppError::NotFound("user".to_string())),
        Err(e) => Err(e.into()),
    }
}
