/// Admin Routes
///
/// Hit-count reporting and the development-only reset.

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::error::AppError;
use crate::metrics::HitCounter;
use crate::startup::Platform;
use crate::store::UserRepository;

/// GET /admin/metrics
pub async fn metrics(hits: web::Data<HitCounter>) -> HttpResponse {
    let body = format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {} times!</p>
  </body>
</html>"#,
        hits.get()
    );

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

/// POST /admin/reset
///
/// Only on the "dev" platform: zeroes the hit counter and deletes every
/// user (with their chirps and refresh tokens).
///
/// # Errors
/// - 403: Any other platform
pub async fn reset(
    platform: web::Data<Platform>,
    hits: web::Data<HitCounter>,
    users: web::Data<Arc<dyn UserRepository>>,
) -> Result<HttpResponse, AppError> {
    if !platform.is_dev() {
        return Err(AppError::Forbidden(format!(
            "reset is disabled on platform {}",
            platform.0
        )));
    }

    hits.reset();
    let deleted = users.delete_all().await?;

    tracing::warn!(deleted_users = deleted, "Application state reset");
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Hits reset to 0"))
}
