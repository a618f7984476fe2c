/// Chirp Routes
///
/// Create, list, fetch and delete chirps. Creation and deletion require
/// an access token; deletion additionally requires ownership.

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::SessionService;
use crate::error::{AppError, ValidationError};
use crate::extractors::AuthenticatedUser;
use crate::store::{ChirpRepository, SortOrder};

#[derive(Deserialize)]
pub struct CreateChirpRequest {
    pub body: String,
}

#[derive(Deserialize)]
pub struct ListChirpsQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

impl ListChirpsQuery {
    fn author_id(&self) -> Result<Option<Uuid>, ValidationError> {
        match self.author_id.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| ValidationError::InvalidFormat("author_id".to_string())),
        }
    }

    fn order(&self) -> SortOrder {
        match self.sort.as_deref() {
            Some("desc") => SortOrder::Descending,
            _ => SortOrder::Ascending,
        }
    }
}

/// POST /api/chirps
pub async fn create_chirp(
    user: AuthenticatedUser,
    form: web::Json<CreateChirpRequest>,
    chirps: web::Data<Arc<dyn ChirpRepository>>,
) -> Result<HttpResponse, AppError> {
    if form.body.trim().is_empty() {
        return Err(ValidationError::EmptyField("body".to_string()).into());
    }

    let chirp = chirps.create(user.id(), &form.body).await?;

    tracing::info!(chirp_id = %chirp.id, user_id = %user.id(), "Chirp created");
    Ok(HttpResponse::Created().json(chirp))
}

/// GET /api/chirps?author_id=<uuid>&sort=asc|desc
pub async fn list_chirps(
    query: web::Query<ListChirpsQuery>,
    chirps: web::Data<Arc<dyn ChirpRepository>>,
) -> Result<HttpResponse, AppError> {
    let listed = chirps.list(query.author_id()?, query.order()).await?;

    Ok(HttpResponse::Ok().json(listed))
}

/// GET /api/chirps/{chirp_id}
pub async fn get_chirp(
    path: web::Path<String>,
    chirps: web::Data<Arc<dyn ChirpRepository>>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps
        .find_by_id(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("chirp".to_string()))?;

    Ok(HttpResponse::Ok().json(chirp))
}

/// DELETE /api/chirps/{chirp_id}
///
/// # Errors
/// - 401: Missing or invalid access token
/// - 403: The chirp exists but belongs to someone else
/// - 404: No such chirp
pub async fn delete_chirp(
    user: AuthenticatedUser,
    path: web::Path<String>,
    chirps: web::Data<Arc<dyn ChirpRepository>>,
) -> Result<HttpResponse, AppError> {
    let chirp_id = parse_chirp_id(&path)?;

    let chirp = chirps
        .find_by_id(chirp_id)
        .await?
        .ok_or_else(|| AppError::NotFound("chirp".to_string()))?;

    SessionService::ensure_owner(chirp.user_id, user.id())?;

    chirps.delete(chirp_id).await?;

    tracing::info!(chirp_id = %chirp_id, user_id = %user.id(), "Chirp deleted");
    Ok(HttpResponse::NoContent().finish())
}

// An unparseable id can never match a chirp
fn parse_chirp_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("chirp".to_string()))
}
