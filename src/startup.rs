use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::{PasswordHasher, SessionService};
use crate::configuration::Settings;
use crate::error::AuthError;
use crate::metrics::{CountHits, HitCounter};
use crate::routes::{
    create_chirp, delete_chirp, get_chirp, health_check, list_chirps, login, metrics,
    polka_webhook, refresh, register, reset, revoke, update_credentials,
};
use crate::store::{ChirpRepository, RefreshTokenRepository, UserRepository};

/// Deployment platform name
#[derive(Clone, Debug)]
pub struct Platform(pub String);

impl Platform {
    pub fn is_dev(&self) -> bool {
        self.0 == "dev"
    }
}

/// API key the billing webhook must present
#[derive(Clone)]
pub struct WebhookKey(pub String);

/// Everything the handlers share
#[derive(Clone)]
pub struct AppContext {
    pub session: SessionService,
    pub users: Arc<dyn UserRepository>,
    pub chirps: Arc<dyn ChirpRepository>,
    pub hits: HitCounter,
    pub platform: Platform,
    pub webhook_key: WebhookKey,
    pub static_dir: String,
}

impl AppContext {
    /// Wire the context from settings over a store implementing every
    /// repository
    ///
    /// # Errors
    /// Fails if the configured bcrypt cost is rejected
    pub fn build<S>(settings: &Settings, store: S) -> Result<Self, AuthError>
    where
        S: UserRepository + RefreshTokenRepository + ChirpRepository + Clone + 'static,
    {
        let users: Arc<dyn UserRepository> = Arc::new(store.clone());
        let refresh_tokens: Arc<dyn RefreshTokenRepository> = Arc::new(store.clone());
        let chirps: Arc<dyn ChirpRepository> = Arc::new(store);

        let session = SessionService::new(
            users.clone(),
            refresh_tokens,
            PasswordHasher::new(settings.auth.password_hash_cost)?,
            settings.auth.jwt_secret.clone(),
        );

        Ok(Self {
            session,
            users,
            chirps,
            hits: HitCounter::new(),
            platform: Platform(settings.application.platform.clone()),
            webhook_key: WebhookKey(settings.auth.polka_key.clone()),
            static_dir: "./public".to_string(),
        })
    }
}

pub fn run(listener: TcpListener, context: AppContext) -> Result<Server, std::io::Error> {
    let session = web::Data::new(context.session);
    let users = web::Data::new(context.users);
    let chirps = web::Data::new(context.chirps);
    let hits = web::Data::new(context.hits.clone());
    let platform = web::Data::new(context.platform);
    let webhook_key = web::Data::new(context.webhook_key);
    let counter = context.hits;
    let static_dir = context.static_dir;

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            // Shared state
            .app_data(session.clone())
            .app_data(users.clone())
            .app_data(chirps.clone())
            .app_data(hits.clone())
            .app_data(platform.clone())
            .app_data(webhook_key.clone())
            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/users", web::post().to(register))
                    .route("/users", web::put().to(update_credentials))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/chirps", web::post().to(create_chirp))
                    .route("/chirps", web::get().to(list_chirps))
                    .route("/chirps/{chirp_id}", web::get().to(get_chirp))
                    .route("/chirps/{chirp_id}", web::delete().to(delete_chirp))
                    .route("/polka/webhooks", web::post().to(polka_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )
            .service(
                web::scope("/app")
                    .wrap(CountHits::new(counter.clone()))
                    .service(fs::Files::new("", static_dir.clone()).index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
