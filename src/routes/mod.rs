mod admin;
mod auth;
mod chirps;
mod health_check;
mod webhooks;

pub use admin::{metrics, reset};
pub use auth::{login, refresh, register, revoke, update_credentials};
pub use chirps::{create_chirp, delete_chirp, get_chirp, list_chirps};
pub use health_check::health_check;
pub use webhooks::polka_webhook;
