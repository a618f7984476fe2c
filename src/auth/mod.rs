/// Authentication module
///
/// Handles password hashing, access token signing/verification, refresh
/// token management, credential extraction and the session protocol
/// built on top of them.

mod claims;
mod credentials;
mod jwt;
mod password;
mod refresh_token;
mod session;

pub use claims::Claims;
pub use credentials::{api_key, bearer_token, secrets_match, Credential, Scheme};
pub use jwt::issue_access_token;
pub use jwt::verify_access_token;
pub use password::PasswordHasher;
pub use refresh_token::{generate_refresh_token, hash_token, RefreshTokenStore};
pub use session::{
    clamp_access_token_ttl, default_access_token_ttl, LoginOutcome, SessionService, UserSummary,
};
