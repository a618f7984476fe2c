use crate::error::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    /// Deployment platform; destructive admin routes only run on "dev"
    pub platform: String,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// Authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// HMAC secret for access tokens
    pub jwt_secret: String,
    /// Key the billing webhook must present as `ApiKey <key>`
    pub polka_key: String,
    /// bcrypt work factor
    #[serde(default = "default_password_hash_cost")]
    pub password_hash_cost: u32,
}

fn default_password_hash_cost() -> u32 {
    bcrypt::DEFAULT_COST
}

impl Settings {
    /// Reject settings the server cannot run safely with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
        }
        if self.auth.polka_key.trim().is_empty() {
            return Err(ConfigError::MissingRequired("auth.polka_key".to_string()));
        }
        if !(4..=31).contains(&self.auth.password_hash_cost) {
            return Err(ConfigError::InvalidValue(format!(
                "auth.password_hash_cost must be between 4 and 31, got {}",
                self.auth.password_hash_cost
            )));
        }
        Ok(())
    }
}

/// Load settings from `configuration.yaml` (optional) and `APP_*` variables
///
/// Environment variables use `__` between nesting levels, e.g.
/// `APP_AUTH__JWT_SECRET`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
