use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
    /// Deployment platform marker. Destructive admin endpoints are only
    /// honored when this is `"dev"`.
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

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token signing and session settings.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    /// Symmetric signing key, loaded once at startup and never rotated
    /// during a run.
    pub secret: String,
    pub issuer: String,
    /// Access token lifetime in seconds. Also the hard upper bound: mint
    /// requests for a longer lifetime are capped to this value.
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (on the order of 60 days).
    pub refresh_token_ttl: i64,
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}
