//! Process configuration, read once at startup.
//!
//! `ENV` selects which set of `<MODE>_DB_*` variables describes the database.
//! Anything required that is missing or unparsable is a [`ConfigError`], and
//! `main` refuses to start on it.

use sqlx::postgres::PgConnectOptions;
use std::env;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Test,
    Prod,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEV" => Some(Environment::Dev),
            "TEST" => Some(Environment::Test),
            "PROD" => Some(Environment::Prod),
            _ => None,
        }
    }

    /// Prefix of the database variables for this mode, e.g. `DEV`.
    pub fn prefix(&self) -> &'static str {
        match self {
            Environment::Dev => "DEV",
            Environment::Test => "TEST",
            Environment::Prod => "PROD",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(String),
    Invalid { key: String, reason: String },
    UnknownEnvironment(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid { key, reason } => write!(f, "{} is invalid: {}", key, reason),
            ConfigError::UnknownEnvironment(value) => {
                write!(f, "Unknown ENV: {:?} (expected DEV, TEST or PROD)", value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub bcrypt_cost: u32,
    pub shutdown_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
}

impl Config {
    /// Reads the process environment. `main` loads `.env` before calling this.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars(lookup);

        let mode = vars.required("ENV")?;
        let environment =
            Environment::parse(&mode).ok_or(ConfigError::UnknownEnvironment(mode))?;
        let prefix = environment.prefix();

        let database = DatabaseConfig {
            host: vars.required(&format!("{}_DB_HOST", prefix))?,
            port: vars.parsed(&format!("{}_DB_PORT", prefix), 5432)?,
            user: vars.required(&format!("{}_DB_USER", prefix))?,
            password: vars.required(&format!("{}_DB_PASSWORD", prefix))?,
            name: vars.required(&format!("{}_DB_NAME", prefix))?,
            max_connections: vars.parsed("DB_MAX_CONNECTIONS", 10)?,
        };

        let bcrypt_cost = vars.parsed("BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST".into(),
                reason: format!("{} is outside 4..=31", bcrypt_cost),
            });
        }

        Ok(Self {
            environment,
            database,
            jwt_secret: vars.required("JWT_SECRET")?,
            server_host: vars
                .optional("SERVER_HOST")
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            server_port: vars.parsed("SERVER_PORT", 8080)?,
            bcrypt_cost,
            shutdown_timeout: Duration::from_secs(vars.parsed("SHUTDOWN_TIMEOUT_SECS", 5)?),
            cors_allowed_origin: vars.optional("CORS_ALLOWED_ORIGIN"),
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

struct Vars<F>(F);

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Empty values count as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }

    fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: fmt::Display,
    {
        match self.optional(key) {
            Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(default),
        }
    }
}
