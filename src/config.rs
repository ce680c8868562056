//! Application-level configuration loaded from the environment at startup.

use std::{env, fmt, net::IpAddr, net::SocketAddr, str::FromStr};

use bson::oid::ObjectId;
use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

const DEFAULT_MONGO_URI: &str = "mongodb://localhost:27017";
const DEFAULT_DB: &str = "runboard";
const DEFAULT_PORT: u16 = 8080;
const GENERATED_SECRET_LEN: usize = 64;

/// Error raised when the environment holds an unusable value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `SECRET_KEY` is unset outside debug mode.
    #[error("SECRET_KEY must be set unless ENV_DEBUG is enabled")]
    MissingSecret,
    /// A variable could not be parsed.
    #[error("invalid value `{value}` for {var}")]
    Invalid {
        /// Offending variable.
        var: &'static str,
        /// Raw value as found in the environment.
        value: String,
    },
}

/// Which document store backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// MongoDB reached through `MONGO_URI`.
    Mongo,
    /// Process-local store, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// Immutable runtime configuration shared across the application.
#[derive(Clone)]
pub struct AppConfig {
    /// MongoDB connection string.
    pub mongo_uri: String,
    /// MongoDB database name.
    pub mongo_db: String,
    /// Secret used to sign session cookies.
    pub secret_key: Vec<u8>,
    /// True when `secret_key` was generated because none was configured.
    pub secret_generated: bool,
    /// Address the HTTP server binds to.
    pub ip: IpAddr,
    /// Port the HTTP server binds to.
    pub port: u16,
    /// Verbose logging and a generated secret are allowed.
    pub debug: bool,
    /// Store implementation to connect at startup.
    pub store_backend: StoreBackend,
    /// Game shown by `GET /`.
    pub default_game_id: Option<ObjectId>,
    /// Category shown by `GET /`.
    pub default_category_id: Option<ObjectId>,
    /// Password for an `admin` account created at startup when none exists.
    pub admin_password: Option<String>,
}

impl AppConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let debug = get("ENV_DEBUG").is_some_and(|value| is_truthy(&value));

        let (secret_key, secret_generated) = match get("SECRET_KEY") {
            Some(secret) => (secret.into_bytes(), false),
            None if debug => (generate_secret(), true),
            None => return Err(ConfigError::MissingSecret),
        };

        let ip = match get("IP") {
            Some(value) => parse("IP", value)?,
            None => IpAddr::from([0, 0, 0, 0]),
        };
        let port = match get("PORT") {
            Some(value) => parse("PORT", value)?,
            None => DEFAULT_PORT,
        };
        let store_backend = match get("STORE_BACKEND") {
            Some(value) => parse("STORE_BACKEND", value)?,
            None => StoreBackend::Mongo,
        };

        Ok(Self {
            mongo_uri: get("MONGO_URI").unwrap_or_else(|| DEFAULT_MONGO_URI.into()),
            mongo_db: get("MONGO_DBNAME").unwrap_or_else(|| DEFAULT_DB.into()),
            secret_key,
            secret_generated,
            ip,
            port,
            debug,
            store_backend,
            default_game_id: get("DEFAULT_GAME_ID")
                .map(|value| parse_object_id("DEFAULT_GAME_ID", value))
                .transpose()?,
            default_category_id: get("DEFAULT_CATEGORY_ID")
                .map(|value| parse_object_id("DEFAULT_CATEGORY_ID", value))
                .transpose()?,
            admin_password: lookup("ADMIN_PASSWORD").filter(|value| !value.is_empty()),
        })
    }

    /// Socket address for the HTTP listener.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Log the effective configuration, never including secrets.
    pub fn log_summary(&self) {
        info!(
            addr = %self.bind_addr(),
            backend = ?self.store_backend,
            database = %self.mongo_db,
            debug = self.debug,
            "loaded configuration"
        );
        if self.secret_generated {
            warn!("SECRET_KEY not set; using a random key, sessions end on restart");
        }
        if self.default_game_id.is_none() || self.default_category_id.is_none() {
            info!("no default leaderboard configured; `/` shows the first category of the first game");
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("mongo_uri", &self.mongo_uri)
            .field("mongo_db", &self.mongo_db)
            .field("secret_key", &"<redacted>")
            .field("ip", &self.ip)
            .field("port", &self.port)
            .field("debug", &self.debug)
            .field("store_backend", &self.store_backend)
            .field("default_game_id", &self.default_game_id)
            .field("default_category_id", &self.default_category_id)
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(value.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

fn parse_object_id(var: &'static str, value: String) -> Result<ObjectId, ConfigError> {
    ObjectId::parse_str(value.trim()).map_err(|_| ConfigError::Invalid { var, value })
}

fn generate_secret() -> Vec<u8> {
    let mut secret = vec![0u8; GENERATED_SECRET_LEN];
    rand::rng().fill(secret.as_mut_slice());
    secret
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[("SECRET_KEY", "s3cret")]).unwrap();
        assert_eq!(config.mongo_uri, DEFAULT_MONGO_URI);
        assert_eq!(config.mongo_db, DEFAULT_DB);
        assert_eq!(config.bind_addr(), SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.store_backend, StoreBackend::Mongo);
        assert_eq!(config.secret_key, b"s3cret");
        assert!(!config.debug);
        assert!(!config.secret_generated);
    }

    #[test]
    fn secret_is_required_outside_debug() {
        assert_eq!(load(&[]).unwrap_err(), ConfigError::MissingSecret);
        assert_eq!(
            load(&[("ENV_DEBUG", "false")]).unwrap_err(),
            ConfigError::MissingSecret
        );

        let config = load(&[("ENV_DEBUG", "1")]).unwrap();
        assert!(config.debug);
        assert!(config.secret_generated);
        assert_eq!(config.secret_key.len(), GENERATED_SECRET_LEN);
    }

    #[test]
    fn parses_all_overrides() {
        let game = ObjectId::new();
        let category = ObjectId::new();
        let config = load(&[
            ("SECRET_KEY", "k"),
            ("IP", "127.0.0.1"),
            ("PORT", "5000"),
            ("STORE_BACKEND", "Memory"),
            ("MONGO_DBNAME", "boards"),
            ("DEFAULT_GAME_ID", &game.to_hex()),
            ("DEFAULT_CATEGORY_ID", &category.to_hex()),
            ("ADMIN_PASSWORD", "hunter2"),
        ])
        .unwrap();

        assert_eq!(config.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 5000)));
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.mongo_db, "boards");
        assert_eq!(config.default_game_id, Some(game));
        assert_eq!(config.default_category_id, Some(category));
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn rejects_malformed_values() {
        assert_eq!(
            load(&[("SECRET_KEY", "k"), ("PORT", "eighty")]).unwrap_err(),
            ConfigError::Invalid {
                var: "PORT",
                value: "eighty".into()
            }
        );
        assert!(matches!(
            load(&[("SECRET_KEY", "k"), ("DEFAULT_GAME_ID", "nope")]),
            Err(ConfigError::Invalid {
                var: "DEFAULT_GAME_ID",
                ..
            })
        ));
        assert!(matches!(
            load(&[("SECRET_KEY", "k"), ("STORE_BACKEND", "couch")]),
            Err(ConfigError::Invalid { var: "STORE_BACKEND", .. })
        ));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = load(&[("SECRET_KEY", "topsecret"), ("ADMIN_PASSWORD", "pw")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("topsecret"));
        assert!(!rendered.contains("\"pw\""));
    }
}
