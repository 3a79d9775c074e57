//! Service configuration, read from the process environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

use crate::storage::StoreLocation;

/// Default store when `DATABASE_URL` is unset.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:///./test.db";

/// Default listen address when neither `BIND_ADDR` nor `PORT` is set.
pub const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8000);

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("empty database url")]
    EmptyDatabaseUrl,

    #[error("unsupported database url scheme `{0}`, only sqlite is supported")]
    UnsupportedScheme(String),

    #[error("invalid bind address `{value}`: {reason}")]
    InvalidBind { value: String, reason: String },

    #[error("invalid port `{0}`")]
    InvalidPort(String),
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// The schema is dropped and recreated on every startup.
    #[default]
    Development,
    /// Data survives restarts.
    Production,
}

impl Environment {
    /// Anything other than `development` keeps existing data.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("development") {
            Environment::Development
        } else {
            Environment::Production
        }
    }

    pub fn resets_schema(self) -> bool {
        self == Environment::Development
    }
}

/// Cross-origin allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllowedOrigins {
    /// `*`: every origin is allowed.
    #[default]
    Any,
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parse a comma-separated list. A `*` entry allows everything.
    pub fn parse(value: &str) -> Self {
        let origins: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.is_empty() || origins.iter().any(|origin| origin == "*") {
            AllowedOrigins::Any
        } else {
            AllowedOrigins::List(origins)
        }
    }
}

/// Map a connection string onto a SQLite location.
///
/// Accepts `sqlite:///relative.db`, `sqlite:////absolute.db`,
/// `sqlite://:memory:`, `sqlite::memory:`, `:memory:` and bare paths.
pub fn parse_database_url(url: &str) -> Result<StoreLocation, ConfigError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ConfigError::EmptyDatabaseUrl);
    }
    // Render hands out postgres:// urls
    let url = match url.strip_prefix("postgres://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => url.to_string(),
    };
    let url = url.split('?').next().unwrap_or_default();

    if url == ":memory:" {
        return Ok(StoreLocation::Memory);
    }

    if let Some(rest) = url.strip_prefix("sqlite:") {
        let path = rest
            .strip_prefix("///")
            .or_else(|| rest.strip_prefix("//"))
            .unwrap_or(rest);
        return Ok(if path.is_empty() || path == ":memory:" {
            StoreLocation::Memory
        } else {
            StoreLocation::file(path)
        });
    }

    if let Some((scheme, _)) = url.split_once("://") {
        return Err(ConfigError::UnsupportedScheme(scheme.to_string()));
    }

    Ok(StoreLocation::file(url))
}

/// Service configuration options.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Where the tree table lives.
    pub store: StoreLocation,
    /// Decides whether the schema is reset on startup.
    pub environment: Environment,
    /// CORS allow-list.
    pub allowed_origins: AllowedOrigins,
    /// Listen address.
    pub bind: SocketAddr,
    /// Enable debug logging.
    pub verbose: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreLocation::file("./test.db"),
            environment: Environment::default(),
            allowed_origins: AllowedOrigins::default(),
            bind: DEFAULT_BIND_ADDR,
            verbose: false,
        }
    }
}

impl ServiceConfig {
    /// Create a new configuration with the given store.
    pub fn new(store: StoreLocation) -> Self {
        Self {
            store,
            ..Default::default()
        }
    }

    /// Read `DATABASE_URL`, `ENVIRONMENT`, `ALLOWED_ORIGINS`, `BIND_ADDR`
    /// and `PORT` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] with a custom variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let store = parse_database_url(&database_url)?;

        let environment = lookup("ENVIRONMENT")
            .map(|value| Environment::parse(&value))
            .unwrap_or_default();

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|value| AllowedOrigins::parse(&value))
            .unwrap_or_default();

        let mut bind = match lookup("BIND_ADDR") {
            Some(value) => parse_bind(&value)?,
            None => DEFAULT_BIND_ADDR,
        };
        if let Some(port) = lookup("PORT") {
            let port = port
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
            bind = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), port);
        }

        Ok(Self {
            store,
            environment,
            allowed_origins,
            bind,
            verbose: false,
        })
    }

    /// Set the store location.
    pub fn store(mut self, store: StoreLocation) -> Self {
        self.store = store;
        self
    }

    /// Set the environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the CORS allow-list.
    pub fn allowed_origins(mut self, origins: AllowedOrigins) -> Self {
        self.allowed_origins = origins;
        self
    }

    /// Set the listen address.
    pub fn bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Set verbose flag.
    pub fn verbose(mut self, value: bool) -> Self {
        self.verbose = value;
        self
    }
}

/// Parse a listen address.
pub fn parse_bind(value: &str) -> Result<SocketAddr, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::InvalidBind {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_parse_sqlite_urls() {
        assert_eq!(
            parse_database_url("sqlite:///./test.db").unwrap(),
            StoreLocation::file("./test.db")
        );
        assert_eq!(
            parse_database_url("sqlite:////var/lib/tree.db").unwrap(),
            StoreLocation::file("/var/lib/tree.db")
        );
        assert_eq!(
            parse_database_url("sqlite:data/tree.db?mode=rwc").unwrap(),
            StoreLocation::file("data/tree.db")
        );
        assert_eq!(parse_database_url("tree.db").unwrap(), StoreLocation::file("tree.db"));
    }

    #[test]
    fn test_parse_memory_urls() {
        for url in [":memory:", "sqlite::memory:", "sqlite://:memory:", "sqlite://"] {
            assert_eq!(parse_database_url(url).unwrap(), StoreLocation::Memory, "{url}");
        }
    }

    #[test]
    fn test_parse_rejects_other_backends() {
        assert_eq!(
            parse_database_url("postgres://u:p@host/db"),
            Err(ConfigError::UnsupportedScheme("postgresql".into()))
        );
        assert_eq!(
            parse_database_url("mysql://host/db"),
            Err(ConfigError::UnsupportedScheme("mysql".into()))
        );
        assert_eq!(parse_database_url("  "), Err(ConfigError::EmptyDatabaseUrl));
    }

    #[test]
    fn test_environment() {
        assert!(Environment::parse("development").resets_schema());
        assert!(Environment::parse("Development").resets_schema());
        assert!(!Environment::parse("production").resets_schema());
        assert!(!Environment::parse("staging").resets_schema());
    }

    #[test]
    fn test_allowed_origins() {
        assert_eq!(AllowedOrigins::parse("*"), AllowedOrigins::Any);
        assert_eq!(AllowedOrigins::parse(""), AllowedOrigins::Any);
        assert_eq!(
            AllowedOrigins::parse("https://a.example, https://b.example,"),
            AllowedOrigins::List(vec!["https://a.example".into(), "https://b.example".into()])
        );
        assert_eq!(AllowedOrigins::parse("https://a.example,*"), AllowedOrigins::Any);
    }

    #[test]
    fn test_defaults_from_empty_env() {
        let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.store, StoreLocation::file("./test.db"));
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.allowed_origins, AllowedOrigins::Any);
        assert_eq!(config.bind, DEFAULT_BIND_ADDR);
    }

    #[test]
    fn test_from_env_values() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite://:memory:"),
            ("ENVIRONMENT", "production"),
            ("ALLOWED_ORIGINS", "https://app.example"),
            ("BIND_ADDR", "127.0.0.1:9000"),
        ]))
        .unwrap();
        assert_eq!(config.store, StoreLocation::Memory);
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(
            config.allowed_origins,
            AllowedOrigins::List(vec!["https://app.example".into()])
        );
        assert_eq!(config.bind, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn test_port_overrides_bind() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("PORT", "10000"),
        ]))
        .unwrap();
        assert_eq!(config.bind, "0.0.0.0:10000".parse().unwrap());

        let err = ServiceConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort("http".into()));
    }

    #[test]
    fn test_invalid_bind() {
        let err = ServiceConfig::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBind { .. }));
    }
}
