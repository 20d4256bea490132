//! Service configuration loaded from the environment
//!
//! `main` loads an optional `.env` file first, so every variable below can
//! live there during development.

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_CACHE_MAX_ENTRIES: u64 = 1000;
const DEFAULT_HOST: &str = "localhost";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GRAPHQL_ENDPOINT is not set")]
    MissingEndpoint,

    #[error("GRAPHQL_ENDPOINT is not a valid http(s) URL: {0}")]
    InvalidEndpoint(String),
}

/// Runtime configuration
///
/// # Environment Variables
///
/// - `GRAPHQL_ENDPOINT` - Content service URL (required)
/// - `PORT` - Server port number (default: 8080)
/// - `FETCH_TIMEOUT_SECS` - Bound on one content query (default: 10)
/// - `CACHE_TTL_SECS` - Lifetime of cached pages, 0 disables the cache (default: 300)
/// - `CACHE_MAX_ENTRIES` - Cache capacity (default: 1000)
/// - `DEFAULT_HOST` - Host used when a request has no `Host` header (default: "localhost")
#[derive(Debug, Clone)]
pub struct Config {
    pub graphql_endpoint: Url,
    pub port: u16,
    pub fetch_timeout: Duration,
    /// `None` when caching is disabled
    pub cache_ttl: Option<Duration>,
    pub cache_max_entries: u64,
    pub default_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = env::var("GRAPHQL_ENDPOINT").map_err(|_| ConfigError::MissingEndpoint)?;
        let mut config = Self::new(parse_endpoint(&endpoint)?);

        config.port = env_parse("PORT").unwrap_or(DEFAULT_PORT);
        config.fetch_timeout =
            Duration::from_secs(env_parse("FETCH_TIMEOUT_SECS").unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS));
        config.cache_ttl = match env_parse::<u64>("CACHE_TTL_SECS").unwrap_or(DEFAULT_CACHE_TTL_SECS) {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        config.cache_max_entries = env_parse("CACHE_MAX_ENTRIES").unwrap_or(DEFAULT_CACHE_MAX_ENTRIES);
        if let Ok(host) = env::var("DEFAULT_HOST") {
            if !host.is_empty() {
                config.default_host = host;
            }
        }

        Ok(config)
    }

    /// Configuration with defaults for everything but the endpoint
    pub fn new(graphql_endpoint: Url) -> Self {
        Self {
            graphql_endpoint,
            port: DEFAULT_PORT,
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            cache_ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            default_host: DEFAULT_HOST.to_string(),
        }
    }

    /// Public site URL that redirected visitors are sent to
    pub fn site_base(&self) -> String {
        site_base(self.graphql_endpoint.as_str())
    }
}

pub fn parse_endpoint(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidEndpoint(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidEndpoint(format!("unsupported scheme {other}"))),
    }
}

/// Derives the site base from the GraphQL endpoint
///
/// `https://cms.example.com/graphql/` -> `https://cms.example.com/`
pub fn site_base(endpoint: &str) -> String {
    if endpoint.contains("/graphql/") {
        return endpoint.replacen("/graphql/", "/", 1);
    }
    if let Some(stripped) = endpoint.strip_suffix("/graphql") {
        return format!("{stripped}/");
    }
    if endpoint.ends_with('/') {
        endpoint.to_string()
    } else {
        format!("{endpoint}/")
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
