//! Process Configuration
//!
//! All options come from environment variables, are read once at start-up and
//! never reloaded. Every option has a default, so an empty environment yields a
//! runnable local setup (Elasticsearch on 9200, Redis on 6379).

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{GatewayError, Result};

/// Value of `REDIS_ADDR` selecting the in-process store instead of Redis.
pub const MEMORY_CACHE_ADDR: &str = "memory";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_host: String,
    pub server_port: u16,
    pub elasticsearch_url: String,
    pub elasticsearch_index: String,
    pub backend_timeout: Duration,
    pub backend_attempts: usize,
    pub redis_addr: String,
    pub redis_password: String,
    pub cache_ttl: Duration,
    pub write_back_capacity: usize,
    pub geo_db_path: Option<PathBuf>,
    pub blocklist_path: Option<PathBuf>,
    pub trust_forwarded_for: bool,
    /// Peers whose proxy headers are honoured. Empty means any peer, once
    /// `trust_forwarded_for` is on.
    pub trusted_proxies: Vec<IpAddr>,
    /// Browser origins allowed to call the API. Empty or `*` allows any.
    pub cors_allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            server_port: 8080,
            elasticsearch_url: "http://localhost:9200".to_string(),
            elasticsearch_index: "webpages".to_string(),
            backend_timeout: Duration::from_millis(5000),
            backend_attempts: 1,
            redis_addr: "localhost:6379".to_string(),
            redis_password: String::new(),
            cache_ttl: Duration::from_secs(300),
            write_back_capacity: 1024,
            geo_db_path: None,
            blocklist_path: None,
            trust_forwarded_for: false,
            trusted_proxies: Vec::new(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Split out from `from_env` so tests can feed a map instead of mutating
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_host: get("BIND_HOST").unwrap_or(defaults.bind_host),
            server_port: parse_or(get("SERVER_PORT"), "SERVER_PORT", defaults.server_port),
            elasticsearch_url: get("ELASTICSEARCH_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.elasticsearch_url),
            elasticsearch_index: get("ELASTICSEARCH_INDEX").unwrap_or(defaults.elasticsearch_index),
            backend_timeout: Duration::from_millis(parse_or(
                get("BACKEND_TIMEOUT_MS"),
                "BACKEND_TIMEOUT_MS",
                defaults.backend_timeout.as_millis() as u64,
            )),
            backend_attempts: parse_or(
                get("BACKEND_ATTEMPTS"),
                "BACKEND_ATTEMPTS",
                defaults.backend_attempts,
            )
            .max(1),
            redis_addr: get("REDIS_ADDR").unwrap_or(defaults.redis_addr),
            // An empty password is meaningful, so read it without the blank filter.
            redis_password: lookup("REDIS_PASSWORD").unwrap_or(defaults.redis_password),
            cache_ttl: Duration::from_secs(parse_or(
                get("CACHE_TTL_SECS"),
                "CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            write_back_capacity: parse_or(
                get("WRITE_BACK_CAPACITY"),
                "WRITE_BACK_CAPACITY",
                defaults.write_back_capacity,
            )
            .max(1),
            geo_db_path: get("GEO_DB_PATH").map(PathBuf::from),
            blocklist_path: get("BLOCKLIST_PATH").map(PathBuf::from),
            trust_forwarded_for: get("TRUST_FORWARDED_FOR")
                .map(|v| parse_bool(&v, defaults.trust_forwarded_for))
                .unwrap_or(defaults.trust_forwarded_for),
            trusted_proxies: get("TRUSTED_PROXIES")
                .map(|v| parse_ip_list(&v, "TRUSTED_PROXIES"))
                .unwrap_or(defaults.trusted_proxies),
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.cors_allowed_origins),
        }
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.bind_host, self.server_port)
            .parse()
            .map_err(|e| GatewayError::Config(format!("invalid bind address: {}", e)))
    }

    /// Connection URL for the redis client, credential included (percent-encoded)
    /// when set.
    pub fn redis_url(&self) -> String {
        if self.redis_password.is_empty() {
            format!("redis://{}/0", self.redis_addr)
        } else {
            format!(
                "redis://:{}@{}/0",
                urlencoding::encode(&self.redis_password),
                self.redis_addr
            )
        }
    }

    pub fn uses_memory_cache(&self) -> bool {
        self.redis_addr.eq_ignore_ascii_case(MEMORY_CACHE_ADDR)
    }

    /// One-line summary for the startup log, with the credential redacted.
    pub fn summary(&self) -> String {
        format!(
            "port={} backend={}/{} timeout={:?} cache={} auth={} ttl={:?} geo_db={:?} blocklist={:?}",
            self.server_port,
            self.elasticsearch_url,
            self.elasticsearch_index,
            self.backend_timeout,
            self.redis_addr,
            if self.redis_password.is_empty() { "none" } else { "***" },
            self.cache_ttl,
            self.geo_db_path,
            self.blocklist_path,
        )
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<String>, key: &str, default: T) -> T {
    match raw {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!("Ignoring unparsable {}={:?}, using default", key, value);
                default
            }
        },
        None => default,
    }
}

fn parse_ip_list(raw: &str, key: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .filter_map(|v| match v.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!("Ignoring invalid address {:?} in {}", v, key);
                None
            }
        })
        .collect()
}

fn parse_bool(raw: &str, default: bool) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
