use std::env;
use std::time::Duration;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(600);

/// Application configuration parsed from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Origin session cookie (`TERABOX_COOKIE`), rotated by the operator.
    pub cookie: Option<String>,
    pub cache_ttl: Duration,
}

impl Config {
    /// Parse configuration from environment variables
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let cookie = env::var("TERABOX_COOKIE").ok().filter(|c| !c.is_empty());

        let cache_ttl = env::var("CACHE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_CACHE_TTL);

        Self {
            port,
            cookie,
            cache_ttl,
        }
    }
}
