use std::time::Duration;

use crate::constants;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Base for problem URLs and root-relative image paths
    pub source_base_url: String,
    pub fetch_timeout: Duration,
    pub fetch_max_attempts: u32,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env_parse("PORT").unwrap_or(8081);

        Self {
            host,
            port,
            source_base_url: std::env::var("SOURCE_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| constants::DEFAULT_SOURCE_BASE_URL.to_string()),
            fetch_timeout: Duration::from_secs(env_parse("FETCH_TIMEOUT_SECS").unwrap_or(20)),
            fetch_max_attempts: env_parse("FETCH_MAX_ATTEMPTS").unwrap_or(3).max(1),
            user_agent: std::env::var("USER_AGENT").unwrap_or_else(|_| {
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
            }),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_address(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
