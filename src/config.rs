use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ZoneDiffConfig {
    /// Address the DNS query proxy binds to
    pub http_bind_addr: SocketAddr,

    /// DNS-over-HTTPS JSON endpoint the proxy forwards queries to
    pub upstream_doh_url: String,

    /// Timeout for upstream DoH requests and for proxy requests made by
    /// the live comparison client
    pub upstream_timeout: Duration,

    /// Base URL of the proxy used for live comparisons
    pub proxy_url: String,

    /// Max number of live queries in flight at once
    pub max_concurrent_queries: usize,

    /// Whether the proxy answers with permissive CORS headers
    pub enable_cors: bool,
}

impl Default for ZoneDiffConfig {
    fn default() -> Self {
        Self {
            http_bind_addr: "127.0.0.1:8080"
                .parse()
                .expect("Default HTTP bind address is valid"),
            upstream_doh_url: "https://cloudflare-dns.com/dns-query".to_string(),
            upstream_timeout: Duration::from_secs(5),
            proxy_url: "http://127.0.0.1:8080".to_string(),
            max_concurrent_queries: 8,
            enable_cors: true,
        }
    }
}

/// Overrides read from a TOML configuration file; absent keys keep the
/// current value
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    http_bind_addr: Option<String>,
    upstream_doh_url: Option<String>,
    upstream_timeout_secs: Option<u64>,
    proxy_url: Option<String>,
    max_concurrent_queries: Option<usize>,
    enable_cors: Option<bool>,
}

impl ZoneDiffConfig {
    /// Create a config from environment variables
    /// Returns Err if critical configuration is invalid
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML file on top of the defaults, then apply environment
    /// variables on top of that
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::ParseError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Parse TOML content on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let mut config = Self::default();

        if let Some(addr) = file.http_bind_addr {
            config.http_bind_addr = addr
                .parse()
                .map_err(|_| ConfigError::InvalidHttpBindAddress(addr))?;
        }
        if let Some(url) = file.upstream_doh_url {
            config.upstream_doh_url = url;
        }
        if let Some(secs) = file.upstream_timeout_secs {
            config.upstream_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = file.proxy_url {
            config.proxy_url = url;
        }
        if let Some(max) = file.max_concurrent_queries {
            config.max_concurrent_queries = max;
        }
        if let Some(enable_cors) = file.enable_cors {
            config.enable_cors = enable_cors;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(http_bind_addr) = std::env::var("ZONEDIFF_HTTP_BIND_ADDR") {
            self.http_bind_addr = http_bind_addr
                .parse()
                .map_err(|_| ConfigError::InvalidHttpBindAddress(http_bind_addr))?;
        }

        if let Ok(upstream) = std::env::var("ZONEDIFF_UPSTREAM_DOH_URL") {
            self.upstream_doh_url = upstream;
        }

        if let Ok(timeout_str) = std::env::var("ZONEDIFF_UPSTREAM_TIMEOUT") {
            let timeout_secs = timeout_str
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidTimeout(timeout_str.clone()))?;
            self.upstream_timeout = Duration::from_secs(timeout_secs);
        }

        if let Ok(proxy_url) = std::env::var("ZONEDIFF_PROXY_URL") {
            self.proxy_url = proxy_url;
        }

        if let Ok(max_concurrent) = std::env::var("ZONEDIFF_MAX_CONCURRENT_QUERIES") {
            self.max_concurrent_queries = max_concurrent
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidConcurrency(max_concurrent))?;
        }

        if let Ok(enable_cors) = std::env::var("ZONEDIFF_ENABLE_CORS") {
            self.enable_cors = parse_bool(&enable_cors, true);
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for url in [&self.upstream_doh_url, &self.proxy_url] {
            match reqwest::Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                _ => return Err(ConfigError::InvalidUpstreamUrl(url.clone())),
            }
        }

        if self.upstream_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.upstream_timeout.as_secs() > 300 {
            return Err(ConfigError::InvalidTimeout(
                "Timeout too large (max 300 seconds)".to_string(),
            ));
        }

        if self.max_concurrent_queries == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "Max concurrent queries must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Parse a boolean from a string, with a default value for invalid input
fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => default,
    }
}
