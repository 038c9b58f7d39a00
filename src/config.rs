//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub media_host: MediaHostConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "api.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Remote media host configuration
///
/// The media host is an external upload/transcoding API reached over HTTP
/// with an API key/secret pair. Uploaded assets get stable public URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaHostConfig {
    /// Base URL of the media host API (e.g., "https://media-api.example.com")
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
    /// Per-call timeout for upload/delete requests, in seconds
    #[serde(default = "default_media_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_media_timeout_seconds() -> u64 {
    30
}

/// Authentication configuration
///
/// Two token classes, each with its own signing secret and expiry:
/// a short-lived access token and a long-lived refresh token.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Access token signing secret (32+ bytes)
    pub access_token_secret: String,
    /// Access token lifetime in seconds (default: 900 = 15 min)
    pub access_token_max_age: i64,
    /// Refresh token signing secret (32+ bytes)
    pub refresh_token_secret: String,
    /// Refresh token lifetime in seconds (default: 864000 = 10 days)
    pub refresh_token_max_age: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (CLIPNEST_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.protocol", "http")?
            .set_default("media_host.timeout_seconds", 30)?
            .set_default("auth.access_token_max_age", 900)?
            .set_default("auth.refresh_token_max_age", 864_000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (CLIPNEST_*)
            .add_source(
                Environment::with_prefix("CLIPNEST")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_server_domain(&self.server.domain)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_TOKEN_SECRET_BYTES: usize = 32;

        for (name, secret) in [
            ("auth.access_token_secret", &self.auth.access_token_secret),
            ("auth.refresh_token_secret", &self.auth.refresh_token_secret),
        ] {
            if secret.as_bytes().len() < MIN_TOKEN_SECRET_BYTES {
                return Err(crate::error::AppError::Config(format!(
                    "{} must be at least {} bytes",
                    name, MIN_TOKEN_SECRET_BYTES
                )));
            }
        }

        if self.auth.access_token_max_age <= 0 || self.auth.refresh_token_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "token max ages must be greater than 0".to_string(),
            ));
        }

        if self.auth.access_token_max_age >= self.auth.refresh_token_max_age {
            return Err(crate::error::AppError::Config(
                "auth.access_token_max_age must be shorter than auth.refresh_token_max_age"
                    .to_string(),
            ));
        }

        url::Url::parse(&self.media_host.base_url).map_err(|e| {
            crate::error::AppError::Config(format!("media_host.base_url is invalid: {}", e))
        })?;

        if !self.should_use_secure_cookies() {
            let host = normalized_server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Using insecure auth cookies for local development"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}
