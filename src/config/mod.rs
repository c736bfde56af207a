//! Configuration management
//!
//! Configuration is loaded from a `config.yml` file, with environment
//! variables (`NEWSROOM_*`) overriding file values. Missing values fall
//! back to sensible defaults, so an empty or absent file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
    /// SMTP configuration
    #[serde(default)]
    pub smtp: SmtpConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/newsroom.db".to_string()
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached entries
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_entries: default_max_entries(),
        }
    }
}

fn default_ttl() -> u64 {
    3600
}

fn default_max_entries() -> u64 {
    10_000
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign bearer tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Token lifetime in days
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_days: default_token_ttl_days(),
        }
    }
}

fn default_jwt_secret() -> String {
    // Development fallback. Production deployments set NEWSROOM_AUTH_JWT_SECRET.
    "change-me-in-production".to_string()
}

fn default_token_ttl_days() -> u64 {
    365
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload directory path
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Maximum file size in bytes (default: 10MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Allowed image MIME types
    #[serde(default = "default_allowed_types")]
    pub allowed_types: Vec<String>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size: default_max_file_size(),
            allowed_types: default_allowed_types(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024 // 10MB
}

fn default_allowed_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/gif".to_string(),
        "image/webp".to_string(),
    ]
}

impl UploadConfig {
    /// Check if a MIME type is allowed
    pub fn is_type_allowed(&self, mime_type: &str) -> bool {
        self.allowed_types.iter().any(|t| t == mime_type)
    }

    /// Get file extension for a MIME type
    pub fn get_extension(&self, mime_type: &str) -> &'static str {
        match mime_type {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/gif" => "gif",
            "image/webp" => "webp",
            _ => "bin",
        }
    }
}

/// SMTP configuration for outgoing email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    /// SMTP relay host
    #[serde(default)]
    pub host: String,
    /// SMTP port
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username
    #[serde(default)]
    pub username: String,
    /// SMTP password
    #[serde(default)]
    pub password: String,
    /// From address for outgoing mail
    #[serde(default = "default_smtp_from")]
    pub from: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            from: default_smtp_from(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "Newsroom <noreply@newsroom.local>".to_string()
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file.
    ///
    /// A missing or empty file yields the default configuration. Invalid
    /// YAML is an error with the location included.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Recognized variables:
    /// - NEWSROOM_SERVER_HOST / NEWSROOM_SERVER_PORT / NEWSROOM_SERVER_CORS_ORIGIN
    /// - NEWSROOM_DATABASE_URL
    /// - NEWSROOM_CACHE_TTL_SECONDS
    /// - NEWSROOM_AUTH_JWT_SECRET / NEWSROOM_AUTH_TOKEN_TTL_DAYS
    /// - NEWSROOM_UPLOAD_PATH
    /// - NEWSROOM_SMTP_HOST / NEWSROOM_SMTP_PORT / NEWSROOM_SMTP_USERNAME /
    ///   NEWSROOM_SMTP_PASSWORD / NEWSROOM_SMTP_FROM
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("NEWSROOM_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("NEWSROOM_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("NEWSROOM_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("NEWSROOM_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(ttl) = std::env::var("NEWSROOM_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        if let Ok(secret) = std::env::var("NEWSROOM_AUTH_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(days) = std::env::var("NEWSROOM_AUTH_TOKEN_TTL_DAYS") {
            if let Ok(days) = days.parse::<u64>() {
                self.auth.token_ttl_days = days;
            }
        }

        if let Ok(path) = std::env::var("NEWSROOM_UPLOAD_PATH") {
            self.upload.path = PathBuf::from(path);
        }

        if let Ok(host) = std::env::var("NEWSROOM_SMTP_HOST") {
            self.smtp.host = host;
        }
        if let Ok(port) = std::env::var("NEWSROOM_SMTP_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.smtp.port = port;
            }
        }
        if let Ok(username) = std::env::var("NEWSROOM_SMTP_USERNAME") {
            self.smtp.username = username;
        }
        if let Ok(password) = std::env::var("NEWSROOM_SMTP_PASSWORD") {
            self.smtp.password = password;
        }
        if let Ok(from) = std::env::var("NEWSROOM_SMTP_FROM") {
            self.smtp.from = from;
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
