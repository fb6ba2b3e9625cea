// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub edge: EdgeConfig,
    pub backend: BackendConfig,
    pub pages: PagesConfig,
    #[serde(default)]
    pub health: HealthConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// `debug`, `info`, `warn` or `error`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
    /// Suffix of every page title
    pub site_title: String,
    /// Directory serving `.ico`/`.jpg`/`.png` and other assets
    pub static_dir: String,
}

/// Edge routing rule configuration
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct EdgeConfig {
    /// Cookie whose value `"true"` selects the cached namespace
    pub cookie_name: String,
    /// Path namespace of statically generated pages
    pub cached_prefix: String,
    /// Extensions (without dot) that bypass the rule entirely
    pub asset_extensions: Vec<String>,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            cookie_name: "cacheable".to_string(),
            cached_prefix: "/ssg".to_string(),
            asset_extensions: vec!["ico".to_string(), "jpg".to_string(), "png".to_string()],
        }
    }
}

/// Which catalog backend serves the pages
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Sqlite,
    Rest,
}

/// Catalog backend configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// SQLite database file, or `:memory:`
    pub database_path: String,
    /// TOML seed applied to the SQLite database at startup
    #[serde(default)]
    pub seed_file: Option<String>,
    /// Base URL of the hosted query API
    #[serde(default)]
    pub rest_url: Option<String>,
    #[serde(default)]
    pub rest_api_key: Option<String>,
}

/// Page loader and static generation settings
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct PagesConfig {
    pub featured_artists: usize,
    pub new_albums: usize,
    pub featured_playlists: usize,
    /// Pre-render the cached namespace at startup
    pub warm_on_start: bool,
    /// Render unenumerated detail pages on first request; 404 them otherwise
    pub blocking_fallback: bool,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            featured_artists: 5,
            new_albums: 5,
            featured_playlists: 10,
            warm_on_start: true,
            blocking_fallback: true,
        }
    }
}

/// Health check configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}
