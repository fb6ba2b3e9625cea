// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

// Re-export public types
pub use state::AppState;
pub use types::{
    BackendConfig, BackendKind, Config, EdgeConfig, HealthConfig, HttpConfig, LoggingConfig,
    PagesConfig, PerformanceConfig, ServerConfig,
};

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    ///
    /// Environment variables `CATALOG__<SECTION>__<KEY>` override the file.
    /// `SUPABASE_URL` / `SUPABASE_API_KEY` provide defaults for the rest backend.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("CATALOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "catalog-server/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("http.site_title", "Music Catalog")?
            .set_default("http.static_dir", "public")?
            .set_default("edge.cookie_name", "cacheable")?
            .set_default("edge.cached_prefix", "/ssg")?
            .set_default("edge.asset_extensions", vec!["ico", "jpg", "png"])?
            .set_default("backend.kind", "sqlite")?
            .set_default("backend.database_path", "catalog.db")?
            .set_default("pages.featured_artists", 5)?
            .set_default("pages.new_albums", 5)?
            .set_default("pages.featured_playlists", 10)?
            .set_default("pages.warm_on_start", true)?
            .set_default("pages.blocking_fallback", true)?;

        if let Ok(url) = std::env::var("SUPABASE_URL") {
            builder = builder.set_default("backend.rest_url", url)?;
        }
        if let Ok(key) = std::env::var("SUPABASE_API_KEY") {
            builder = builder.set_default("backend.rest_api_key", key)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
