use serde::Deserialize;

use foodgram_core::config::Config;

/// API service configuration loaded from environment variables.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// TCP port for the HTTP server (default 8000). Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Directory uploaded images are written to. Env var: `MEDIA_ROOT`.
    #[serde(default = "default_media_root")]
    pub media_root: String,
    /// URL prefix the media directory is served under. Env var: `MEDIA_URL`.
    #[serde(default = "default_media_url")]
    pub media_url: String,
    /// Default `recipes_limit` for subscription responses. Env var: `RECIPES_LIMIT`.
    #[serde(default = "default_recipes_limit")]
    pub recipes_limit: u32,
}

impl Config for ApiConfig {}

fn default_api_port() -> u16 {
    8000
}

fn default_media_root() -> String {
    "media".to_owned()
}

fn default_media_url() -> String {
    "/media/".to_owned()
}

fn default_recipes_limit() -> u32 {
    3
}
