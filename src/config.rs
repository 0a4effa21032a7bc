//! Application configuration

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the Supabase project (without the `/rest/v1` suffix)
    pub supabase_url: String,

    /// Supabase service API key, sent as both `apikey` and bearer token
    pub supabase_key: String,

    /// Port for the HTTP server
    pub port: u16,

    /// Directory for the landing page and other static assets
    pub static_dir: PathBuf,

    /// Auth code required to record a wake event
    pub wake_code: String,

    /// Auth code required to record a sleep event
    pub sleep_code: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// `SUPABASE_URL` and `SUPABASE_KEY` are required; everything else has a
    /// default.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            supabase_url: env::var("SUPABASE_URL")
                .context("SUPABASE_URL is not set")?,

            supabase_key: env::var("SUPABASE_KEY")
                .context("SUPABASE_KEY is not set")?,

            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./static")),

            wake_code: env::var("WAKE_AUTH_CODE")
                .unwrap_or_else(|_| "666".to_string()),

            sleep_code: env::var("SLEEP_AUTH_CODE")
                .unwrap_or_else(|_| "999".to_string()),
        })
    }
}
