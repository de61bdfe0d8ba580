//! Server configuration loaded from the environment.

use std::path::PathBuf;

/// Default upstream generative-language endpoint (Gemini Flash).
pub const DEFAULT_AI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Runtime configuration for the server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind, e.g. "0.0.0.0".
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Path to the SQLite database file.
    pub database_path: PathBuf,
    /// Upstream generative-language API URL the proxy forwards to.
    pub ai_api_url: String,
    /// Default AI API key used when a request carries none.
    pub default_api_key: Option<String>,
}

impl Config {
    /// Build a configuration from environment variables, falling back
    /// to development defaults.
    ///
    /// - `HOST` (default `0.0.0.0`)
    /// - `PORT` (default `5000`)
    /// - `DATABASE_PATH` (default `taskdeck.db`)
    /// - `AI_API_URL` (default: the Gemini Flash endpoint)
    /// - `GEMINI_API_KEY` (optional)
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);
        let database_path = std::env::var("DATABASE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("taskdeck.db"));
        let ai_api_url =
            std::env::var("AI_API_URL").unwrap_or_else(|_| DEFAULT_AI_API_URL.to_string());
        let default_api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty());

        Self {
            host,
            port,
            database_path,
            ai_api_url,
            default_api_key,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            database_path: PathBuf::from("taskdeck.db"),
            ai_api_url: DEFAULT_AI_API_URL.to_string(),
            default_api_key: None,
        }
    }
}
