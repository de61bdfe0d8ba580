//! Local client settings with disk persistence.
//!
//! Holds the AI API key and user preferences under a fixed path,
//! read on demand and never synced to the server. Environment
//! variables seed the defaults when no settings file exists yet.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::views::TaskFilter;

/// File name under the settings directory.
const SETTINGS_FILE: &str = "settings.json";

/// User-facing client settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Generative-language API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the backend API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Filter applied when the task list first loads.
    #[serde(default)]
    pub default_filter: TaskFilter,
}

/// Settings store with disk persistence. Explicit load/save contract;
/// no process-wide singleton.
#[derive(Debug)]
pub struct SettingsStore {
    settings: RwLock<Settings>,
    storage_path: PathBuf,
}

impl SettingsStore {
    /// Create a store rooted at `dir`, loading `settings.json` from it
    /// if present, otherwise falling back to environment defaults:
    /// `GEMINI_API_KEY` and `API_BASE_URL`.
    pub fn new(dir: &Path) -> Self {
        let storage_path = dir.join(SETTINGS_FILE);

        let settings = if storage_path.exists() {
            match Self::load_from_path(&storage_path) {
                Ok(s) => {
                    tracing::info!("Loaded settings from {}", storage_path.display());
                    s
                }
                Err(e) => {
                    tracing::warn!(
                        "Failed to load settings from {}: {}, using defaults",
                        storage_path.display(),
                        e
                    );
                    Self::defaults_from_env()
                }
            }
        } else {
            Self::defaults_from_env()
        };

        Self {
            settings: RwLock::new(settings),
            storage_path,
        }
    }

    fn defaults_from_env() -> Settings {
        Settings {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            api_base_url: std::env::var("API_BASE_URL").ok(),
            default_filter: TaskFilter::All,
        }
    }

    fn load_from_path(path: &Path) -> Result<Settings, std::io::Error> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    async fn save_to_disk(&self) -> Result<(), std::io::Error> {
        let settings = self.settings.read().await;

        if let Some(parent) = self.storage_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&*settings)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.storage_path, contents)?;
        tracing::debug!("Saved settings to {}", self.storage_path.display());
        Ok(())
    }

    /// Get a clone of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// The stored API key, if any.
    pub async fn api_key(&self) -> Option<String> {
        self.settings.read().await.api_key.clone()
    }

    /// Store a new API key and persist.
    pub async fn set_api_key(&self, api_key: impl Into<String>) -> Result<(), std::io::Error> {
        {
            let mut settings = self.settings.write().await;
            settings.api_key = Some(api_key.into());
        }
        self.save_to_disk().await
    }

    /// Replace all settings at once and persist.
    pub async fn update(&self, new_settings: Settings) -> Result<(), std::io::Error> {
        {
            let mut settings = self.settings.write().await;
            *settings = new_settings;
        }
        self.save_to_disk().await
    }

    /// Reload settings from disk, discarding in-memory state.
    pub async fn reload(&self) -> Result<(), std::io::Error> {
        if self.storage_path.exists() {
            let loaded = Self::load_from_path(&self.storage_path)?;
            let mut settings = self.settings.write().await;
            *settings = loaded;
        }
        Ok(())
    }

    /// Delete the settings file and reset to defaults.
    pub async fn clear(&self) -> Result<(), std::io::Error> {
        if self.storage_path.exists() {
            std::fs::remove_file(&self.storage_path)?;
        }
        let mut settings = self.settings.write().await;
        *settings = Settings::default();
        Ok(())
    }
}
