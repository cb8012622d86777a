//! Configuration for Dealdesk

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Document store settings
    #[serde(default)]
    pub firestore: FirestoreConfig,

    /// AI model settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
    /// Google Cloud project that hosts the Firestore database
    #[serde(default)]
    pub project_id: String,

    /// Firestore database id ("(default)" unless using named databases)
    #[serde(default = "default_database_id")]
    pub database_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Model used for property Q&A
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            firestore: FirestoreConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            database_id: default_database_id(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
        }
    }
}

impl Config {
    /// Load config from the default path or fall back to defaults,
    /// then apply environment overrides.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Load config from an explicit file path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Environment variables take precedence over the config file.
    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("DEALDESK_HTTP_PORT") {
            if let Ok(port) = port.parse() {
                self.http_port = port;
            }
        }
        if let Ok(project) = std::env::var("FIRESTORE_PROJECT_ID") {
            self.firestore.project_id = project;
        }
        if let Ok(database) = std::env::var("FIRESTORE_DATABASE_ID") {
            self.firestore.database_id = database;
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            self.gemini.model = model;
        }
    }

    /// Get the default config path
    fn config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not find config directory".into()))?;
        Ok(base.join("dealdesk").join("config.toml"))
    }
}

// Default value functions

fn default_http_port() -> u16 {
    5000
}

fn default_database_id() -> String {
    "(default)".to_string()
}

fn default_model() -> String {
    "gemini-pro".to_string()
}
