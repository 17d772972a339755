use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::completion::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::models::DEFAULT_MIN_NOTES_LENGTH;
use crate::summary::GenerationSettings;

/// Environment variables consulted for the API key, in order
pub const API_KEY_VARS: [&str; 2] = ["ANTHROPIC_API_KEY", "CLAUDE_API_KEY"];

/// Service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub schema_version: u32,
    pub host: String,
    pub port: u16,
    pub api_base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub legacy_max_tokens: u32,
    pub min_notes_length: usize,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
    /// Accepted from the file but never written back
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: 1,
            host: "127.0.0.1".to_string(),
            port: 5000,
            api_base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 2000,
            legacy_max_tokens: 2048,
            min_notes_length: DEFAULT_MIN_NOTES_LENGTH,
            connect_timeout_secs: 30,
            request_timeout_secs: 120,
            max_body_bytes: 1024 * 1024,
            api_key: None,
        }
    }
}

impl Config {
    /// Get the default config directory
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Failed to get home directory")?;
        Ok(home.join(".session-scribe"))
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from file or return default
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config, using default: {:#}", e);
                Self::default()
            }
        }
    }

    /// Load config from file; a missing file yields the default
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")
    }

    /// Apply environment overrides. `lookup` is `std::env::var(..).ok()` in
    /// production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = API_KEY_VARS.iter().find_map(|name| lookup(*name)) {
            self.api_key = Some(key);
        }
        if let Some(host) = lookup("SESSION_SCRIBE_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("SESSION_SCRIBE_PORT") {
            match port.parse() {
                Ok(p) => self.port = p,
                Err(_) => warn!("Ignoring invalid SESSION_SCRIBE_PORT '{}'", port),
            }
        }
        if let Some(model) = lookup("SESSION_SCRIBE_MODEL") {
            self.model = model;
        }
        if let Some(url) = lookup("ANTHROPIC_BASE_URL") {
            self.api_base_url = url;
        }
    }

    /// The API key, or an error when none is configured
    pub fn require_api_key(&self) -> Result<&str> {
        match self.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => bail!(
                "No API key configured. Set {} (or {}) in the environment.",
                API_KEY_VARS[0],
                API_KEY_VARS[1]
            ),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn generation_settings(&self) -> GenerationSettings {
        GenerationSettings {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            legacy_max_tokens: self.legacy_max_tokens,
            min_notes_length: self.min_notes_length,
        }
    }
}
