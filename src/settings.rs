use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Args;

/// Client-side settings. Read from an optional TOML file, then overridden
/// by command line flags. Never written back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL
    pub server: String,
    /// Path prefix of the API routes
    pub api_base: String,
    /// How long a success message stays visible
    pub status_clear_ms: u64,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: "http://127.0.0.1:8080".to_string(),
            api_base: "/api".to_string(),
            status_clear_ms: 3000,
            log_file: std::env::temp_dir().join("filter_config.log"),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Invalid settings file {}", path.display()))
    }

    pub fn resolve(args: &Args) -> Result<Self> {
        let mut settings = match args.settings {
            Some(ref path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.merge_with_args(args);
        Ok(settings)
    }

    fn merge_with_args(&mut self, args: &Args) {
        // Only override values given explicitly on the command line
        if let Some(ref server) = args.server {
            self.server = server.clone();
        }

        if let Some(ref api_base) = args.api_base {
            self.api_base = api_base.clone();
        }

        if let Some(ms) = args.clear_after_ms {
            self.status_clear_ms = ms;
        }

        if let Some(ref log_file) = args.log_file {
            self.log_file = log_file.clone();
        }
    }

    pub fn clear_after(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }
}
