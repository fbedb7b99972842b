use std::{collections::HashMap, fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

pub const SETTINGS_FILE: &str = "triage.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub data_source_url: String,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_source_url: "http://localhost:3000".into(),
            request_timeout_secs: 10,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn data_source_url(&self) -> Result<Url> {
        Url::parse(self.data_source_url.trim())
            .with_context(|| format!("invalid data source url '{}'", self.data_source_url))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    fn apply_file(&mut self, raw: &str) -> Result<()> {
        let file_cfg = toml::from_str::<HashMap<String, toml::Value>>(raw)
            .context("invalid settings file")?;
        if let Some(v) = file_cfg.get("data_source_url").and_then(toml::Value::as_str) {
            self.data_source_url = v.to_string();
        }
        match file_cfg.get("request_timeout_secs") {
            Some(toml::Value::Integer(secs)) if *secs > 0 => {
                self.request_timeout_secs = *secs as u64;
            }
            Some(toml::Value::String(secs)) => {
                if let Ok(parsed) = secs.parse::<u64>() {
                    self.request_timeout_secs = parsed;
                }
            }
            _ => {}
        }
        if let Some(v) = file_cfg.get("log_filter").and_then(toml::Value::as_str) {
            self.log_filter = v.to_string();
        }
        Ok(())
    }

    fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = var("DATA_SOURCE_URL") {
            self.data_source_url = v;
        }
        if let Some(v) = var("APP__DATA_SOURCE_URL") {
            self.data_source_url = v;
        }

        if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed) = v.parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }

        if let Some(v) = var("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

/// Defaults, then `triage.toml` from the working directory, then the environment.
pub fn load_settings() -> Result<Settings> {
    load_settings_from(Path::new(SETTINGS_FILE))
}

pub fn load_settings_from(path: &Path) -> Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        settings
            .apply_file(&raw)
            .with_context(|| format!("failed to load '{}'", path.display()))?;
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}
