use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::describe::DEFAULT_PREVIEW_LENGTH;

pub const DEFAULT_ENDPOINT: &str = "https://images-api.nasa.gov/search";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub request_timeout_ms: u64,
    pub cache_capacity: usize,
    pub cache_ttl_secs: i64,
    pub preview_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout_ms: 15_000,
            cache_capacity: 32,
            cache_ttl_secs: 300,
            preview_length: DEFAULT_PREVIEW_LENGTH,
        }
    }
}

impl Config {
    /// Explicit path, else `config.toml` in the platform config dir, else defaults.
    /// `STARGAZE_*` environment variables are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => match default_config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env(|k| std::env::var(k).ok());
        cfg.endpoint_url()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading config: {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config: {}", path.display()))
    }

    /// Unparsable values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where F: Fn(&str) -> Option<String> {
        if let Some(v) = lookup("STARGAZE_ENDPOINT").filter(|v| !v.trim().is_empty()) { self.endpoint = v.trim().to_string(); }
        if let Some(v) = lookup("STARGAZE_REQUEST_TIMEOUT_MS").and_then(|s| s.parse().ok()) { self.request_timeout_ms = v; }
        if let Some(v) = lookup("STARGAZE_CACHE_CAPACITY").and_then(|s| s.parse().ok()) { self.cache_capacity = v; }
        if let Some(v) = lookup("STARGAZE_CACHE_TTL_SECS").and_then(|s| s.parse().ok()) { self.cache_ttl_secs = v; }
        if let Some(v) = lookup("STARGAZE_PREVIEW_LENGTH").and_then(|s| s.parse().ok()) { self.preview_length = v; }
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        let url = Url::parse(&self.endpoint).with_context(|| format!("invalid endpoint URL: {}", self.endpoint))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(anyhow!("endpoint must be http or https, got `{}`", other)),
        }
    }

    pub fn request_timeout(&self) -> Duration { Duration::from_millis(self.request_timeout_ms) }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "stargaze", "stargaze").map(|p| p.config_dir().join("config.toml"))
}
