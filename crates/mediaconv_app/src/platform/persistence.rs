use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use mediaconv_core::TransientErrorPolicy;
use mediaconv_engine::{ApiSettings, EngineConfig, PollSettings};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "mediaconv.ron";
pub const LOG_FILE: &str = "mediaconv.log";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub server_url: String,
    pub poll_interval_ms: u64,
    /// Consecutive failed status queries before a job is given up; `None`
    /// retries forever.
    pub transient_retry_limit: Option<u32>,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_artifact_mb: u64,
    pub output_dir: PathBuf,
    pub log_to_file: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:8000".to_string(),
            poll_interval_ms: 1500,
            transient_retry_limit: None,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_artifact_mb: 512,
            output_dir: PathBuf::from("./output"),
            log_to_file: false,
        }
    }
}

impl Config {
    /// Reads `explicit`, or `./mediaconv.ron` when it exists, or falls back
    /// to the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::read(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::read(path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    pub fn apply_overrides(&mut self, server: Option<String>, output: Option<PathBuf>) {
        if let Some(server) = server {
            self.server_url = server;
        }
        if let Some(output) = output {
            self.output_dir = output;
        }
    }

    pub fn api_settings(&self) -> Result<ApiSettings> {
        let base_url = Url::parse(self.server_url.trim())
            .with_context(|| format!("invalid server url {:?}", self.server_url))?;
        let mut settings = ApiSettings::new(base_url);
        settings.connect_timeout = Duration::from_secs(self.connect_timeout_secs);
        settings.request_timeout = Duration::from_secs(self.request_timeout_secs);
        settings.max_artifact_bytes = self.max_artifact_mb.saturating_mul(1024 * 1024);
        Ok(settings)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            transient: match self.transient_retry_limit {
                Some(limit) => TransientErrorPolicy::GiveUpAfter(limit),
                None => TransientErrorPolicy::RetryForever,
            },
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::new(self.api_settings()?);
        config.poll = self.poll_settings();
        Ok(config)
    }
}
