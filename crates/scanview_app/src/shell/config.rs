use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use scanview_core::PollSettings;
use scanview_engine::ClientSettings;
use serde::{Deserialize, Serialize};

use super::cli::Args;

/// On-disk configuration, e.g.
///
/// ```ron
/// (
///     client: (base_url: "http://mquery.local/api", request_timeout_secs: 60),
///     poll: (page_size: 100),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub client: ClientConfig,
    pub poll: PollSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let settings = ClientSettings::default();
        Self {
            base_url: settings.base_url,
            connect_timeout_secs: settings.connect_timeout.as_secs(),
            request_timeout_secs: settings.request_timeout.as_secs(),
            max_bytes: settings.max_bytes,
        }
    }
}

impl ClientConfig {
    pub fn to_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_bytes,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        ensure!(
            config.poll.page_size > 0,
            "invalid config {}: poll.page_size must be at least 1",
            path.display()
        );
        Ok(config)
    }

    /// Command-line flags win over the file.
    pub fn apply_overrides(&mut self, args: &Args) {
        if let Some(base_url) = &args.base_url {
            self.client.base_url = base_url.clone();
        }
        if let Some(page_size) = args.page_size {
            self.poll.page_size = page_size.max(1);
        }
    }
}
