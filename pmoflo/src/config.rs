//! Client configuration
//!
//! The FLO endpoint and the headers identifying the mobile app are fixed
//! values, kept here as a plain configuration struct so they can be
//! overridden (tests point the client at a mock server).
//!
//! ```no_run
//! use pmoflo::FloConfig;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = FloConfig::load("flo.yaml")?;
//! println!("Fetching {}", config.chart_url);
//! # Ok(())
//! # }
//! ```

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};

/// FLO chart endpoint (realtime top 100, no mixed content)
pub const DEFAULT_CHART_URL: &str =
    "https://api.music-flo.com/display/v1/browser/chart/1/list?mixYn=N";

/// User-Agent sent by the Android app's HTTP stack
pub const DEFAULT_USER_AGENT: &str = "okhttp/4.9.2";

/// Value of the `x-gm-app-name` header
pub const DEFAULT_APP_NAME: &str = "FLO";

/// Value of the `x-gm-app-version` header
pub const DEFAULT_APP_VERSION: &str = "";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default edge length of cover images, in pixels
pub const DEFAULT_IMAGE_SIZE: u32 = 256;

/// Settings for [`FloClient`](crate::FloClient) and [`FloChart`](crate::FloChart)
///
/// Every field has a default, so a YAML document only needs the keys it
/// overrides:
///
/// ```yaml
/// timeout_secs: 10
/// image_size: 512
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloConfig {
    pub chart_url: String,
    pub user_agent: String,
    pub app_name: String,
    pub app_version: String,
    pub timeout_secs: u64,
    pub image_size: u32,
}

impl Default for FloConfig {
    fn default() -> Self {
        Self {
            chart_url: DEFAULT_CHART_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            app_version: DEFAULT_APP_VERSION.to_string(),
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            image_size: DEFAULT_IMAGE_SIZE,
        }
    }
}

impl FloConfig {
    /// Parse a YAML document, filling absent keys with defaults
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a mapping
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Self =
            serde_yaml::from_str(yaml).context("Failed to parse FLO configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize FLO configuration")
    }

    /// Check the values the client relies on
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.chart_url.trim().is_empty(), "chart_url must not be empty");
        ensure!(self.timeout_secs > 0, "timeout_secs must be positive");
        ensure!(self.image_size > 0, "image_size must be positive");
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
