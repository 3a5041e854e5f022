//! HTTP client for the FLO chart API
//!
//! A single blocking GET against the chart endpoint, sent with the headers
//! of the FLO Android app. The body is returned as raw JSON; turning it into
//! chart entries is the job of [`crate::parser`].
//!
//! # Example
//!
//! ```no_run
//! use pmoflo::FloClient;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FloClient::new();
//!     let raw = client.fetch()?;
//!     println!("{}", raw["data"]["name"]);
//!     Ok(())
//! }
//! ```

use crate::config::FloConfig;
use crate::error::{ParseError, RequestError, Result};
use crate::models::ChartSnapshot;
use crate::parser;
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use ureq::http::StatusCode;
use ureq::Agent;

/// FLO chart HTTP client
///
/// The client is stateless apart from the agent's connection pool and can
/// be cloned freely. It never retries: a failed call is reported once.
#[derive(Clone)]
pub struct FloClient {
    agent: Agent,
    config: FloConfig,
}

impl fmt::Debug for FloClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for FloClient {
    fn default() -> Self {
        Self::new()
    }
}

impl FloClient {
    /// Create a client for the public FLO endpoint
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for configuring the client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client from a loaded configuration
    pub fn from_config(config: &FloConfig) -> Self {
        Self::builder().config(config.clone()).build()
    }

    /// Chart endpoint this client talks to
    pub fn chart_url(&self) -> &str {
        &self.config.chart_url
    }

    pub fn config(&self) -> &FloConfig {
        &self.config
    }

    /// Fetch the chart and return the decoded JSON body
    ///
    /// Any status other than 200 is a [`RequestError::Status`]. Connection,
    /// DNS and timeout failures are [`RequestError::Transport`]. A 200 whose
    /// body is not JSON is a [`ParseError::Json`].
    pub fn fetch(&self) -> Result<Value> {
        #[cfg(feature = "logging")]
        tracing::debug!("Fetching FLO chart: {}", self.config.chart_url);

        let mut response = self
            .agent
            .get(&self.config.chart_url)
            .header("User-Agent", &self.config.user_agent)
            .header("x-gm-app-name", &self.config.app_name)
            .header("x-gm-app-version", &self.config.app_version)
            .call()
            .map_err(RequestError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            #[cfg(feature = "logging")]
            tracing::warn!("FLO chart API returned status {}", status);

            return Err(RequestError::Status(status.as_u16()).into());
        }

        let body = response
            .body_mut()
            .read_to_string()
            .map_err(RequestError::Transport)?;

        Ok(serde_json::from_str(&body).map_err(ParseError::Json)?)
    }

    /// Fetch and parse the chart in one call
    pub fn fetch_chart(&self, image_size: u32) -> Result<ChartSnapshot> {
        let raw = self.fetch()?;
        Ok(parser::parse(&raw, image_size)?)
    }
}

/// Builder for configuring a FloClient
#[derive(Default)]
pub struct ClientBuilder {
    agent: Option<Agent>,
    config: FloConfig,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("custom_agent", &self.agent.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl ClientBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every setting with a loaded configuration
    pub fn config(mut self, config: FloConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a preconfigured ureq agent (its own timeout then applies)
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Set the chart endpoint
    pub fn chart_url(mut self, url: impl Into<String>) -> Self {
        self.config.chart_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the `x-gm-app-name` header
    pub fn app_name(mut self, app_name: impl Into<String>) -> Self {
        self.config.app_name = app_name.into();
        self
    }

    /// Set the `x-gm-app-version` header
    pub fn app_version(mut self, app_version: impl Into<String>) -> Self {
        self.config.app_version = app_version.into();
        self
    }

    /// Build the client
    pub fn build(self) -> FloClient {
        // Non-200 answers must come back as responses so the status can be
        // reported, not as ureq::Error::StatusCode.
        let agent = self.agent.unwrap_or_else(|| {
            Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(self.config.timeout()))
                .build()
                .into()
        });

        FloClient {
            agent,
            config: self.config,
        }
    }
}
