//! Panel configuration
//!
//! Loaded from a TOML file, with the LLM credentials and endpoint
//! overridable from the environment. Every section is optional.
//!
//! ```toml
//! [llm]
//! api_url = "https://generativelanguage.googleapis.com/v1beta"
//! model = "gemini-2.5-flash"
//! timeout_secs = 30
//!
//! [[devices]]
//! id = "1"
//! name = "Desk Lamp"
//! type = "LIGHT"
//! room = "Office"
//! isOn = true
//! value = 60
//! ```

use crate::core::error::{HomeError, Result};
use crate::device::collection::ensure_unique_ids;
use crate::device::model::Device;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Connection settings for the structured generation service
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; read from `LLM_API_KEY` when not set in the file
    pub api_key: String,

    /// Base URL (Gemini) or full endpoint URL (OpenAI-compatible, Anthropic)
    ///
    /// The provider dialect is picked from this URL.
    pub api_url: String,

    pub model: String,

    /// Upper bound on one interpretation round trip, in seconds
    ///
    /// The service is an external network dependency, so a command never
    /// waits longer than this.
    pub timeout_secs: u64,

    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: DEFAULT_API_URL.into(),
            model: DEFAULT_MODEL.into(),
            timeout_secs: 30,
            max_tokens: 1024,
        }
    }
}

impl LlmConfig {
    /// Overlay `LLM_API_KEY`, `LLM_API_URL` and `LLM_MODEL` when they are set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            self.api_key = key;
        }
        if let Ok(url) = std::env::var("LLM_API_URL") {
            self.api_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            self.model = model;
        }
        self
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Check the settings after file and environment have been merged
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(HomeError::Config("llm.timeout_secs must be positive".into()));
        }
        if self.model.trim().is_empty() {
            return Err(HomeError::Config("llm.model must not be empty".into()));
        }
        Ok(())
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HomeConfig {
    pub llm: LlmConfig,
    /// Initial devices; empty means the demo home
    pub devices: Vec<Device>,
}

impl HomeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: HomeConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        self.llm.validate()?;
        ensure_unique_ids(&self.devices)
    }
}
