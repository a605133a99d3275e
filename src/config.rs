//! Configuration for the feedback desk
//!
//! Layers, later wins:
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. `FEEDBACK_*` environment variables, `__` between nested keys
//!    (e.g. `FEEDBACK_LLM__MODEL=gpt-4o`)
//!
//! The admin password also falls back to the bare `ADMIN_PASSWORD` variable,
//! and the LLM key to the provider's usual variable (`OPENAI_API_KEY` or
//! `ANTHROPIC_API_KEY`).

use crate::auth::AdminCredential;
use crate::error::Result;
use crate::services::LlmConfig;
use crate::storage::CsvFeedbackStore;
use crate::types::{ENRICHMENT_UNAVAILABLE, LOW_RATING_THRESHOLD};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ENV_PREFIX: &str = "FEEDBACK";

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Record store file
    pub data_file: PathBuf,

    /// Shared admin secret; admin access is disabled when unset
    pub admin_password: Option<String>,

    /// Text stored when an enrichment field could not be generated
    pub enrichment_sentinel: String,

    /// Ratings at or below this count as low ratings
    pub low_rating_threshold: u8,

    pub llm: LlmConfig,

    pub server: ServerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("feedback.csv"),
            admin_password: None,
            enrichment_sentinel: ENRICHMENT_UNAVAILABLE.to_string(),
            low_rating_threshold: LOW_RATING_THRESHOLD,
            llm: LlmConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load defaults, then `file` if given, then the environment
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = file {
            debug!("Loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let loaded: AppConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(loaded.resolve())
    }

    /// Apply fallbacks that are not plain layers
    fn resolve(mut self) -> Self {
        if self.admin_password.as_deref().map_or(true, str::is_empty) {
            self.admin_password = env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty());
        }
        if self.admin_password.is_none() {
            warn!("No admin password configured; admin access is disabled");
        }

        self.llm = self.llm.resolve_api_key();
        if self.llm.api_key.is_empty() {
            warn!(
                "No API key for {:?}; feedback will be stored without AI enrichment",
                self.llm.provider
            );
        }
        self
    }

    /// The configured record store, reading blank legacy cells as the sentinel
    pub fn open_store(&self) -> CsvFeedbackStore {
        CsvFeedbackStore::new(&self.data_file).with_sentinel(self.enrichment_sentinel.clone())
    }

    pub fn admin_credential(&self) -> AdminCredential {
        AdminCredential::from_password(self.admin_password.clone())
    }
}
