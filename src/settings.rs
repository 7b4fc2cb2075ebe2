use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

const DEFAULT_API_BASE_URL: &str = "https://www.federalregister.gov/api/v1";

/// Runtime settings, overridable through `ADSCRAPER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub user_agent: String,
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(Config::builder().add_source(Environment::with_prefix("ADSCRAPER")))
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .set_default("api_base_url", DEFAULT_API_BASE_URL)?
            .set_default("user_agent", default_user_agent())?
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Failed to read settings")
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
