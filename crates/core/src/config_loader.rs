use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads pipeline configuration by merging defaults, TOML, environment variables, and JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be parsed or the result is invalid.
    pub fn load() -> Result<PipelineConfig> {
        Self::extract(
            Self::base()
                .merge(Toml::file("config/Pipeline.toml"))
                .merge(Env::prefixed("IVF_").split("__"))
                .join(Json::file("config/Pipeline.json")),
        )
    }

    /// Loads pipeline configuration from a specific TOML file, still honoring `IVF_` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or the result is invalid.
    pub fn load_from(path: &str) -> Result<PipelineConfig> {
        Self::extract(
            Self::base()
                .merge(Toml::file(path))
                .merge(Env::prefixed("IVF_").split("__")),
        )
        .with_context(|| format!("Failed to load pipeline config from {path}"))
    }

    fn base() -> Figment {
        Figment::from(Serialized::defaults(PipelineConfig::default()))
    }

    fn extract(figment: Figment) -> Result<PipelineConfig> {
        let config: PipelineConfig = figment.extract()?;
        config.validate()?;
        tracing::debug!(?config, "Pipeline config loaded");
        Ok(config)
    }
}
