use std::path::Path;

use config::{builder::DefaultState, Config, ConfigBuilder};
use error_stack::{Report, ResultExt};
use thiserror::Error;

use super::{
    browser_config::BrowserConfig, scraping_config::ScrapingConfig, storage_config::StorageConfig,
};

pub const DEFAULT_CONFIG_NAME: &str = "Config";
pub const ENV_PREFIX: &str = "CRYPTO_TRACKER";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Error reading configuration sources")]
    FailedToBuild,
    #[error("Failed to deserialize configuration")]
    FailedToDeserialize,
    #[error("Invalid configuration value")]
    InvalidValue,
}

#[derive(serde::Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub scraping: ScrapingConfig,
    pub storage: StorageConfig,
    pub browser: BrowserConfig,
}

impl AppConfig {
    /// Built-in defaults, overridden by an optional `Config.{toml,json,yaml}` (or
    /// the file named by `CONFIG_PATH`), overridden by `CRYPTO_TRACKER_*`
    /// environment variables.
    pub fn load() -> error_stack::Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_NAME.to_string());

        let builder = Config::builder()
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::build(builder).attach_printable_lazy(|| format!("Config path: {}", config_path))
    }

    /// Defaults overridden by exactly one file, which must exist.
    pub fn from_file(path: &Path) -> error_stack::Result<Self, ConfigError> {
        let builder = Config::builder().add_source(config::File::from(path));

        Self::build(builder).attach_printable_lazy(|| format!("Config path: {}", path.display()))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> error_stack::Result<Self, ConfigError> {
        let app_config: AppConfig = builder
            .build()
            .change_context(ConfigError::FailedToBuild)?
            .try_deserialize()
            .change_context(ConfigError::FailedToDeserialize)?;

        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> error_stack::Result<(), ConfigError> {
        let layout = &self.scraping.layout;
        if layout.max_index() >= layout.min_cells {
            return Err(Report::new(ConfigError::InvalidValue).attach_printable(format!(
                "scraping.layout: field index {} is outside the {} required cells",
                layout.max_index(),
                layout.min_cells
            )));
        }

        if self.scraping.table_timeout_secs == 0 || self.scraping.page_load_timeout_secs == 0 {
            return Err(Report::new(ConfigError::InvalidValue)
                .attach_printable("scraping: timeouts must be greater than zero"));
        }

        if self.scraping.target_url.trim().is_empty() {
            return Err(Report::new(ConfigError::InvalidValue)
                .attach_printable("scraping.target_url must not be empty"));
        }

        if self.storage.output_path.as_os_str().is_empty() {
            return Err(Report::new(ConfigError::InvalidValue)
                .attach_printable("storage.output_path must not be empty"));
        }

        Ok(())
    }
}
