pub mod app_config;
pub mod browser_config;
pub mod scraping_config;
pub mod storage_config;

pub use app_config::{AppConfig, ConfigError};
pub use browser_config::BrowserConfig;
pub use scraping_config::{ColumnLayout, ScrapingConfig};
pub use storage_config::StorageConfig;
