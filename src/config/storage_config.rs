use std::path::PathBuf;

#[derive(serde::Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub output_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from("crypto_prices.csv"),
        }
    }
}
