use std::net::SocketAddr;

use anyhow::Result;
use blob_store::BlobStoreConfig;
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::wordcloud::WordCloudConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default)]
    pub blob_storage: BlobStoreConfig,
    #[serde(default)]
    pub word_cloud: WordCloudConfig,
    /// Bound on each blob medium access made by the analyzer, in seconds.
    #[serde(default = "default_storage_timeout_secs")]
    pub storage_timeout_secs: u64,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8900".to_string()
}

fn default_storage_timeout_secs() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: default_listen_addr(),
            blob_storage: Default::default(),
            word_cloud: Default::default(),
            storage_timeout_secs: default_storage_timeout_secs(),
        }
    }
}

impl ServerConfig {
    pub fn from_path(path: &str) -> Result<ServerConfig> {
        let config_str = std::fs::read_to_string(path)?;
        let config: ServerConfig = Figment::new().merge(Yaml::string(&config_str)).extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.listen_addr.parse::<SocketAddr>().is_err() {
            return Err(anyhow::anyhow!(
                "invalid listen address: {}",
                self.listen_addr
            ));
        }
        if self.word_cloud.url.parse::<url::Url>().is_err() {
            return Err(anyhow::anyhow!(
                "invalid word cloud url: {}",
                self.word_cloud.url
            ));
        }
        if self.word_cloud.width == 0 || self.word_cloud.height == 0 {
            return Err(anyhow::anyhow!("word cloud dimensions must be non-zero"));
        }
        Ok(())
    }
}
