use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Rendering parameters sent with every request. The wire names follow the
/// renderer's API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordCloudConfig {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_format")]
    pub format: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_remove_stopwords")]
    pub remove_stopwords: bool,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "https://quickchart.io/wordcloud".to_string()
}

fn default_format() -> String {
    "png".to_string()
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_remove_stopwords() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for WordCloudConfig {
    fn default() -> Self {
        WordCloudConfig {
            url: default_url(),
            format: default_format(),
            width: default_width(),
            height: default_height(),
            remove_stopwords: default_remove_stopwords(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("word cloud request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("word cloud service returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("word cloud service returned an empty image")]
    EmptyBody,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderRequest<'a> {
    text: &'a str,
    format: &'a str,
    width: u32,
    height: u32,
    remove_stopwords: bool,
    language: &'a str,
}

/// Client for the external word cloud renderer. Every failure mode comes
/// back as a typed `RenderError`; callers decide what a missing cloud means.
pub struct WordCloudClient {
    client: reqwest::Client,
    config: WordCloudConfig,
}

impl WordCloudClient {
    pub fn new(config: WordCloudConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub async fn render(&self, text: &str) -> Result<Bytes, RenderError> {
        let request = RenderRequest {
            text,
            format: &self.config.format,
            width: self.config.width,
            height: self.config.height,
            remove_stopwords: self.config.remove_stopwords,
            language: &self.config.language,
        };
        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RenderError::Status(response.status()));
        }
        let image = response.bytes().await?;
        if image.is_empty() {
            return Err(RenderError::EmptyBody);
        }
        debug!("rendered word cloud image of {} bytes", image.len());
        Ok(image)
    }
}
