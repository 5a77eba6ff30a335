// generate.rs
use std::env;

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const IMAGES_ENDPOINT: &str = "https://api.openai.com/v1/images/generations";

pub const DEFAULT_MODEL: &str = "dall-e-3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Square1024,
    Wide1792,
    Tall1792,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Square1024 => "1024x1024",
            ImageSize::Wide1792 => "1792x1024",
            ImageSize::Tall1792 => "1024x1792",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "1024x1024" => Some(ImageSize::Square1024),
            "1792x1024" => Some(ImageSize::Wide1792),
            "1024x1792" => Some(ImageSize::Tall1792),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageQuality {
    Standard,
    Hd,
}

impl ImageQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageQuality::Standard => "standard",
            ImageQuality::Hd => "hd",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(ImageQuality::Standard),
            "hd" => Some(ImageQuality::Hd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub model: String,
    pub size: ImageSize,
    pub quality: ImageQuality,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        GenerateConfig {
            model: DEFAULT_MODEL.to_string(),
            size: ImageSize::Square1024,
            quality: ImageQuality::Standard,
        }
    }
}

impl GenerateConfig {
    /// Reads IMAGE_MODEL, IMAGE_SIZE and IMAGE_QUALITY from the environment.
    /// Unset variables fall back to defaults; invalid values are fatal.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = GenerateConfig::default();

        if let Ok(model) = env::var("IMAGE_MODEL") {
            config.model = model;
        }
        if let Ok(size) = env::var("IMAGE_SIZE") {
            config.size = ImageSize::parse(&size)
                .ok_or_else(|| anyhow::anyhow!("unsupported IMAGE_SIZE: {}", size))?;
        }
        if let Ok(quality) = env::var("IMAGE_QUALITY") {
            config.quality = ImageQuality::parse(&quality)
                .ok_or_else(|| anyhow::anyhow!("unsupported IMAGE_QUALITY: {}", quality))?;
        }

        Ok(config)
    }
}

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("image API request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("image API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("could not parse image API response: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("no image URL returned")]
    NoImage,
}

/// Capability to turn a text prompt into a fetchable image URL. The driver
/// only depends on this trait so tests can substitute a fake.
#[async_trait]
pub trait ImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

#[derive(Serialize, Debug)]
struct CreateImageRequest {
    model: String,
    prompt: String,
    n: usize,
    size: String,
    quality: String,
    response_format: String,
}

#[derive(Deserialize, Debug)]
struct CreateImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize, Debug)]
struct ImageData {
    url: String,
}

/// One billed API call per invocation. Constructed once at startup with the
/// credential passed in explicitly.
pub struct DalleClient {
    client: Client,
    api_key: String,
    config: GenerateConfig,
}

impl DalleClient {
    pub fn new(client: Client, api_key: String, config: GenerateConfig) -> Self {
        DalleClient {
            client,
            api_key,
            config,
        }
    }
}

#[async_trait]
impl ImageGenerator for DalleClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let request = CreateImageRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            n: 1,
            size: self.config.size.as_str().to_string(),
            quality: self.config.quality.as_str().to_string(),
            response_format: "url".to_string(),
        };

        debug!("Sending generate image request: {:?}", request);

        let response = self
            .client
            .post(IMAGES_ENDPOINT)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        debug!("Response text: {}", response_text);

        if status.is_success() {
            let generate_response: CreateImageResponse = serde_json::from_str(&response_text)?;

            if let Some(image_data) = generate_response.data.first() {
                info!("Image generated. URL: {}", image_data.url);
                Ok(image_data.url.clone())
            } else {
                Err(GenerateError::NoImage)
            }
        } else {
            let message = match serde_json::from_str::<Value>(&response_text) {
                Ok(body) => body["error"]["message"]
                    .as_str()
                    .unwrap_or(&response_text)
                    .to_string(),
                Err(_) => response_text,
            };
            error!("API Error ({}): {}", status, message);
            Err(GenerateError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
