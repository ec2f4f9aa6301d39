//! Avatar image generation through the OpenAI images API.

use crate::catalog::StylePreset;
use crate::config::{Config, OPENAI_API_KEY_VAR};
use crate::error::{ConfigError, ServiceError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Image model; answers with a hosted URL.
const IMAGE_MODEL: &str = "dall-e-3";

const COMPOSITION: &str = "The image should be a beautiful close-up portrait suitable for a profile picture with the setting visible in the background. Centered composition, masterful quality, highly detailed, professional artistic execution.";

/// Builds the generation prompt for one user and style.
pub fn compose_prompt(description: &str, style: &StylePreset, setting: &str) -> String {
    format!(
        "Create a stunning profile picture portrait of a person with these features: {description}\n\n\
         Setting: {setting}\n\n\
         Art style: {}\n\n\
         {COMPOSITION}",
        style.prompt_suffix
    )
}

/// Generates an image for a prompt and hands back where to fetch it.
#[async_trait]
pub trait AvatarSynthesizer: Send + Sync {
    /// Returns a temporary URL of the generated image.
    async fn synthesize(&self, prompt: &str) -> Result<String, ServiceError>;
}

/// Builder for [`OpenAiImageSynthesizer`].
#[derive(Debug, Clone, Default)]
pub struct OpenAiImageSynthesizerBuilder {
    api_key: Option<String>,
    size: Option<String>,
    quality: Option<String>,
    base_url: Option<String>,
}

impl OpenAiImageSynthesizerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the output size (default: "1024x1024").
    pub fn size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Sets the quality. For dall-e-3: "standard" (default) or "hd".
    pub fn quality(mut self, quality: impl Into<String>) -> Self {
        self.quality = Some(quality.into());
        self
    }

    /// Overrides the API base URL (default `https://api.openai.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the synthesizer.
    pub fn build(self) -> Result<OpenAiImageSynthesizer, ConfigError> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingVar(OPENAI_API_KEY_VAR))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAiImageSynthesizer {
            client: reqwest::Client::new(),
            api_key,
            size: self.size.unwrap_or_else(|| "1024x1024".into()),
            quality: self.quality.unwrap_or_else(|| "standard".into()),
            endpoint: format!("{}/images/generations", base_url.trim_end_matches('/')),
        })
    }
}

/// [`AvatarSynthesizer`] backed by the OpenAI images API.
pub struct OpenAiImageSynthesizer {
    client: reqwest::Client,
    api_key: String,
    size: String,
    quality: String,
    endpoint: String,
}

impl OpenAiImageSynthesizer {
    /// Creates a new `OpenAiImageSynthesizerBuilder`.
    pub fn builder() -> OpenAiImageSynthesizerBuilder {
        OpenAiImageSynthesizerBuilder::new()
    }

    /// Builds a synthesizer with default settings from the run configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::builder().api_key(&config.openai_api_key).build()
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ImageRequest<'a> {
        ImageRequest {
            model: IMAGE_MODEL,
            prompt,
            n: 1,
            size: &self.size,
            quality: &self.quality,
            response_format: "url",
        }
    }
}

#[async_trait]
impl AvatarSynthesizer for OpenAiImageSynthesizer {
    async fn synthesize(&self, prompt: &str) -> Result<String, ServiceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), &text));
        }

        let body: ImageResponse = serde_json::from_slice(&response.bytes().await?)?;
        let image = body.data.into_iter().next().ok_or_else(|| {
            ServiceError::MalformedResponse("no images in OpenAI response".into())
        })?;

        if let Some(revised) = &image.revised_prompt {
            tracing::debug!(revised_prompt = %revised, "prompt revised by model");
        }

        image.url.ok_or_else(|| {
            ServiceError::MalformedResponse("OpenAI response contained no image URL".into())
        })
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    quality: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    revised_prompt: Option<String>,
}
