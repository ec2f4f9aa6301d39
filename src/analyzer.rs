//! Source photo analysis through the OpenAI vision (chat completions) API.

use crate::config::{Config, OPENAI_API_KEY_VAR};
use crate::error::{AnalyzeError, ConfigError, ServiceError};
use crate::image::ImageFormat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Multimodal chat model used for photo descriptions.
const VISION_MODEL: &str = "gpt-4o";

/// Description used when the model refuses to describe the photo.
pub const FALLBACK_DESCRIPTION: &str =
    "a friendly person with an approachable expression, suitable for a stylized avatar";

/// Phrases whose presence marks a reply as a refusal.
const REFUSAL_MARKERS: [&str; 3] = ["sorry", "can't", "cannot"];

const SYSTEM_PROMPT: &str = r#"You are a creative artist helping to create stylized avatar artwork.

Your task: Describe the visual characteristics you see in this reference photo that would help an artist create a stylized cartoon/anime avatar. Focus on artistic elements like:
- Hair: approximate color, general style (short/long, straight/wavy/curly)
- General face shape for artistic interpretation
- Any distinctive style elements (glasses, facial hair, etc.)
- Overall aesthetic vibe

This is for creating FICTIONAL ARTISTIC AVATARS, not identifying real people.
Keep it brief (2-3 sentences) and artistic in nature.
Example: "Short dark wavy hair, round friendly face shape, wearing rectangular glasses, warm cheerful expression perfect for a Ghibli-style character.""#;

const USER_PROMPT: &str = "I'm creating stylized avatar art. Please describe the key visual elements from this reference that would help create an artistic avatar character:";

/// Returns true if a vision reply reads like a refusal.
///
/// This is a plain substring heuristic over the lowercased text. It misses
/// refusals phrased without any marker and flags descriptions that happen
/// to contain one.
pub fn is_refusal(text: &str) -> bool {
    let lower = text.to_lowercase();
    REFUSAL_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Turns a local photo into a short prompt-ready description.
#[async_trait]
pub trait PhotoAnalyzer: Send + Sync {
    /// Describes the person in the photo at `path`.
    async fn analyze(&self, path: &Path) -> Result<String, AnalyzeError>;
}

/// Builder for [`OpenAiVisionAnalyzer`].
#[derive(Debug, Clone, Default)]
pub struct OpenAiVisionAnalyzerBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    max_tokens: Option<u32>,
}

impl OpenAiVisionAnalyzerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Overrides the API base URL (default `https://api.openai.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Caps the length of the description (default 300 tokens).
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Builds the analyzer.
    pub fn build(self) -> Result<OpenAiVisionAnalyzer, ConfigError> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingVar(OPENAI_API_KEY_VAR))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Ok(OpenAiVisionAnalyzer {
            client: reqwest::Client::new(),
            api_key,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            max_tokens: self.max_tokens.unwrap_or(300),
        })
    }
}

/// [`PhotoAnalyzer`] backed by OpenAI chat completions with image input.
pub struct OpenAiVisionAnalyzer {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    max_tokens: u32,
}

impl OpenAiVisionAnalyzer {
    /// Creates a new `OpenAiVisionAnalyzerBuilder`.
    pub fn builder() -> OpenAiVisionAnalyzerBuilder {
        OpenAiVisionAnalyzerBuilder::new()
    }

    /// Builds an analyzer with default settings from the run configuration.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::builder().api_key(&config.openai_api_key).build()
    }

    async fn describe(&self, image_url: String) -> Result<String, ServiceError> {
        let body = ChatRequest {
            model: VISION_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: MessageContent::Text(SYSTEM_PROMPT),
                },
                ChatMessage {
                    role: "user",
                    content: MessageContent::Parts(vec![
                        ContentPart::Text { text: USER_PROMPT },
                        ContentPart::ImageUrl {
                            image_url: ImageUrl { url: image_url },
                        },
                    ]),
                },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ServiceError::from_status(status.as_u16(), &text));
        }

        let chat: ChatResponse = serde_json::from_slice(&response.bytes().await?)?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                ServiceError::MalformedResponse("no description in vision response".into())
            })
    }
}

#[async_trait]
impl PhotoAnalyzer for OpenAiVisionAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<String, AnalyzeError> {
        tracing::info!(path = %path.display(), "analyzing photo");

        let format = ImageFormat::from_path(path)
            .ok_or_else(|| AnalyzeError::UnsupportedImage(path.to_path_buf()))?;
        let data = tokio::fs::read(path)
            .await
            .map_err(|source| AnalyzeError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let description = self.describe(format.to_data_url(&data)).await?;

        if is_refusal(&description) {
            tracing::warn!("model declined to analyze photo, using generic description");
            return Ok(FALLBACK_DESCRIPTION.to_string());
        }

        tracing::info!(description = %preview(&description, 100), "photo described");
        Ok(description)
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Parts(Vec<ContentPart<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
