//! Image-description service client.
//!
//! Sends the full source image to a vision-capable chat-completion
//! endpoint and returns a short natural-language caption. The client
//! is an explicit handle: construct it once, pass it where needed,
//! point it at a local listener in tests. It is strictly
//! fire-and-forget relative to pagination: every failure (connect,
//! timeout, HTTP status, malformed body) is logged and folded into the
//! configured fallback string, so a caption can never block or break
//! PDF output.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Caption used whenever the service cannot produce one.
pub const DEFAULT_FALLBACK: &str = "Captured screenshot";

const CAPTION_PROMPT: &str =
    "Describe this screenshot in one short sentence suitable as a document title.";

/// Caption service configuration.
#[derive(Debug, Clone)]
pub struct CaptionConfig {
    /// Chat-completion endpoint URL.
    pub endpoint: String,
    /// Bearer token for the service.
    pub api_key: String,
    /// Model name sent with each request.
    pub model: String,
    /// Token budget for the generated caption.
    pub max_tokens: u32,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Returned verbatim whenever the request fails.
    pub fallback: String,
}

impl CaptionConfig {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 60,
            timeout: Duration::from_secs(20),
            fallback: DEFAULT_FALLBACK.into(),
        }
    }
}

#[derive(Error, Debug)]
enum CaptionError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Serialize)]
struct CaptionRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: Vec<ContentPart<'a>>,
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
struct CaptionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Reusable caption service handle.
pub struct CaptionClient {
    http: reqwest::Client,
    config: CaptionConfig,
}

impl CaptionClient {
    pub fn new(config: CaptionConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Describe an image, falling back to the configured string on any
    /// failure. Infallible by construction: callers may `tokio::spawn`
    /// this beside pagination without an error path to handle.
    pub async fn describe(&self, image_bytes: &[u8], mime: &str) -> String {
        match self.request_caption(image_bytes, mime).await {
            Ok(caption) => caption,
            Err(e) => {
                warn!(error = %e, "Caption service failed, using fallback");
                self.config.fallback.clone()
            }
        }
    }

    async fn request_caption(
        &self,
        image_bytes: &[u8],
        mime: &str,
    ) -> Result<String, CaptionError> {
        let payload = build_request(&self.config, image_bytes, mime);

        let response = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.timeout)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptionError::Status(status));
        }

        let body: CaptionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| CaptionError::Malformed("No caption in response".into()))
    }
}

fn build_request<'a>(
    config: &'a CaptionConfig,
    image_bytes: &[u8],
    mime: &str,
) -> CaptionRequest<'a> {
    let data_url = format!("data:{};base64,{}", mime, BASE64.encode(image_bytes));
    CaptionRequest {
        model: &config.model,
        max_tokens: config.max_tokens,
        messages: vec![Message {
            role: "user",
            content: vec![
                ContentPart::Text {
                    text: CAPTION_PROMPT,
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ],
        }],
    }
}
