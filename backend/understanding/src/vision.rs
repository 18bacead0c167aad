//! Vision analysis of product labels through a hosted multimodal model.
//!
//! The model is asked for the six label fields as a numbered list, but its
//! output is treated as free text and handed to the extractor unchanged.
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::Value;
use tracing::{info, warn};

use shelfscan_core::{LabelAnalyzer, LabelImage, ShelfError};
use shelfscan_logging::redact_sensitive_data;

/// Prompt sent alongside every label image.
pub const LABEL_PROMPT: &str = "You are reading the label of a retail product. \
Report the following details as a numbered list, one per line, using exactly these labels:\n\
1. Brand Name:\n\
2. Date of Manufacturing:\n\
3. Date of Expiry:\n\
4. Quantity:\n\
5. MRP:\n\
6. Basic Details:\n\
If a detail is not visible, write \"Not specified\".";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Supported vision providers.
#[derive(Debug, Clone)]
pub enum VisionProvider {
    OpenAi { api_key: String, model: String },
    Gemini { api_key: String, model: String },
}

impl VisionProvider {
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::OpenAi { api_key: api_key.into(), model: DEFAULT_OPENAI_MODEL.to_string() }
    }

    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self::Gemini { api_key: api_key.into(), model: DEFAULT_GEMINI_MODEL.to_string() }
    }

    /// Replace the model name.
    pub fn with_model(self, model: impl Into<String>) -> Self {
        let model = model.into();
        match self {
            Self::OpenAi { api_key, .. } => Self::OpenAi { api_key, model },
            Self::Gemini { api_key, .. } => Self::Gemini { api_key, model },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi { .. } => "openai",
            Self::Gemini { .. } => "gemini",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Self::OpenAi { model, .. } | Self::Gemini { model, .. } => model.as_str(),
        }
    }
}

/// [`LabelAnalyzer`] backed by a [`VisionProvider`].
pub struct VisionAnalyzer {
    provider: VisionProvider,
    client: reqwest::Client,
}

impl VisionAnalyzer {
    pub fn new(provider: VisionProvider, timeout: Duration) -> Result<Self, ShelfError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShelfError::Analysis {
                provider: provider.name().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { provider, client })
    }

    pub fn provider(&self) -> &VisionProvider {
        &self.provider
    }

    fn analysis_error(&self, message: impl Into<String>) -> ShelfError {
        ShelfError::Analysis {
            provider: self.provider.name().to_string(),
            message: redact_sensitive_data(&message.into()),
        }
    }

    async fn post(&self, request: reqwest::RequestBuilder) -> Result<Value, ShelfError> {
        let resp = request
            .send()
            .await
            .map_err(|e| self.analysis_error(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(provider = self.provider.name(), %status, "Vision request rejected");
            return Err(self.analysis_error(format!("HTTP {status}: {body}")));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| self.analysis_error(format!("malformed response: {e}")))
    }
}

#[async_trait]
impl LabelAnalyzer for VisionAnalyzer {
    fn name(&self) -> &str {
        self.provider.name()
    }

    async fn analyze(&self, image: &LabelImage) -> Result<String, ShelfError> {
        let b64 = STANDARD.encode(&image.bytes);
        info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            source = %image.source,
            "[Vision] Analyzing label"
        );

        let text = match &self.provider {
            VisionProvider::OpenAi { api_key, model } => {
                let body = openai_body(model, &b64, &image.mime_type);
                let json = self
                    .post(
                        self.client
                            .post("https://api.openai.com/v1/chat/completions")
                            .bearer_auth(api_key)
                            .json(&body),
                    )
                    .await?;
                openai_text(&json)
            }
            VisionProvider::Gemini { api_key, model } => {
                let url = format!(
                    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent"
                );
                let body = gemini_body(&b64, &image.mime_type);
                let json = self
                    .post(
                        self.client
                            .post(&url)
                            .header("x-goog-api-key", api_key)
                            .json(&body),
                    )
                    .await?;
                gemini_text(&json)
            }
        };

        match text {
            Some(text) if !text.trim().is_empty() => Ok(text),
            _ => Err(ShelfError::EmptyResponse {
                provider: self.provider.name().to_string(),
            }),
        }
    }
}

fn openai_body(model: &str, b64: &str, mime_type: &str) -> Value {
    serde_json::json!({
        "model": model,
        "messages": [{
            "role": "user",
            "content": [
                { "type": "text", "text": LABEL_PROMPT },
                { "type": "image_url",
                  "image_url": { "url": format!("data:{};base64,{}", mime_type, b64) } }
            ]
        }],
        "max_tokens": 512
    })
}

fn gemini_body(b64: &str, mime_type: &str) -> Value {
    serde_json::json!({
        "contents": [{ "parts": [
            { "text": LABEL_PROMPT },
            { "inlineData": { "mimeType": mime_type, "data": b64 } }
        ]}]
    })
}

fn openai_text(json: &Value) -> Option<String> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
}

/// Gemini may split one answer across several parts.
fn gemini_text(json: &Value) -> Option<String> {
    let parts = json["candidates"][0]["content"]["parts"].as_array()?;
    let text: Vec<&str> = parts.iter().filter_map(|p| p["text"].as_str()).collect();
    if text.is_empty() {
        None
    } else {
        Some(text.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_openai_content() {
        let json = serde_json::json!({
            "choices": [{ "message": { "content": "1. Brand Name: Acme" } }]
        });
        assert_eq!(openai_text(&json).as_deref(), Some("1. Brand Name: Acme"));
    }

    #[test]
    fn joins_gemini_parts() {
        let json = serde_json::json!({
            "candidates": [{ "content": { "parts": [
                { "text": "1. Brand Name: Acme\n" },
                { "text": "4. Quantity: 500 g" }
            ]}}]
        });
        assert_eq!(
            gemini_text(&json).as_deref(),
            Some("1. Brand Name: Acme\n4. Quantity: 500 g")
        );
    }

    #[test]
    fn missing_text_is_none() {
        assert!(gemini_text(&serde_json::json!({ "candidates": [] })).is_none());
        assert!(openai_text(&serde_json::json!({})).is_none());
    }

    #[test]
    fn with_model_keeps_key() {
        let provider = VisionProvider::gemini("k").with_model("gemini-1.5-pro");
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-1.5-pro");
    }

    #[test]
    fn request_bodies_embed_image() {
        let body = openai_body("gpt-4o", "QUJD", "image/png");
        let url = body["messages"][0]["content"][1]["image_url"]["url"].as_str().unwrap();
        assert_eq!(url, "data:image/png;base64,QUJD");
        let body = gemini_body("QUJD", "image/jpeg");
        assert_eq!(body["contents"][0]["parts"][1]["inlineData"]["mimeType"], "image/jpeg");
    }
}
