//! Gemini image provider implementation.
//!
//! Calls `generateContent` on an image-capable Gemini model with image
//! output enabled and returns the first inline image of the first candidate.

use super::{GeneratedImage, ImageProvider, ImageRequest, ProviderError};
use crate::models::cached_image::DEFAULT_IMAGE_MIME_TYPE;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini provider configuration.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<Secret<String>>,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

/// Gemini image provider.
pub struct GeminiImageProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiImageProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ImageProvider for GeminiImageProvider {
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("GOOGLE_API_KEY not configured".to_string())
        })?;

        let body = build_request(request);

        tracing::debug!(
            model = %self.config.model,
            prompt_len = request.prompt.len(),
            "Sending image request to Gemini API"
        );

        let response = self
            .client
            .post(self.api_url())
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "Gemini API error {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ApiError(format!("Failed to parse response: {}", e)))?;

        extract_first_image(api_response)
    }

    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }
}

fn build_request(request: &ImageRequest) -> GenerateContentRequest {
    GenerateContentRequest {
        system_instruction: Some(Content {
            role: None,
            parts: vec![ContentPart::Text {
                text: request.system_instruction.clone(),
            }],
        }),
        contents: vec![Content {
            role: Some("user".to_string()),
            parts: vec![ContentPart::Text {
                text: request.prompt.clone(),
            }],
        }],
        generation_config: GenerationConfig {
            response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
        },
    }
}

fn extract_first_image(response: GenerateContentResponse) -> Result<GeneratedImage, ProviderError> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(ProviderError::ContentFiltered(reason));
    }

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(ProviderError::NoImage);
    };

    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let mut text: Option<String> = None;
    let mut image: Option<InlineData> = None;
    for part in parts {
        match part {
            ContentPart::InlineData { inline_data } if image.is_none() => {
                image = Some(inline_data)
            }
            ContentPart::Text { text: t } if text.is_none() => text = Some(t),
            _ => {}
        }
    }

    match image {
        Some(inline) if !inline.data.is_empty() => Ok(GeneratedImage {
            data: inline.data,
            mime_type: inline
                .mime_type
                .unwrap_or_else(|| DEFAULT_IMAGE_MIME_TYPE.to_string()),
            text,
        }),
        _ if candidate.finish_reason.as_deref() == Some("SAFETY") => Err(
            ProviderError::ContentFiltered("candidate blocked by safety filter".to_string()),
        ),
        _ => Err(ProviderError::NoImage),
    }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ContentPart {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
    Text {
        text: String,
    },
    Other(serde_json::Value),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    #[serde(default)]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
