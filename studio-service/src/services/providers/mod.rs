//! Outbound provider abstractions and implementations.
//!
//! Image generation (Gemini) and mail relay (SMTP) sit behind traits so the
//! HTTP layer can be exercised against mock backends.

pub mod gemini;
pub mod mock;
pub mod smtp;

use async_trait::async_trait;
use service_core::error::AppError;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiImageProvider};
pub use mock::{MockBehavior, MockEmailProvider, MockImageProvider};
pub use smtp::SmtpProvider;

/// Error type for provider operations.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("No image was generated")]
    NoImage,

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => AppError::ConfigError(anyhow::anyhow!(msg)),
            ProviderError::InvalidAddress(msg) => AppError::BadRequest(anyhow::anyhow!(msg)),
            ProviderError::Authentication(msg) => AppError::EmailAuthError(msg),
            ProviderError::Transport(msg) => AppError::EmailError(msg),
            other @ (ProviderError::ApiError(_)
            | ProviderError::NoImage
            | ProviderError::ContentFiltered(_)
            | ProviderError::RateLimited
            | ProviderError::NetworkError(_)) => AppError::UpstreamError(other.to_string()),
        }
    }
}

/// A single image generation call.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub system_instruction: String,
    pub prompt: String,
}

/// First image returned by a provider.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    /// Base64-encoded image bytes.
    pub data: String,
    pub mime_type: String,
    /// Any text the model returned alongside the image.
    pub text: Option<String>,
}

/// Trait for image generation providers (e.g., Gemini image models).
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn generate_image(&self, request: &ImageRequest)
        -> Result<GeneratedImage, ProviderError>;

    /// Whether credentials are present; an unconfigured provider fails every call.
    fn is_configured(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailReceipt {
    pub provider_id: Option<String>,
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<EmailReceipt, ProviderError>;
    fn is_configured(&self) -> bool;
}
