//! Mock provider implementations for testing.

use super::{
    EmailMessage, EmailProvider, EmailReceipt, GeneratedImage, ImageProvider, ImageRequest,
    ProviderError,
};
use crate::models::cached_image::DEFAULT_IMAGE_MIME_TYPE;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How a mock provider answers every call.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    Succeed,
    Fail(ProviderError),
}

/// Mock image provider. Each call yields distinct bytes so repeated
/// generations are distinguishable from cache hits.
pub struct MockImageProvider {
    behavior: MockBehavior,
    delay: Duration,
    call_count: AtomicU64,
    prompts: Mutex<Vec<ImageRequest>>,
}

impl MockImageProvider {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Succeed)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delay: Duration::ZERO,
            call_count: AtomicU64::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Simulate provider latency.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> u64 {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

impl Default for MockImageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageProvider for MockImageProvider {
    async fn generate_image(
        &self,
        request: &ImageRequest,
    ) -> Result<GeneratedImage, ProviderError> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.clone());
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.behavior {
            MockBehavior::Succeed => {
                tracing::info!(call = n, "[MOCK] Image would be generated");
                Ok(GeneratedImage {
                    data: STANDARD.encode(format!("\u{89}PNG mock image #{}", n)),
                    mime_type: DEFAULT_IMAGE_MIME_TYPE.to_string(),
                    text: None,
                })
            }
            MockBehavior::Fail(err) => Err(err.clone()),
        }
    }

    fn is_configured(&self) -> bool {
        !matches!(
            self.behavior,
            MockBehavior::Fail(ProviderError::NotConfigured(_))
        )
    }
}

/// Mock email provider for testing
pub struct MockEmailProvider {
    behavior: MockBehavior,
    send_count: AtomicU64,
    sent: Mutex<Vec<EmailMessage>>,
}

impl MockEmailProvider {
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Succeed)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for MockEmailProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &EmailMessage) -> Result<EmailReceipt, ProviderError> {
        if let MockBehavior::Fail(err) = &self.behavior {
            return Err(err.clone());
        }

        let n = self.send_count.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email.clone());
        }

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(EmailReceipt {
            provider_id: Some(format!("mock-email-{}", n)),
        })
    }

    fn is_configured(&self) -> bool {
        !matches!(
            self.behavior,
            MockBehavior::Fail(ProviderError::NotConfigured(_))
        )
    }
}
