use crate::services::providers::{EmailMessage, EmailProvider, EmailReceipt};
use askama::Template;
use metrics::counter;
use service_core::error::AppError;
use std::sync::Arc;

#[derive(Template)]
#[template(path = "email/contact.txt")]
struct ContactTextTemplate<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactHtmlTemplate<'a> {
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Relays contact-form submissions to the site owner's inbox.
#[derive(Clone)]
pub struct ContactMailer {
    provider: Arc<dyn EmailProvider>,
    recipient: String,
}

impl ContactMailer {
    pub fn new(provider: Arc<dyn EmailProvider>, recipient: String) -> Self {
        Self {
            provider,
            recipient,
        }
    }

    /// Send one submission; replies go straight to the submitter.
    pub async fn relay(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<EmailReceipt, AppError> {
        let email_message = compose(&self.recipient, name, email, message)?;

        match self.provider.send(&email_message).await {
            Ok(receipt) => {
                counter!("contact_emails_total", "status" => "sent").increment(1);
                Ok(receipt)
            }
            Err(e) => {
                counter!("contact_emails_total", "status" => "failed").increment(1);
                tracing::error!(error = %e, "Failed to relay contact form");
                Err(e.into())
            }
        }
    }
}

fn compose(
    recipient: &str,
    name: &str,
    email: &str,
    message: &str,
) -> Result<EmailMessage, AppError> {
    let body_text = ContactTextTemplate {
        name,
        email,
        message,
    }
    .render()
    .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to render email: {}", e)))?;

    let body_html = ContactHtmlTemplate {
        name,
        email,
        message,
    }
    .render()
    .map_err(|e| AppError::InternalError(anyhow::anyhow!("Failed to render email: {}", e)))?;

    Ok(EmailMessage {
        to: recipient.to_string(),
        subject: format!("New contact form submission from {}", name.trim()),
        body_text,
        body_html,
        reply_to: Some(email.to_string()),
    })
}
