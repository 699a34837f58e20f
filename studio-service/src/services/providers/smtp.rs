use super::{EmailMessage, EmailProvider, EmailReceipt, ProviderError};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::{authentication::Credentials, Error as SmtpError},
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;

/// SMTP reply codes meaning the relay refused our credentials.
const AUTH_REJECTED_CODES: [&str; 3] = ["530", "534", "535"];

pub struct SmtpProvider {
    config: SmtpConfig,
    /// `None` when credentials are unset; every send then fails as unconfigured.
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self, ProviderError> {
        let (user, password) = match (&config.user, &config.password) {
            (Some(user), Some(password)) => (user.clone(), password.expose_secret().clone()),
            _ => {
                return Ok(Self {
                    config,
                    transport: None,
                })
            }
        };

        let creds = Credentials::new(user, password);

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailMessage) -> Result<EmailReceipt, ProviderError> {
        let transport = self.transport.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("SMTP credentials not configured".to_string())
        })?;

        let message = build_message(&self.config, email)?;

        let response = transport.send(message).await.map_err(classify_smtp_error)?;

        let provider_id = response.message().next().map(|s| s.to_string());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(EmailReceipt { provider_id })
    }

    fn is_configured(&self) -> bool {
        self.transport.is_some()
    }
}

/// Build a multipart/alternative message with text and HTML bodies.
fn build_message(config: &SmtpConfig, email: &EmailMessage) -> Result<Message, ProviderError> {
    let from_mailbox: Mailbox = format!("{} <{}>", config.from_name, config.from_email)
        .parse()
        .map_err(|e| ProviderError::NotConfigured(format!("Invalid from address: {}", e)))?;

    let to_mailbox: Mailbox = email
        .to
        .parse()
        .map_err(|e| ProviderError::NotConfigured(format!("Invalid recipient: {}", e)))?;

    let mut message_builder = Message::builder()
        .from(from_mailbox)
        .to(to_mailbox)
        .subject(&email.subject);

    if let Some(reply_to) = &email.reply_to {
        let reply_mailbox: Mailbox = reply_to
            .parse()
            .map_err(|e| ProviderError::InvalidAddress(format!("Invalid reply-to: {}", e)))?;
        message_builder = message_builder.reply_to(reply_mailbox);
    }

    message_builder
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.body_text.clone()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(email.body_html.clone()),
                ),
        )
        .map_err(|e| ProviderError::Transport(format!("Failed to build message: {}", e)))
}

fn classify_smtp_error(err: SmtpError) -> ProviderError {
    let rejected_credentials = err
        .status()
        .map(|code| AUTH_REJECTED_CODES.contains(&code.to_string().as_str()))
        .unwrap_or(false);

    if rejected_credentials {
        tracing::error!("SMTP relay rejected credentials: {}", err);
        ProviderError::Authentication(format!("SMTP authentication failed: {}", err))
    } else {
        tracing::error!("SMTP send failed: {}", err);
        ProviderError::Transport(format!("Failed to send email: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn smtp_config(user: Option<&str>, password: Option<&str>) -> SmtpConfig {
        SmtpConfig {
            host: "smtp.test.local".to_string(),
            port: 587,
            user: user.map(str::to_string),
            password: password.map(|p| Secret::new(p.to_string())),
            from_email: "noreply@example.com".to_string(),
            from_name: "Studio Website".to_string(),
            recipient: "studio@example.com".to_string(),
        }
    }

    fn message() -> EmailMessage {
        EmailMessage {
            to: "studio@example.com".to_string(),
            subject: "New contact".to_string(),
            body_text: "hello".to_string(),
            body_html: "<p>hello</p>".to_string(),
            reply_to: Some("visitor@example.com".to_string()),
        }
    }

    #[tokio::test]
    async fn missing_credentials_is_not_configured() {
        let provider = SmtpProvider::new(smtp_config(Some("user"), None)).unwrap();
        assert!(!provider.is_configured());

        let result = provider.send(&message()).await;
        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }

    #[test]
    fn builds_alternative_message_with_reply_to() {
        let config = smtp_config(Some("user"), Some("pass"));
        let built = build_message(&config, &message()).unwrap();
        let raw = String::from_utf8(built.formatted()).unwrap();

        assert!(raw.contains("Reply-To: visitor@example.com"));
        assert!(raw.contains("multipart/alternative"));
        assert!(raw.contains("text/plain"));
        assert!(raw.contains("text/html"));
    }
}
