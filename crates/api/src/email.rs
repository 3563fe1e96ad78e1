//! Outgoing e-mail
//!
//! [`EmailSender`] wraps a body fragment in the standard HTML envelope and
//! hands it to a [`MailTransport`]. Delivery goes through the Resend HTTP API
//! in production. A send is a single attempt; errors go back to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

/// Email configuration
#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    /// Sender address. Sending is refused while this is unset.
    pub from: Option<String>,
}

impl EmailConfig {
    pub fn new(from: Option<String>) -> Self {
        Self { from }
    }

    /// The configured sender address, if it is non-empty
    fn sender(&self) -> Option<&str> {
        self.from.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

/// What callers ask to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailParams {
    pub to: String,
    pub subject: String,
    /// HTML-safe body fragment, placed inside the envelope as is
    pub text: String,
}

/// A fully addressed message handed to the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("sender address not provided, configure SMTP_FROM to send e-mail")]
    SenderNotConfigured,
    #[error("mail transport failed: {0}")]
    Transport(String),
    #[error("mail provider rejected message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivers a message or reports why it could not
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;
}

/// Resend API transport
#[derive(Clone)]
pub struct ResendTransport {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl ResendTransport {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MailTransport for ResendTransport {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let body = serde_json::json!({
            "from": email.from,
            "to": [email.to],
            "subject": email.subject,
            "html": email.html,
        });

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(EmailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

/// Sends templated e-mail through a [`MailTransport`]
#[derive(Clone)]
pub struct EmailSender {
    config: EmailConfig,
    transport: Arc<dyn MailTransport>,
}

impl EmailSender {
    pub fn new(config: EmailConfig, transport: Arc<dyn MailTransport>) -> Self {
        Self { config, transport }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.sender().is_some()
    }

    pub async fn send_email(&self, params: EmailParams) -> Result<(), EmailError> {
        let from = self.config.sender().ok_or_else(|| {
            tracing::error!(subject = %params.subject, "Refusing to send e-mail without a sender address");
            EmailError::SenderNotConfigured
        })?;

        let email = OutgoingEmail {
            from: from.to_string(),
            to: params.to,
            subject: params.subject,
            html: envelope(&params.text),
        };

        match self.transport.send(&email).await {
            Ok(()) => {
                tracing::info!(to = %email.to, subject = %email.subject, "E-mail sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(to = %email.to, subject = %email.subject, error = %e, "Failed to send e-mail");
                Err(e)
            }
        }
    }
}

fn envelope(text: &str) -> String {
    format!("<html>\n<body style=\"font-size: 15px\">\n{text}\n</body>\n</html>")
}
