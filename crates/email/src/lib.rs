//! Planmart Email Service
//!
//! Delivers storefront notifications to the shop inbox:
//! - AWS SES integration for production email delivery
//! - Mock email service for testing and development
//! - LocalStack endpoint support for local runs
//! - Contact message templates and a shared HTML layout for other notices

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod ses;
pub mod content;
pub mod mock;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Email validation error: {0}")]
    Validation(String),

    #[error("AWS SES error: {0}")]
    AwsSes(String),
}

/// Email message to be sent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: String,
    pub from: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl EmailMessage {
    /// Create a new email message
    pub fn new(to: String, from: String, subject: String, body_text: String) -> Self {
        Self {
            to,
            from,
            reply_to: None,
            subject,
            body_text,
            body_html: None,
            metadata: HashMap::new(),
        }
    }

    /// Add HTML body content
    pub fn with_html(mut self, body_html: String) -> Self {
        self.body_html = Some(body_html);
        self
    }

    /// Add reply-to address
    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }

    /// Add metadata for tracking
    pub fn with_metadata(mut self, key: String, value: String) -> Self {
        self.metadata.insert(key, value);
        self
    }
}

/// Email delivery receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailReceipt {
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
    pub provider: String,
    pub metadata: HashMap<String, String>,
}

/// A notification addressed to the shop inbox
#[derive(Debug, Clone)]
pub struct InboxNotice {
    /// Value recorded under the `email_type` metadata key
    pub kind: &'static str,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
    /// Customer address the shop replies to
    pub reply_to: Option<String>,
}

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email service provider (ses, mock)
    pub provider: String,
    /// AWS region for SES
    pub aws_region: Option<String>,
    /// AWS endpoint URL (for LocalStack)
    pub aws_endpoint_url: Option<String>,
    /// Default from address
    pub default_from: String,
    /// Enable email sending (can disable for testing)
    pub enabled: bool,
    /// Where contact messages and orders are delivered
    pub contact_inbox: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: "mock".to_string(),
            aws_region: None,
            aws_endpoint_url: None,
            default_from: "notifications@planmart.app".to_string(),
            enabled: true,
            contact_inbox: "orders@planmart.app".to_string(),
        }
    }
}

impl EmailConfig {
    /// Create email config from environment variables
    pub fn from_env() -> Result<Self, EmailError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let provider = std::env::var("EMAIL_PROVIDER").unwrap_or(defaults.provider);

        let aws_region = std::env::var("AWS_REGION").ok();
        let aws_endpoint_url = std::env::var("AWS_ENDPOINT_URL").ok();

        let default_from = std::env::var("FROM_EMAIL").unwrap_or(defaults.default_from);

        let enabled = std::env::var("EMAIL_ENABLED")
            .unwrap_or_else(|_| "true".to_string())
            .parse()
            .unwrap_or(true);

        let contact_inbox = std::env::var("CONTACT_INBOX").unwrap_or(defaults.contact_inbox);
        if !contact_inbox.contains('@') {
            return Err(EmailError::Configuration(format!(
                "CONTACT_INBOX is not an email address: {}",
                contact_inbox
            )));
        }

        Ok(Self {
            provider,
            aws_region,
            aws_endpoint_url,
            default_from,
            enabled,
            contact_inbox,
        })
    }
}

/// Email service trait for different implementations
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Send an email message
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError>;

    /// Return the default "from" address for outgoing emails
    fn default_from(&self) -> String;

    /// Return the shop inbox that receives customer notifications
    fn contact_inbox(&self) -> String;

    /// Deliver a notification to the shop inbox
    async fn notify_inbox(&self, notice: InboxNotice) -> Result<EmailReceipt, EmailError> {
        let mut message = EmailMessage::new(
            self.contact_inbox(),
            self.default_from(),
            notice.subject,
            notice.body_text,
        )
        .with_html(notice.body_html)
        .with_metadata("email_type".to_string(), notice.kind.to_string());

        if let Some(reply_to) = notice.reply_to {
            message = message.with_reply_to(reply_to);
        }

        self.send_email(message).await
    }

    /// Forward a storefront contact form submission
    async fn send_contact_message(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        body: &str,
    ) -> Result<EmailReceipt, EmailError> {
        let received_at = Utc::now();
        let notice = InboxNotice {
            kind: "contact_message",
            subject: format!("New contact message from {}", name),
            body_text: content::contact_message_text(name, email, phone, body, received_at),
            body_html: content::contact_message_html(name, email, phone, body, received_at),
            reply_to: Some(email.to_string()),
        };

        self.notify_inbox(notice).await
    }
}

/// Email service factory
pub struct EmailServiceFactory;

impl EmailServiceFactory {
    /// Create email service based on configuration
    pub async fn create(config: EmailConfig) -> Result<Box<dyn EmailService>, EmailError> {
        if !config.enabled {
            tracing::info!("Email service disabled, using mock implementation");
            return Ok(Box::new(mock::MockEmailService::new_disabled()));
        }

        match config.provider.as_str() {
            "ses" | "aws-ses" => {
                tracing::info!("Creating AWS SES email service");
                let ses_service = ses::SesEmailService::new(config).await?;
                Ok(Box::new(ses_service))
            }
            "mock" => {
                tracing::info!("Creating mock email service");
                Ok(Box::new(mock::MockEmailService::with_inbox(
                    config.default_from,
                    config.contact_inbox,
                )))
            }
            provider => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: ses, mock",
                provider
            ))),
        }
    }
}
