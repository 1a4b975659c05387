//! Mock Email Service Implementation
//!
//! Provides in-memory email capture for testing without external dependencies.
//! Integration tests read captured notifications back to check what the shop
//! inbox would have received.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

/// Email captured by the mock service
#[derive(Debug, Clone)]
pub struct CapturedEmail {
    pub message: EmailMessage,
    pub receipt: EmailReceipt,
    pub captured_at: DateTime<Utc>,
}

impl CapturedEmail {
    /// The `email_type` metadata recorded when the message was built
    pub fn email_type(&self) -> Option<&str> {
        self.message.metadata.get("email_type").map(String::as_str)
    }
}

/// Mock email service for testing
#[derive(Debug, Clone)]
pub struct MockEmailService {
    emails: Arc<Mutex<Vec<CapturedEmail>>>,
    email_by_recipient: Arc<Mutex<HashMap<String, Vec<CapturedEmail>>>>,
    default_from: String,
    contact_inbox: String,
    enabled: bool,
    failing: bool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockEmailService {
    /// Create a new mock email service
    pub fn new() -> Self {
        let defaults = EmailConfig::default();
        Self::with_inbox(defaults.default_from, defaults.contact_inbox)
    }

    /// Create a mock that captures mail for a specific inbox
    pub fn with_inbox(default_from: String, contact_inbox: String) -> Self {
        Self {
            emails: Arc::new(Mutex::new(Vec::new())),
            email_by_recipient: Arc::new(Mutex::new(HashMap::new())),
            default_from,
            contact_inbox,
            enabled: true,
            failing: false,
        }
    }

    /// Create a disabled mock email service (for testing)
    pub fn new_disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new()
        }
    }

    /// Create a mock whose every send fails, to exercise error paths
    pub fn new_failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    /// Get all captured emails
    pub fn get_all_emails(&self) -> Vec<CapturedEmail> {
        lock(&self.emails).clone()
    }

    /// Get emails sent to a specific recipient
    pub fn get_emails_for_recipient(&self, email: &str) -> Vec<CapturedEmail> {
        lock(&self.email_by_recipient)
            .get(email)
            .cloned()
            .unwrap_or_default()
    }

    /// Get the most recent email of a given type
    pub fn latest_of_type(&self, email_type: &str) -> Option<CapturedEmail> {
        self.get_all_emails()
            .into_iter()
            .filter(|e| e.email_type() == Some(email_type))
            .max_by_key(|e| e.captured_at)
    }

    /// Get count of emails sent
    pub fn email_count(&self) -> usize {
        lock(&self.emails).len()
    }

    /// Clear all captured emails
    pub fn clear(&self) {
        lock(&self.emails).clear();
        lock(&self.email_by_recipient).clear();
    }

    /// Check if email sending is enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        if self.failing {
            return Err(EmailError::AwsSes("mock delivery failure".to_string()));
        }

        if !self.enabled {
            tracing::warn!("Mock email service disabled, skipping send");
            return Ok(EmailReceipt {
                message_id: format!("disabled-{}", Uuid::new_v4()),
                sent_at: Utc::now(),
                provider: "mock-disabled".to_string(),
                metadata: message.metadata.clone(),
            });
        }

        tracing::info!("Mock email service capturing email to: {}", message.to);

        let receipt = EmailReceipt {
            message_id: format!("mock-{}", Uuid::new_v4()),
            sent_at: Utc::now(),
            provider: "mock".to_string(),
            metadata: message.metadata.clone(),
        };

        let captured = CapturedEmail {
            message: message.clone(),
            receipt: receipt.clone(),
            captured_at: Utc::now(),
        };

        lock(&self.emails).push(captured.clone());
        lock(&self.email_by_recipient)
            .entry(message.to)
            .or_default()
            .push(captured);

        tracing::info!(
            "Email captured successfully, message ID: {}",
            receipt.message_id
        );

        Ok(receipt)
    }

    fn default_from(&self) -> String {
        self.default_from.clone()
    }

    fn contact_inbox(&self) -> String {
        self.contact_inbox.clone()
    }
}
