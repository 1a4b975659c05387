//! Shop inbox delivery over Amazon SES
//!
//! `AWS_ENDPOINT_URL` points the client at LocalStack, with fixed local
//! credentials; otherwise the default credential chain is used.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_ses::config::SharedCredentialsProvider;
use aws_sdk_ses::error::DisplayErrorContext;
use aws_sdk_ses::types::{Body, Content, Destination, Message, MessageTag};
use aws_sdk_ses::Client;
use chrono::Utc;

use crate::{EmailConfig, EmailError, EmailMessage, EmailReceipt, EmailService};

const DEFAULT_REGION: &str = "us-east-1";
const PROVIDER: &str = "aws-ses";

pub struct SesEmailService {
    client: Client,
    default_from: String,
    contact_inbox: String,
}

impl SesEmailService {
    pub async fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let sdk_config = load_sdk_config(&config).await;
        tracing::info!(
            region = ?sdk_config.region(),
            endpoint = config.aws_endpoint_url.as_deref().unwrap_or("default"),
            inbox = %config.contact_inbox,
            "SES client ready"
        );

        Ok(Self {
            client: Client::new(&sdk_config),
            default_from: config.default_from,
            contact_inbox: config.contact_inbox,
        })
    }
}

async fn load_sdk_config(config: &EmailConfig) -> SdkConfig {
    let region = config
        .aws_region
        .clone()
        .unwrap_or_else(|| DEFAULT_REGION.to_string());
    let loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));

    match &config.aws_endpoint_url {
        Some(endpoint) => {
            let local = Credentials::new("planmart-local", "planmart-local", None, None, "localstack");
            loader
                .endpoint_url(endpoint)
                .credentials_provider(SharedCredentialsProvider::new(local))
                .load()
                .await
        }
        None => loader.load().await,
    }
}

/// Loose address check: one `@` with text on both sides, no whitespace
fn is_address(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn check_addresses(message: &EmailMessage) -> Result<(), EmailError> {
    let addresses = [Some(&message.to), Some(&message.from), message.reply_to.as_ref()];
    match addresses.into_iter().flatten().find(|a| !is_address(a)) {
        Some(bad) => Err(EmailError::Validation(format!(
            "Not an email address: {:?}",
            bad
        ))),
        None => Ok(()),
    }
}

fn utf8(part: &str, data: &str) -> Result<Content, EmailError> {
    Content::builder()
        .data(data)
        .charset("UTF-8")
        .build()
        .map_err(|e| EmailError::AwsSes(format!("Invalid {}: {}", part, e)))
}

/// Subject plus text body, with the HTML alternative when present
fn outbound_message(message: &EmailMessage) -> Result<Message, EmailError> {
    let html = message
        .body_html
        .as_deref()
        .map(|html| utf8("HTML body", html))
        .transpose()?;
    let body = Body::builder()
        .text(utf8("text body", &message.body_text)?)
        .set_html(html)
        .build();

    Ok(Message::builder()
        .subject(utf8("subject", &message.subject)?)
        .body(body)
        .build())
}

/// The notification kind, as an SES message tag for delivery reports.
/// SES only accepts ASCII letters, digits, `_` and `-` in tag values.
fn kind_tag(message: &EmailMessage) -> Option<MessageTag> {
    let kind = message.metadata.get("email_type")?;
    let valid = !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return None;
    }
    MessageTag::builder()
        .name("email_type")
        .value(kind)
        .build()
        .ok()
}

#[async_trait::async_trait]
impl EmailService for SesEmailService {
    async fn send_email(&self, message: EmailMessage) -> Result<EmailReceipt, EmailError> {
        check_addresses(&message)?;

        let request = self
            .client
            .send_email()
            .source(&message.from)
            .destination(Destination::builder().to_addresses(&message.to).build())
            .message(outbound_message(&message)?)
            .set_reply_to_addresses(message.reply_to.clone().map(|reply_to| vec![reply_to]))
            .set_tags(kind_tag(&message).map(|tag| vec![tag]));

        let output = request.send().await.map_err(|e| {
            tracing::error!(to = %message.to, error = %DisplayErrorContext(&e), "SES rejected message");
            EmailError::AwsSes(DisplayErrorContext(&e).to_string())
        })?;

        let message_id = output.message_id().to_string();
        tracing::info!(
            message_id = %message_id,
            to = %message.to,
            email_type = message.metadata.get("email_type").map(String::as_str).unwrap_or("unknown"),
            "Email delivered to SES"
        );

        Ok(EmailReceipt {
            message_id,
            sent_at: Utc::now(),
            provider: PROVIDER.to_string(),
            metadata: message.metadata,
        })
    }

    fn default_from(&self) -> String {
        self.default_from.clone()
    }

    fn contact_inbox(&self) -> String {
        self.contact_inbox.clone()
    }
}
