//! Delivery of storefront notifications to the shop inbox

use std::sync::Arc;

use planmart_common::{validate, Error, Result};
use planmart_email::{EmailError, EmailService};

use crate::domain::entities::{ContactMessage, Order};
use crate::domain::notices::order_notice;

#[derive(Clone)]
pub struct InboxNotifier {
    email: Arc<dyn EmailService>,
}

fn delivery_failed(err: EmailError) -> Error {
    tracing::error!(error = %err, "Inbox notification failed");
    Error::Internal("The notification could not be delivered".to_string())
}

impl InboxNotifier {
    pub fn new(email: Arc<dyn EmailService>) -> Self {
        Self { email }
    }

    /// Forward a contact form submission
    pub async fn contact(&self, message: &ContactMessage) -> Result<()> {
        validate(message)?;
        let receipt = self
            .email
            .send_contact_message(
                &message.name,
                &message.email,
                &message.phone,
                &message.message,
            )
            .await
            .map_err(delivery_failed)?;

        tracing::info!(message_id = %receipt.message_id, "Contact message forwarded");
        Ok(())
    }

    /// Forward an order summary
    pub async fn order(&self, order: &Order) -> Result<()> {
        validate(order)?;
        let shipping = order.shipping_address()?;

        let receipt = self
            .email
            .notify_inbox(order_notice(order, shipping))
            .await
            .map_err(delivery_failed)?;

        tracing::info!(
            order_id = order.id,
            items = order.items.len(),
            digital = order.has_digital_items(),
            message_id = %receipt.message_id,
            "Order notification sent"
        );
        Ok(())
    }
}
