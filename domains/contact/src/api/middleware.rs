//! Contact domain state

use std::sync::Arc;

use planmart_email::EmailService;

use crate::domain::notifier::InboxNotifier;

/// Application state for the contact endpoints
#[derive(Clone)]
pub struct ContactState {
    pub notifier: InboxNotifier,
}

impl ContactState {
    pub fn new(email: Arc<dyn EmailService>) -> Self {
        Self {
            notifier: InboxNotifier::new(email),
        }
    }
}
