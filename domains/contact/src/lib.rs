//! Contact form and order notification endpoints

pub mod api;
pub mod domain;

pub use domain::entities::{ContactMessage, Order, OrderItem, PostalAddress, Shipping};
pub use domain::notifier::InboxNotifier;

pub use api::routes;
pub use api::ContactState;
