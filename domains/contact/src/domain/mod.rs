//! Domain layer for contact and order notifications

pub mod entities;
pub mod notices;
pub mod notifier;
