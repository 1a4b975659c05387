//! Route definitions for the contact endpoints

use axum::{routing::post, Router};

use super::handlers;
use super::middleware::ContactState;

/// Create all contact domain API routes
pub fn routes() -> Router<ContactState> {
    Router::new()
        .route("/api/contact", post(handlers::send_contact))
        .route("/api/orders", post(handlers::send_order))
}
