//! API layer for contact and order notifications

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ContactState;
pub use routes::routes;
