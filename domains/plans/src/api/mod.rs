//! API layer for the Plans domain
//!
//! Contains HTTP handlers, routes, and domain state definition.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::{PlansSettings, PlansState};
pub use routes::routes;
