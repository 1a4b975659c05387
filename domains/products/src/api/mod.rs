//! API layer for the Products domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ProductsState;
pub use routes::routes;
