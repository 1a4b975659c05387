//! Plans API integration tests
//!
//! Catalog management, preview derivation and entitlement-gated downloads,
//! exercised end to end over the in-memory stores.

mod common;
mod plans;
