//! HTTP handlers for the Products domain

pub mod categories;
pub mod products;
