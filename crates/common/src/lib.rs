//! Shared utilities, configuration, and error handling for Planmart
//!
//! This crate provides common functionality used across the Planmart workspace:
//! - Configuration management following 12-factor principles
//! - The application error type and its HTTP mapping
//! - Request extractors
//! - Catalog paging and matching primitives

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;

pub use catalog::{PageQuery, PageRequest, Paginated, PriceRange};
pub use config::{Config, EntitlementMode, StoreBackend};
pub use db::RepositoryError;
pub use error::{Error, Result};
pub use extractors::{validate, ValidatedJson};
