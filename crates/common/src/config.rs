//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables and handed to
//! component constructors at startup. Nothing reads the environment later.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Default maximum accepted document size (50MB)
pub const DEFAULT_MAX_DOCUMENT_BYTES: usize = 52_428_800;

/// Default preview cache lifetime in seconds
pub const DEFAULT_PREVIEW_CACHE_SECONDS: u32 = 3600;

/// Default catalog page size
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Backing store for all domain repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" | "in-memory" => Ok(Self::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown STORE_BACKEND '{}'. Supported: postgres, memory",
                other
            )),
        }
    }
}

/// How full-document downloads are gated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementMode {
    /// Access requires a recorded purchase
    Ledger,
    /// Every well-formed request is granted access
    Open,
}

impl std::str::FromStr for EntitlementMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ledger" => Ok(Self::Ledger),
            "open" => Ok(Self::Open),
            other => Err(anyhow::anyhow!(
                "Unknown ENTITLEMENT_MODE '{}'. Supported: ledger, open",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Store backend selection
    pub store_backend: StoreBackend,

    /// Database connection URL (required for the postgres backend)
    pub database_url: Option<String>,

    /// Distribution policy
    pub max_document_bytes: usize,
    pub preview_cache_seconds: u32,
    pub entitlement_mode: EntitlementMode,

    /// Catalog defaults
    pub default_page_size: u32,

    /// Prefix for constructed preview and download references
    pub public_base_path: String,

    /// HTTP
    pub cors_allowed_origins: String,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            max_document_bytes: DEFAULT_MAX_DOCUMENT_BYTES,
            preview_cache_seconds: DEFAULT_PREVIEW_CACHE_SECONDS,
            entitlement_mode: EntitlementMode::Ledger,
            default_page_size: DEFAULT_PAGE_SIZE,
            public_base_path: String::new(),
            cors_allowed_origins: "*".to_string(),
            rust_log: "planmart=debug".to_string(),
            port: 3000,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    #[mutants::skip] // Reads process environment; defaults are covered by Config::default
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let store_backend: StoreBackend = env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .parse()?;

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(anyhow::anyhow!(
                "DATABASE_URL is required when STORE_BACKEND=postgres"
            ));
        }

        let config = Self {
            store_backend,
            database_url,

            max_document_bytes: parse_or("MAX_DOCUMENT_BYTES", DEFAULT_MAX_DOCUMENT_BYTES)?,
            preview_cache_seconds: parse_or(
                "PREVIEW_CACHE_SECONDS",
                DEFAULT_PREVIEW_CACHE_SECONDS,
            )?,
            entitlement_mode: env::var("ENTITLEMENT_MODE")
                .unwrap_or_else(|_| "ledger".to_string())
                .parse()?,

            default_page_size: parse_or("DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE)?,
            public_base_path: env::var("PUBLIC_BASE_PATH")
                .map(|p| p.trim_end_matches('/').to_string())
                .unwrap_or_default(),

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "planmart=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        if config.default_page_size == 0 {
            return Err(anyhow::anyhow!("DEFAULT_PAGE_SIZE must be at least 1"));
        }

        Ok(config)
    }
}

fn parse_or<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e)),
        Err(_) => Ok(default),
    }
}
