//! Planmart application composition root
//!
//! Selects the store backend, builds each domain's state and composes the
//! domain routers into a single application.

use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use planmart_common::{Config, StoreBackend};
use planmart_contact::ContactState;
use planmart_email::EmailService;
use planmart_plans::{PlansRepositories, PlansState};
use planmart_products::{ProductsRepositories, ProductsState};

/// Allowance for multipart framing and text fields around an uploaded document
pub const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Connect to Postgres and apply pending migrations; `None` for the memory backend
pub async fn connect_store(config: &Config) -> anyhow::Result<Option<PgPool>> {
    if config.store_backend == StoreBackend::Memory {
        tracing::warn!("STORE_BACKEND=memory: data is lost on restart");
        return Ok(None);
    }

    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required when STORE_BACKEND=postgres"))?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .map_err(|e| anyhow::anyhow!("Database connection failed: {}", e))?;

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Database migration failed: {}", e))?;

    tracing::info!("Database connection established and migrations applied");
    Ok(Some(pool))
}

/// Create the main application router with all routes and middleware.
///
/// `pool` is required for the Postgres backend and ignored for the memory one.
pub fn create_app(
    config: &Config,
    pool: Option<PgPool>,
    email: Arc<dyn EmailService>,
) -> anyhow::Result<Router> {
    let (plans_repos, products_repos) = match (config.store_backend, pool) {
        (StoreBackend::Memory, _) => (
            PlansRepositories::in_memory(),
            ProductsRepositories::in_memory(),
        ),
        (StoreBackend::Postgres, Some(pool)) => (
            PlansRepositories::postgres(pool.clone()),
            ProductsRepositories::postgres(pool),
        ),
        (StoreBackend::Postgres, None) => {
            return Err(anyhow::anyhow!(
                "A database pool is required when STORE_BACKEND=postgres"
            ))
        }
    };

    let plans_state = PlansState::new(plans_repos, config);
    let products_state = ProductsState::new(products_repos, config);
    let contact_state = ContactState::new(email);

    let plans = planmart_plans::routes()
        .with_state(plans_state)
        .layer(body_limit_layer(config.max_document_bytes));

    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(banner))
        .merge(plans)
        .merge(planmart_products::routes().with_state(products_state))
        .merge(planmart_contact::routes().with_state(contact_state));

    Ok(app)
}

/// Request body limit sized for one document upload
pub fn body_limit_layer(max_document_bytes: usize) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_document_bytes.saturating_add(FORM_OVERHEAD_BYTES))
}

/// CORS from a comma-separated origin list; `*` allows any origin
pub fn build_cors_layer(origins: &str) -> CorsLayer {
    let origins = origins.trim();
    if origins.is_empty() || origins == "*" {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any)
}

async fn banner() -> &'static str {
    concat!("Planmart API v", env!("CARGO_PKG_VERSION"))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
