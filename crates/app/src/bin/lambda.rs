//! Planmart API - AWS Lambda Runtime

use std::sync::Arc;

use lambda_http::{run, Error};
use tower_http::trace::TraceLayer;
use tracing::info;

use planmart_app::{build_cors_layer, connect_store, create_app};
use planmart_common::config::Config;
use planmart_email::{EmailConfig, EmailServiceFactory};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .without_time()
        .init();

    info!("Initializing Planmart API Lambda");

    let config =
        Config::from_env().map_err(|e| Error::from(format!("Configuration error: {}", e)))?;

    let pool = connect_store(&config)
        .await
        .map_err(|e| Error::from(format!("Store error: {}", e)))?;

    let email_config =
        EmailConfig::from_env().map_err(|e| Error::from(format!("Email error: {}", e)))?;
    let email = EmailServiceFactory::create(email_config)
        .await
        .map_err(|e| Error::from(format!("Email error: {}", e)))?;

    let app = create_app(&config, pool, Arc::from(email))
        .map_err(|e| Error::from(format!("App initialization error: {}", e)))?;

    let app = app
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_allowed_origins));

    info!("Planmart API Lambda ready to serve requests");

    run(app).await
}
