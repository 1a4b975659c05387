//! Route definitions for Plans domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{distribution, plans};
use super::middleware::PlansState;

/// Plan management and catalog routes
fn plan_routes() -> Router<PlansState> {
    Router::new()
        .route("/plans", post(plans::create_plan).get(plans::list_plans))
        .route("/plans/search", get(plans::search_plans))
        .route(
            "/plans/{id}",
            get(plans::get_plan)
                .patch(plans::update_plan)
                .delete(plans::delete_plan),
        )
}

/// Preview, download and purchase routes
fn distribution_routes() -> Router<PlansState> {
    Router::new()
        .route("/plans/preview/{id}", get(distribution::preview_plan))
        .route("/plans/download/{id}", get(distribution::download_plan))
        .route("/plans/purchase/{id}", post(distribution::purchase_plan))
}

/// Create all Plans domain API routes
pub fn routes() -> Router<PlansState> {
    Router::new()
        .merge(plan_routes())
        .merge(distribution_routes())
}
