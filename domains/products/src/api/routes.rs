//! Route definitions for Products domain API

use axum::{
    routing::{get, patch},
    Router,
};

use super::handlers::{categories, products};
use super::middleware::ProductsState;

fn category_routes() -> Router<ProductsState> {
    Router::new()
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            patch(categories::rename_category).delete(categories::delete_category),
        )
}

fn product_routes() -> Router<ProductsState> {
    Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/search", get(products::search_products))
        .route(
            "/products/{id}",
            get(products::get_product)
                .patch(products::update_product)
                .delete(products::delete_product),
        )
}

/// Create all Products domain API routes
pub fn routes() -> Router<ProductsState> {
    Router::new()
        .merge(category_routes())
        .merge(product_routes())
}
