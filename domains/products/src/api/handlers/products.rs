//! Product API handlers

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use planmart_common::{
    Error, PageQuery, PageRequest, Paginated, PriceRange, Result, ValidatedJson,
};

use super::categories::path_id;
use crate::api::middleware::ProductsState;
use crate::domain::entities::{Product, ProductChanges, ProductDraft, ProductQuery};

/// Query parameters for `GET /products` and `GET /products/search`
#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub q: Option<String>,
    #[serde(alias = "categoryId")]
    pub category_id: Option<String>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<String>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<String>,
}

impl ProductListQuery {
    fn page_request(&self, default_limit: u32) -> Result<PageRequest> {
        PageRequest::from_query(
            PageQuery {
                page: self.page,
                limit: self.limit,
            },
            default_limit,
        )
    }

    fn query(&self) -> Result<ProductQuery> {
        let category_id = self
            .category_id
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|raw| {
                raw.parse::<Uuid>()
                    .map_err(|_| Error::BadRequest(format!("Invalid category_id '{}'", raw)))
            })
            .transpose()?;

        Ok(ProductQuery {
            text: None,
            category_id,
            price: PriceRange::parse(self.min_price.as_deref(), self.max_price.as_deref())?,
        })
    }
}

fn list_query(
    query: std::result::Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<ProductListQuery> {
    query
        .map(|Query(q)| q)
        .map_err(|e| Error::BadRequest(e.body_text()))
}

pub async fn create_product(
    State(state): State<ProductsState>,
    ValidatedJson(req): ValidatedJson<ProductDraft>,
) -> Result<(StatusCode, Json<Product>)> {
    let created = state.catalog.create_product(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_products(
    State(state): State<ProductsState>,
    query: std::result::Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<Paginated<Product>>> {
    let params = list_query(query)?;
    let page = params.page_request(state.default_page_size)?;
    Ok(Json(state.catalog.list_products(params.query()?, page).await?))
}

pub async fn search_products(
    State(state): State<ProductsState>,
    query: std::result::Result<Query<ProductListQuery>, QueryRejection>,
) -> Result<Json<Paginated<Product>>> {
    let params = list_query(query)?;
    let page = params.page_request(state.default_page_size)?;
    let found = state
        .catalog
        .search_products(params.q.as_deref(), params.query()?, page)
        .await?;
    Ok(Json(found))
}

pub async fn get_product(
    State(state): State<ProductsState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Product>> {
    let id = path_id(path)?;
    Ok(Json(state.catalog.product(id).await?))
}

pub async fn update_product(
    State(state): State<ProductsState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    ValidatedJson(req): ValidatedJson<ProductChanges>,
) -> Result<Json<Product>> {
    let id = path_id(path)?;
    Ok(Json(state.catalog.update_product(id, req).await?))
}

pub async fn delete_product(
    State(state): State<ProductsState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    let id = path_id(path)?;
    state.catalog.delete_product(id).await?;
    Ok(Json(json!({ "message": "Product deleted" })))
}
