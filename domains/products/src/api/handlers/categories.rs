//! Category API handlers

use axum::{
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use planmart_common::{Error, Result, ValidatedJson};

use crate::api::middleware::ProductsState;
use crate::domain::entities::{Category, CategoryName};

pub(crate) fn path_id(path: std::result::Result<Path<Uuid>, PathRejection>) -> Result<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| Error::BadRequest("Invalid identifier".to_string()))
}

pub async fn list_categories(State(state): State<ProductsState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.catalog.list_categories().await?))
}

pub async fn create_category(
    State(state): State<ProductsState>,
    ValidatedJson(req): ValidatedJson<CategoryName>,
) -> Result<(StatusCode, Json<Category>)> {
    let created = state.catalog.create_category(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn rename_category(
    State(state): State<ProductsState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    ValidatedJson(req): ValidatedJson<CategoryName>,
) -> Result<Json<Category>> {
    let id = path_id(path)?;
    Ok(Json(state.catalog.rename_category(id, req).await?))
}

/// Delete a category; its products are kept without a category
pub async fn delete_category(
    State(state): State<ProductsState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    let id = path_id(path)?;
    state.catalog.delete_category(id).await?;
    Ok(Json(json!({ "message": "Category deleted" })))
}
