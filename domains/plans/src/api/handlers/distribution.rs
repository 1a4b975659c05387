//! Preview, download and purchase handlers

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use planmart_common::{Error, Result, ValidatedJson};

use super::plans::plan_id;
use crate::api::middleware::PlansState;
use crate::domain::distribution::safe_filename;

/// Response header listing the source pages of a preview
pub const PREVIEW_PAGES_HEADER: &str = "x-preview-pages";

#[derive(Debug, Default, Deserialize)]
pub struct DownloadQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub user_id: Option<String>,

    #[validate(length(max = 50))]
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub message: String,
    pub plan_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub user_id: String,
    pub download_url: String,
}

/// Stream a derived preview of the plan's document
pub async fn preview_plan(
    State(state): State<PlansState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Response> {
    let id = plan_id(path)?;
    let preview = state.distribution.preview(id).await?;
    let codec = state.assets.codec();

    let pages = preview
        .pages
        .iter()
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(",");
    let filename = safe_filename(&preview.title, "_preview", codec.extension());

    Ok((
        [
            (header::CONTENT_TYPE.as_str(), codec.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION.as_str(),
                format!("inline; filename=\"{}\"", filename),
            ),
            (
                header::CACHE_CONTROL.as_str(),
                format!("public, max-age={}", state.settings.preview_cache_seconds),
            ),
            (PREVIEW_PAGES_HEADER, pages),
            (header::CONTENT_LENGTH.as_str(), preview.bytes.len().to_string()),
        ],
        preview.bytes,
    )
        .into_response())
}

/// Release the full document to an entitled user
pub async fn download_plan(
    State(state): State<PlansState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    query: std::result::Result<Query<DownloadQuery>, QueryRejection>,
) -> Result<Response> {
    let id = plan_id(path)?;
    let Query(query) = query.map_err(|e| Error::BadRequest(e.body_text()))?;

    let document = state
        .distribution
        .download(id, query.user_id.as_deref())
        .await?;
    let codec = state.assets.codec();
    let filename = safe_filename(&document.title, "", codec.extension());

    Ok((
        [
            (header::CONTENT_TYPE.as_str(), codec.media_type().to_string()),
            (
                header::CONTENT_DISPOSITION.as_str(),
                format!("attachment; filename=\"{}\"", filename),
            ),
            (header::CACHE_CONTROL.as_str(), "private, no-store".to_string()),
            (header::CONTENT_LENGTH.as_str(), document.bytes.len().to_string()),
        ],
        document.bytes,
    )
        .into_response())
}

/// Record a purchase and hand back the download reference
pub async fn purchase_plan(
    State(state): State<PlansState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    ValidatedJson(req): ValidatedJson<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>> {
    let id = plan_id(path)?;
    let receipt = state
        .distribution
        .purchase(id, req.user_id.as_deref(), req.payment_method)
        .await?;

    let user_id = receipt.purchase.user_id;
    Ok(Json(PurchaseResponse {
        message: "Purchase recorded".to_string(),
        plan_id: receipt.plan_id,
        download_url: state.catalog.links().download(receipt.plan_id, &user_id),
        title: receipt.title,
        price: receipt.price,
        user_id,
    }))
}
