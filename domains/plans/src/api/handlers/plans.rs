//! Plan management and catalog API handlers

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use planmart_common::{Error, PageQuery, PageRequest, Paginated, PriceRange, Result};

use super::form::PlanForm;
use crate::api::middleware::PlansState;
use crate::domain::catalog::{PlanFilter, PlanSummary};
use crate::domain::entities::Difficulty;

/// Query parameters for `GET /plans` and `GET /plans/search`
#[derive(Debug, Default, Deserialize)]
pub struct PlanListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub q: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "machineType")]
    pub machine_type: Option<String>,
    pub difficulty: Option<String>,
    #[serde(alias = "minPrice")]
    pub min_price: Option<String>,
    #[serde(alias = "maxPrice")]
    pub max_price: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PlanListQuery {
    pub fn page_request(&self, default_limit: u32) -> Result<PageRequest> {
        PageRequest::from_query(
            PageQuery {
                page: self.page,
                limit: self.limit,
            },
            default_limit,
        )
    }

    pub fn filter(&self) -> Result<PlanFilter> {
        let difficulty = non_blank(self.difficulty.clone())
            .map(|d| d.parse::<Difficulty>())
            .transpose()?;
        Ok(PlanFilter {
            category: non_blank(self.category.clone()),
            machine_type: non_blank(self.machine_type.clone()),
            difficulty,
            price: PriceRange::parse(self.min_price.as_deref(), self.max_price.as_deref())?,
        })
    }
}

pub(crate) fn plan_id(path: std::result::Result<Path<Uuid>, PathRejection>) -> Result<Uuid> {
    path.map(|Path(id)| id)
        .map_err(|_| Error::BadRequest("Invalid plan identifier".to_string()))
}

fn list_query(
    query: std::result::Result<Query<PlanListQuery>, QueryRejection>,
) -> Result<PlanListQuery> {
    query
        .map(|Query(q)| q)
        .map_err(|e| Error::BadRequest(e.body_text()))
}

/// Create a plan from a multipart form
pub async fn create_plan(
    State(state): State<PlansState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PlanSummary>)> {
    let form = PlanForm::read(multipart, state.assets.codec().media_type()).await?;
    let (draft, document) = form.into_draft()?;

    let created = state.assets.create(draft, Some(document)).await?;
    Ok((
        StatusCode::CREATED,
        Json(PlanSummary::new(created, state.catalog.links())),
    ))
}

/// List plans, newest first, with optional filters
pub async fn list_plans(
    State(state): State<PlansState>,
    query: std::result::Result<Query<PlanListQuery>, QueryRejection>,
) -> Result<Json<Paginated<PlanSummary>>> {
    let query = list_query(query)?;
    let page = query.page_request(state.settings.default_page_size)?;
    let plans = state.catalog.list(query.filter()?, page).await?;
    Ok(Json(plans))
}

/// Case-insensitive text search over the catalog
pub async fn search_plans(
    State(state): State<PlansState>,
    query: std::result::Result<Query<PlanListQuery>, QueryRejection>,
) -> Result<Json<Paginated<PlanSummary>>> {
    let query = list_query(query)?;
    let page = query.page_request(state.settings.default_page_size)?;
    let plans = state
        .catalog
        .search(query.q.as_deref(), query.filter()?, page)
        .await?;
    Ok(Json(plans))
}

/// Get one plan's metadata
pub async fn get_plan(
    State(state): State<PlansState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<PlanSummary>> {
    let id = plan_id(path)?;
    let plan = state.assets.metadata(id).await?;
    Ok(Json(PlanSummary::new(plan, state.catalog.links())))
}

/// Update metadata and/or replace the document
pub async fn update_plan(
    State(state): State<PlansState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
    multipart: Multipart,
) -> Result<Json<PlanSummary>> {
    let id = plan_id(path)?;
    let form = PlanForm::read(multipart, state.assets.codec().media_type()).await?;
    let (changes, document) = form.into_changes()?;

    let updated = state.assets.update(id, changes, document).await?;
    Ok(Json(PlanSummary::new(updated, state.catalog.links())))
}

/// Delete a plan and its document
pub async fn delete_plan(
    State(state): State<PlansState>,
    path: std::result::Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>> {
    let id = plan_id(path)?;
    state.assets.delete(id).await?;
    Ok(Json(json!({ "message": "Plan deleted" })))
}
