//! Plan catalog: filtered listing and text search
//!
//! Results are metadata projections; document bytes are never loaded for a
//! listing. Each item carries a relative preview reference instead.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use planmart_common::catalog::{contains_ignore_case, search_term};
use planmart_common::{PageRequest, Paginated, PriceRange, Result};

use crate::domain::entities::{Difficulty, PlanMetadata};
use crate::repository::PlanStore;

/// Optional listing constraints; absent options impose nothing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlanFilter {
    /// Case-insensitive substring of the category
    pub category: Option<String>,
    /// Case-insensitive substring of the machine type
    pub machine_type: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub price: PriceRange,
}

impl PlanFilter {
    pub fn matches(&self, plan: &PlanMetadata) -> bool {
        self.category
            .as_deref()
            .map_or(true, |c| contains_ignore_case(&plan.category, c))
            && self
                .machine_type
                .as_deref()
                .map_or(true, |m| contains_ignore_case(&plan.machine_type, m))
            && self.difficulty.map_or(true, |d| plan.difficulty == d)
            && self.price.contains(plan.price)
    }
}

/// A catalog read: optional text search plus filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    /// Matched case-insensitively against title, description, category and
    /// machine type
    pub text: Option<String>,
    pub filter: PlanFilter,
}

impl CatalogQuery {
    pub fn matches(&self, plan: &PlanMetadata) -> bool {
        let text_match = self.text.as_deref().map_or(true, |term| {
            [
                &plan.title,
                &plan.description,
                &plan.category,
                &plan.machine_type,
            ]
            .iter()
            .any(|field| contains_ignore_case(field, term))
        });
        text_match && self.filter.matches(plan)
    }
}

/// Builds the relative references handed to clients
#[derive(Debug, Clone, Default)]
pub struct PlanLinks {
    base_path: String,
}

impl PlanLinks {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn preview(&self, id: Uuid) -> String {
        format!("{}/plans/preview/{}", self.base_path, id)
    }

    pub fn download(&self, id: Uuid, user_id: &str) -> String {
        format!(
            "{}/plans/download/{}?userId={}",
            self.base_path,
            id,
            urlencoding::encode(user_id)
        )
    }
}

/// Plan metadata as returned to clients, with a preview reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanSummary {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub machine_type: String,
    pub difficulty: Difficulty,
    pub total_pages: i32,
    pub preview_pages: Vec<i32>,
    pub preview_description: String,
    pub price: Decimal,
    pub author: String,
    pub version: String,
    pub has_document: bool,
    pub preview_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanSummary {
    pub fn new(plan: PlanMetadata, links: &PlanLinks) -> Self {
        Self {
            preview_url: links.preview(plan.id),
            has_document: plan.has_document(),
            id: plan.id,
            title: plan.title,
            description: plan.description,
            category: plan.category,
            machine_type: plan.machine_type,
            difficulty: plan.difficulty,
            total_pages: plan.total_pages,
            preview_pages: plan.preview_pages,
            preview_description: plan.preview_description,
            price: plan.price,
            author: plan.author,
            version: plan.version,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
        }
    }
}

/// Listing and search over plans
#[derive(Clone)]
pub struct CatalogIndex {
    store: Arc<dyn PlanStore>,
    links: PlanLinks,
}

impl CatalogIndex {
    pub fn new(store: Arc<dyn PlanStore>, links: PlanLinks) -> Self {
        Self { store, links }
    }

    pub fn links(&self) -> &PlanLinks {
        &self.links
    }

    /// Newest first; ties broken by identifier
    pub async fn list(
        &self,
        filter: PlanFilter,
        page: PageRequest,
    ) -> Result<Paginated<PlanSummary>> {
        self.query(CatalogQuery { text: None, filter }, page).await
    }

    /// Case-insensitive substring search; a blank term is rejected
    pub async fn search(
        &self,
        term: Option<&str>,
        filter: PlanFilter,
        page: PageRequest,
    ) -> Result<Paginated<PlanSummary>> {
        let text = search_term(term)?;
        self.query(
            CatalogQuery {
                text: Some(text),
                filter,
            },
            page,
        )
        .await
    }

    async fn query(&self, query: CatalogQuery, page: PageRequest) -> Result<Paginated<PlanSummary>> {
        let results = self.store.find_projected(&query, page).await?;
        tracing::debug!(
            text = query.text.as_deref().unwrap_or(""),
            page = page.page(),
            limit = page.limit(),
            total = results.total,
            "Catalog query"
        );
        Ok(results.map(|plan| PlanSummary::new(plan, &self.links)))
    }
}
