//! Plan repository (Postgres)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use planmart_common::catalog::ilike_pattern;
use planmart_common::{PageRequest, Paginated, Result};

use super::{stale_write, PlanStore};
use crate::domain::catalog::CatalogQuery;
use crate::domain::entities::{Plan, PlanMetadata};

/// Every column except `document`, used for projections and RETURNING clauses.
const PLAN_METADATA_COLUMNS: &str = "\
    id, title, description, category, machine_type, difficulty, \
    total_pages, preview_pages, preview_description, price, \
    author, version, document_size, created_at, updated_at";

#[derive(Clone)]
pub struct PgPlanStore {
    pool: PgPool,
}

impl PgPlanStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Append the WHERE clause for `query`
fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &CatalogQuery) {
    builder.push(" WHERE TRUE");

    if let Some(term) = &query.text {
        let pattern = ilike_pattern(term);
        builder.push(" AND (");
        let mut fields = builder.separated(" OR ");
        for column in ["title", "description", "category", "machine_type"] {
            fields.push(format!("{column} ILIKE "));
            fields.push_bind_unseparated(pattern.clone());
        }
        builder.push(")");
    }

    let filter = &query.filter;
    if let Some(category) = &filter.category {
        builder
            .push(" AND category ILIKE ")
            .push_bind(ilike_pattern(category));
    }
    if let Some(machine_type) = &filter.machine_type {
        builder
            .push(" AND machine_type ILIKE ")
            .push_bind(ilike_pattern(machine_type));
    }
    if let Some(difficulty) = filter.difficulty {
        builder.push(" AND difficulty = ").push_bind(difficulty);
    }
    if let Some(min) = filter.price.min {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = filter.price.max {
        builder.push(" AND price <= ").push_bind(max);
    }
}

#[async_trait]
impl PlanStore for PgPlanStore {
    async fn insert(&self, plan: &Plan) -> Result<PlanMetadata> {
        let m = &plan.metadata;
        let query = format!(
            "INSERT INTO plans ({PLAN_METADATA_COLUMNS}, document) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING {PLAN_METADATA_COLUMNS}"
        );
        let created = sqlx::query_as::<_, PlanMetadata>(&query)
            .bind(m.id)
            .bind(&m.title)
            .bind(&m.description)
            .bind(&m.category)
            .bind(&m.machine_type)
            .bind(m.difficulty)
            .bind(m.total_pages)
            .bind(&m.preview_pages)
            .bind(&m.preview_description)
            .bind(m.price)
            .bind(&m.author)
            .bind(&m.version)
            .bind(m.document_size)
            .bind(m.created_at)
            .bind(m.updated_at)
            .bind(plan.document.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find_metadata(&self, id: Uuid) -> Result<Option<PlanMetadata>> {
        let query = format!("SELECT {PLAN_METADATA_COLUMNS} FROM plans WHERE id = $1");
        let metadata = sqlx::query_as::<_, PlanMetadata>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(metadata)
    }

    async fn find_full(&self, id: Uuid) -> Result<Option<Plan>> {
        let query = format!("SELECT {PLAN_METADATA_COLUMNS}, document FROM plans WHERE id = $1");
        let plan = sqlx::query_as::<_, Plan>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(plan)
    }

    async fn update(
        &self,
        metadata: &PlanMetadata,
        document: Option<&[u8]>,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Option<PlanMetadata>> {
        let m = metadata;
        let query = format!(
            "UPDATE plans SET \
                title = $2, description = $3, category = $4, machine_type = $5, \
                difficulty = $6, total_pages = $7, preview_pages = $8, \
                preview_description = $9, price = $10, author = $11, version = $12, \
                document_size = $13, updated_at = $14, \
                document = COALESCE($15, document) \
             WHERE id = $1 AND updated_at = $16 RETURNING {PLAN_METADATA_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, PlanMetadata>(&query)
            .bind(m.id)
            .bind(&m.title)
            .bind(&m.description)
            .bind(&m.category)
            .bind(&m.machine_type)
            .bind(m.difficulty)
            .bind(m.total_pages)
            .bind(&m.preview_pages)
            .bind(&m.preview_description)
            .bind(m.price)
            .bind(&m.author)
            .bind(&m.version)
            .bind(m.document_size)
            .bind(m.updated_at)
            .bind(document)
            .bind(expected_updated_at)
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(updated) => Ok(Some(updated)),
            None if self.find_metadata(m.id).await?.is_some() => Err(stale_write(m.id)),
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM plans WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_projected(
        &self,
        query: &CatalogQuery,
        page: PageRequest,
    ) -> Result<Paginated<PlanMetadata>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM plans");
        push_conditions(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {PLAN_METADATA_COLUMNS} FROM plans"));
        push_conditions(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let items = select
            .build_query_as::<PlanMetadata>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(items, total.max(0) as u64, page))
    }
}
