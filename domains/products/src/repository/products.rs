//! Product repository (Postgres)

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use planmart_common::catalog::ilike_pattern;
use planmart_common::{PageRequest, Paginated, Result};

use super::ProductStore;
use crate::domain::entities::{Product, ProductQuery};

const PRODUCT_COLUMNS: &str = "\
    id, name, description, price, category_id, \
    features, quantity, created_at, updated_at";

#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_conditions(builder: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    builder.push(" WHERE TRUE");

    if let Some(term) = &query.text {
        let pattern = ilike_pattern(term);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category_id) = query.category_id {
        builder.push(" AND category_id = ").push_bind(category_id);
    }
    if let Some(min) = query.price.min {
        builder.push(" AND price >= ").push_bind(min);
    }
    if let Some(max) = query.price.max {
        builder.push(" AND price <= ").push_bind(max);
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, product: &Product) -> Result<Product> {
        let query = format!(
            "INSERT INTO products ({PRODUCT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Product>(&query)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.category_id)
            .bind(&product.features)
            .bind(product.quantity)
            .bind(product.created_at)
            .bind(product.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let query = format!(
            "UPDATE products SET \
                name = $2, description = $3, price = $4, category_id = $5, \
                features = $6, quantity = $7, updated_at = $8 \
             WHERE id = $1 RETURNING {PRODUCT_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Product>(&query)
            .bind(product.id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.category_id)
            .bind(&product.features)
            .bind(product.quantity)
            .bind(product.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_page(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Paginated<Product>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_conditions(&mut count, query);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        let mut select =
            QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        push_conditions(&mut select, query);
        select
            .push(" ORDER BY created_at DESC, id ASC LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let items = select
            .build_query_as::<Product>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Paginated::new(items, total.max(0) as u64, page))
    }

    async fn detach_category(&self, category_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE products SET category_id = NULL, updated_at = NOW() WHERE category_id = $1",
        )
        .bind(category_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
