//! Category repository (Postgres)

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use planmart_common::db::is_unique_violation;
use planmart_common::{Error, Result};

use super::CategoryStore;
use crate::domain::entities::Category;

const CATEGORY_COLUMNS: &str = "id, name, created_at";

#[derive(Clone)]
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn name_taken(err: sqlx::Error, name: &str) -> Error {
    if is_unique_violation(&err) {
        Error::Conflict(format!("Category '{}' already exists", name))
    } else {
        Error::Database(err)
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn insert(&self, category: &Category) -> Result<Category> {
        let query = format!(
            "INSERT INTO categories ({CATEGORY_COLUMNS}) VALUES ($1, $2, $3) \
             RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(category.id)
            .bind(&category.name)
            .bind(category.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| name_taken(e, &category.name))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Category>> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let query = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC");
        let categories = sqlx::query_as::<_, Category>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Category>> {
        let query = format!(
            "UPDATE categories SET name = $2 WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| name_taken(e, name))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
