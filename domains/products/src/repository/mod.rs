//! Repository interfaces and implementations for the Products domain

pub mod categories;
pub mod memory;
pub mod products;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use planmart_common::{PageRequest, Paginated, Result};

use crate::domain::entities::{Category, Product, ProductQuery};

pub use categories::PgCategoryStore;
pub use memory::{InMemoryCategoryStore, InMemoryProductStore};
pub use products::PgProductStore;

/// Persistence for categories. Names are unique.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    /// `Conflict` when the name is taken
    async fn insert(&self, category: &Category) -> Result<Category>;

    async fn find(&self, id: Uuid) -> Result<Option<Category>>;

    /// All categories ordered by name
    async fn list(&self) -> Result<Vec<Category>>;

    /// `Conflict` when the name is taken by another category
    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Category>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Persistence for products
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<Product>;

    async fn find(&self, id: Uuid) -> Result<Option<Product>>;

    async fn update(&self, product: &Product) -> Result<Option<Product>>;

    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// One page of matching products, newest first, ties by identifier
    async fn find_page(&self, query: &ProductQuery, page: PageRequest)
        -> Result<Paginated<Product>>;

    /// Clear `category_id` on every product in the category; returns the count
    async fn detach_category(&self, category_id: Uuid) -> Result<u64>;
}

/// Combined repository access for the Products domain
#[derive(Clone)]
pub struct ProductsRepositories {
    pub categories: Arc<dyn CategoryStore>,
    pub products: Arc<dyn ProductStore>,
}

impl ProductsRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            categories: Arc::new(PgCategoryStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            categories: Arc::new(InMemoryCategoryStore::new()),
            products: Arc::new(InMemoryProductStore::new()),
        }
    }
}
