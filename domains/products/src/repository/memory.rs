//! In-memory stores

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use planmart_common::{Error, PageRequest, Paginated, RepositoryError, Result};

use super::{CategoryStore, ProductStore};
use crate::domain::entities::{Category, Product, ProductQuery};

#[derive(Debug, Default)]
pub struct InMemoryCategoryStore {
    categories: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Names compare case-insensitively, matching the unique index on `LOWER(name)`
fn ensure_name_free(
    categories: &HashMap<Uuid, Category>,
    name: &str,
    except: Option<Uuid>,
) -> Result<()> {
    let taken = categories
        .values()
        .any(|c| Some(c.id) != except && c.name.to_lowercase() == name.to_lowercase());
    if taken {
        return Err(Error::Conflict(format!("Category '{}' already exists", name)));
    }
    Ok(())
}

#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn insert(&self, category: &Category) -> Result<Category> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| RepositoryError::Poisoned)?;
        ensure_name_free(&categories, &category.name, None)?;
        categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|_| RepositoryError::Poisoned)?;
        Ok(categories.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let categories = self
            .categories
            .read()
            .map_err(|_| RepositoryError::Poisoned)?;
        let mut all: Vec<Category> = categories.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn rename(&self, id: Uuid, name: &str) -> Result<Option<Category>> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| RepositoryError::Poisoned)?;
        ensure_name_free(&categories, name, Some(id))?;
        Ok(categories.get_mut(&id).map(|category| {
            category.name = name.to_string();
            category.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| RepositoryError::Poisoned)?;
        Ok(categories.remove(&id).is_some())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn insert(&self, product: &Product) -> Result<Product> {
        let mut products = self.products.write().map_err(|_| RepositoryError::Poisoned)?;
        if products.contains_key(&product.id) {
            return Err(RepositoryError::AlreadyExists.into());
        }
        products.insert(product.id, product.clone());
        Ok(product.clone())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>> {
        let products = self.products.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(products.get(&id).cloned())
    }

    async fn update(&self, product: &Product) -> Result<Option<Product>> {
        let mut products = self.products.write().map_err(|_| RepositoryError::Poisoned)?;
        Ok(products.get_mut(&product.id).map(|existing| {
            *existing = product.clone();
            existing.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut products = self.products.write().map_err(|_| RepositoryError::Poisoned)?;
        Ok(products.remove(&id).is_some())
    }

    async fn find_page(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Paginated<Product>> {
        let products = self.products.read().map_err(|_| RepositoryError::Poisoned)?;
        let mut matching: Vec<Product> = products
            .values()
            .filter(|product| query.matches(product))
            .cloned()
            .collect();
        drop(products);

        matching.sort_by_key(|p| (Reverse(p.created_at), p.id));
        Ok(Paginated::from_records(matching, page))
    }

    async fn detach_category(&self, category_id: Uuid) -> Result<u64> {
        let mut products = self.products.write().map_err(|_| RepositoryError::Poisoned)?;
        let now = Utc::now();
        let mut detached = 0;
        for product in products
            .values_mut()
            .filter(|p| p.category_id == Some(category_id))
        {
            product.category_id = None;
            product.updated_at = now;
            detached += 1;
        }
        Ok(detached)
    }
}
