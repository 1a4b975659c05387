//! Product catalog operations
//!
//! Category references are checked here rather than left to the foreign key,
//! so both store backends report an unknown category the same way.

use std::sync::Arc;

use uuid::Uuid;

use planmart_common::catalog::search_term;
use planmart_common::{validate, Error, PageRequest, Paginated, Result};

use crate::domain::entities::{
    Category, CategoryName, Product, ProductChanges, ProductDraft, ProductQuery,
};
use crate::repository::{CategoryStore, ProductStore, ProductsRepositories};

#[derive(Clone)]
pub struct ProductCatalog {
    categories: Arc<dyn CategoryStore>,
    products: Arc<dyn ProductStore>,
}

impl ProductCatalog {
    pub fn new(repos: ProductsRepositories) -> Self {
        Self {
            categories: repos.categories,
            products: repos.products,
        }
    }

    pub async fn create_category(&self, name: CategoryName) -> Result<Category> {
        let created = self.categories.insert(&Category::new(name)?).await?;
        tracing::info!(category_id = %created.id, name = %created.name, "Category created");
        Ok(created)
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>> {
        self.categories.list().await
    }

    pub async fn rename_category(&self, id: Uuid, name: CategoryName) -> Result<Category> {
        validate(&name)?;
        self.categories
            .rename(id, name.name.trim())
            .await?
            .ok_or_else(|| category_not_found(id))
    }

    /// Delete a category; its products stay, uncategorised
    pub async fn delete_category(&self, id: Uuid) -> Result<()> {
        if self.categories.find(id).await?.is_none() {
            return Err(category_not_found(id));
        }
        let detached = self.products.detach_category(id).await?;
        self.categories.delete(id).await?;
        tracing::info!(category_id = %id, detached, "Category deleted");
        Ok(())
    }

    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        let product = Product::new(draft)?;
        self.ensure_category(product.category_id).await?;

        let created = self.products.insert(&product).await?;
        tracing::info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    pub async fn product(&self, id: Uuid) -> Result<Product> {
        self.products
            .find(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    pub async fn update_product(&self, id: Uuid, changes: ProductChanges) -> Result<Product> {
        validate(&changes)?;
        self.ensure_category(changes.category_id).await?;

        let mut product = self.product(id).await?;
        product.apply(changes);
        self.products
            .update(&product)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<()> {
        if !self.products.delete(id).await? {
            return Err(product_not_found(id));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Newest first; ties broken by identifier
    pub async fn list_products(
        &self,
        query: ProductQuery,
        page: PageRequest,
    ) -> Result<Paginated<Product>> {
        self.products.find_page(&query, page).await
    }

    /// Case-insensitive name and description search; a blank term is rejected
    pub async fn search_products(
        &self,
        term: Option<&str>,
        mut query: ProductQuery,
        page: PageRequest,
    ) -> Result<Paginated<Product>> {
        query.text = Some(search_term(term)?);
        self.products.find_page(&query, page).await
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> Result<()> {
        if let Some(id) = category_id {
            if self.categories.find(id).await?.is_none() {
                return Err(Error::BadRequest(format!("Unknown category {}", id)));
            }
        }
        Ok(())
    }
}

fn category_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Category {} not found", id))
}

fn product_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Product {} not found", id))
}
