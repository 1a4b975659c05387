//! Products domain state

use planmart_common::Config;

use crate::domain::catalog::ProductCatalog;
use crate::repository::ProductsRepositories;

/// Application state for the Products domain
#[derive(Clone)]
pub struct ProductsState {
    pub catalog: ProductCatalog,
    pub default_page_size: u32,
}

impl ProductsState {
    pub fn new(repos: ProductsRepositories, config: &Config) -> Self {
        Self {
            catalog: ProductCatalog::new(repos),
            default_page_size: config.default_page_size,
        }
    }
}
