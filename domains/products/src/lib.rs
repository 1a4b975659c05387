//! Products domain: physical catalog items and their categories

pub mod api;
pub mod domain;
pub mod repository;

pub use domain::catalog::ProductCatalog;
pub use domain::entities::{
    Category, CategoryName, Product, ProductChanges, ProductDraft, ProductQuery,
};

pub use repository::{CategoryStore, ProductStore, ProductsRepositories};

pub use api::routes;
pub use api::ProductsState;
