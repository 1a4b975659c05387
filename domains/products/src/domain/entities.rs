//! Domain entities for the Products domain

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use planmart_common::catalog::{contains_ignore_case, price_fits_scale};
use planmart_common::{validate, PriceRange, Result};

/// A product category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Category {
    pub fn new(name: CategoryName) -> Result<Self> {
        validate(&name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.name.trim().to_string(),
            created_at: Utc::now(),
        })
    }
}

/// Body of category create and rename requests
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CategoryName {
    #[validate(length(min = 1, max = 100), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// A physical catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub features: Vec<String>,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(draft: ProductDraft) -> Result<Self> {
        validate(&draft)?;

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            price: draft.price,
            category_id: draft.category_id,
            features: draft.features,
            quantity: draft.quantity,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update and refresh `updated_at`
    pub fn apply(&mut self, changes: ProductChanges) {
        if let Some(name) = changes.name {
            self.name = name;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(category_id) = changes.category_id {
            self.category_id = Some(category_id);
        }
        if let Some(features) = changes.features {
            self.features = features;
        }
        if let Some(quantity) = changes.quantity {
            self.quantity = quantity;
        }

        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }
}

/// Field values for a new product
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductDraft {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,

    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    pub category_id: Option<Uuid>,

    #[serde(default)]
    #[validate(length(max = 50))]
    pub features: Vec<String>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub quantity: i32,
}

/// Partial product update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductChanges {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,

    pub category_id: Option<Uuid>,

    #[validate(length(max = 50))]
    pub features: Option<Vec<String>>,

    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
}

fn validate_price(price: &Decimal) -> std::result::Result<(), ValidationError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ValidationError::new("negative_price"));
    }
    if !price_fits_scale(price) {
        return Err(ValidationError::new("price_scale"));
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> std::result::Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Product listing constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    /// Matched case-insensitively against name and description
    pub text: Option<String>,
    pub category_id: Option<Uuid>,
    pub price: PriceRange,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        self.text.as_deref().map_or(true, |term| {
            contains_ignore_case(&product.name, term)
                || contains_ignore_case(&product.description, term)
        }) && self
            .category_id
            .map_or(true, |id| product.category_id == Some(id))
            && self.price.contains(product.price)
    }
}
