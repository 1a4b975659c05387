//! Domain entities for the Plans domain
//!
//! A plan is a sellable technical-drawing document. Its metadata and its
//! document bytes live in one record, but the bytes are only loaded when a
//! caller asks for the full record of a single plan.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use planmart_common::catalog::price_fits_scale;
use planmart_common::{validate, Error, Result};

/// Version assigned when the author does not supply one
pub const DEFAULT_VERSION: &str = "1.0";

/// Plan difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "plan_difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Basic => write!(f, "basic"),
            Difficulty::Intermediate => write!(f, "intermediate"),
            Difficulty::Advanced => write!(f, "advanced"),
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(Error::BadRequest(format!(
                "Unknown difficulty '{}'. Expected basic, intermediate or advanced",
                other
            ))),
        }
    }
}

/// Every plan column except the document bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PlanMetadata {
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
    /// Size of the stored document; `None` when the plan has no document
    pub document_size: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PlanMetadata {
    pub fn has_document(&self) -> bool {
        self.document_size.is_some()
    }

    /// Check the record-level invariants
    pub fn validate(&self) -> Result<()> {
        if self.total_pages < 1 {
            return Err(Error::BadRequest(
                "A plan must have at least one page".to_string(),
            ));
        }
        if self.price.is_sign_negative() && !self.price.is_zero() {
            return Err(Error::BadRequest("Price must not be negative".to_string()));
        }
        validate_preview_pages(&self.preview_pages, self.total_pages)
    }

    /// Apply a partial update and refresh `updated_at`
    pub fn apply(&mut self, changes: PlanChanges) {
        let PlanChanges {
            title,
            description,
            category,
            machine_type,
            difficulty,
            price,
            preview_description,
            author,
            version,
            preview_pages,
        } = changes;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(machine_type) = machine_type {
            self.machine_type = machine_type;
        }
        if let Some(difficulty) = difficulty {
            self.difficulty = difficulty;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(preview_description) = preview_description {
            self.preview_description = preview_description;
        }
        if let Some(author) = author {
            self.author = author;
        }
        if let Some(version) = version {
            self.version = version;
        }
        if let Some(preview_pages) = preview_pages {
            self.preview_pages = preview_pages;
        }
        self.touch();
    }

    /// Record a new document of `size` bytes and `total_pages` pages
    pub fn attach_document(&mut self, size: usize, total_pages: i32) {
        self.document_size = Some(size as i64);
        self.total_pages = total_pages;
        self.touch();
    }

    fn touch(&mut self) {
        // Keep updated_at strictly increasing even within one clock tick
        let now = Utc::now();
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }
}

/// A full plan record, including the document bytes when present
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Plan {
    #[sqlx(flatten)]
    pub metadata: PlanMetadata,
    pub document: Option<Vec<u8>>,
}

impl Plan {
    /// Build a new plan from validated fields.
    ///
    /// `total_pages` must come from the document when one is supplied.
    pub fn new(draft: PlanDraft, document: Option<Vec<u8>>, total_pages: i32) -> Result<Self> {
        validate(&draft)?;

        let now = Utc::now();
        let metadata = PlanMetadata {
            id: Uuid::new_v4(),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            machine_type: draft.machine_type,
            difficulty: draft.difficulty,
            total_pages,
            preview_pages: draft.preview_pages,
            preview_description: draft.preview_description,
            price: draft.price,
            author: draft.author,
            version: draft.version,
            document_size: document.as_ref().map(|bytes| bytes.len() as i64),
            created_at: now,
            updated_at: now,
        };
        metadata.validate()?;

        Ok(Self { metadata, document })
    }

    pub fn id(&self) -> Uuid {
        self.metadata.id
    }

    /// Drop the payload, keeping only the metadata projection
    pub fn into_metadata(self) -> PlanMetadata {
        self.metadata
    }
}

/// Field values for a new plan
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct PlanDraft {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(max = 5000))]
    pub description: String,

    #[validate(length(min = 1, max = 100))]
    pub category: String,

    #[validate(length(min = 1, max = 100))]
    pub machine_type: String,

    pub difficulty: Difficulty,

    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,

    #[validate(length(max = 5000))]
    pub preview_description: String,

    #[validate(length(min = 1, max = 100))]
    pub author: String,

    #[validate(length(min = 1, max = 20))]
    pub version: String,

    /// Author-curated preview pages; empty means "sample at random"
    #[serde(default)]
    pub preview_pages: Vec<i32>,

    /// Page count for plans stored without a document; ignored otherwise
    #[validate(range(min = 1))]
    #[serde(default)]
    pub declared_pages: Option<i32>,
}

/// Partial update of plan metadata; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct PlanChanges {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 5000))]
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub machine_type: Option<String>,

    pub difficulty: Option<Difficulty>,

    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,

    #[validate(length(max = 5000))]
    pub preview_description: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub author: Option<String>,

    #[validate(length(min = 1, max = 20))]
    pub version: Option<String>,

    pub preview_pages: Option<Vec<i32>>,
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

/// Check an explicit preview list against a page count.
///
/// Repeated pages are a malformed request; pages outside `1..=total_pages`
/// are an invalid range.
pub fn validate_preview_pages(pages: &[i32], total_pages: i32) -> Result<()> {
    let mut seen = HashSet::with_capacity(pages.len());
    for &page in pages {
        if !seen.insert(page) {
            return Err(Error::BadRequest(format!(
                "Preview page {} is listed more than once",
                page
            )));
        }
        if page < 1 || page > total_pages {
            return Err(Error::InvalidPageRange(format!(
                "Preview page {} is outside 1..={}",
                page, total_pages
            )));
        }
    }
    Ok(())
}
