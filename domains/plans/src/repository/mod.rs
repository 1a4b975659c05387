//! Repository interfaces and implementations for the Plans domain
//!
//! Stores are traits so the domain never depends on a query builder:
//! Postgres implementations back production, in-memory implementations back
//! `STORE_BACKEND=memory` and tests.

pub mod memory;
pub mod plans;
pub mod purchases;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use planmart_common::{Error, PageRequest, Paginated, Result};

use crate::domain::catalog::CatalogQuery;
use crate::domain::entities::{Plan, PlanMetadata};
use crate::domain::entitlement::Purchase;

pub use memory::{InMemoryPlanStore, InMemoryPurchaseLedger};
pub use plans::PgPlanStore;
pub use purchases::PgPurchaseLedger;

/// Persistence for plan records
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Store a new plan, document included
    async fn insert(&self, plan: &Plan) -> Result<PlanMetadata>;

    /// Read metadata without loading the document
    async fn find_metadata(&self, id: Uuid) -> Result<Option<PlanMetadata>>;

    /// Read the full record, document included
    async fn find_full(&self, id: Uuid) -> Result<Option<Plan>>;

    /// Replace the metadata and, when given, the document in one write.
    ///
    /// The write only lands while the stored `updated_at` still equals
    /// `expected_updated_at`; otherwise it fails with `Conflict`. `None`
    /// when the plan does not exist.
    async fn update(
        &self,
        metadata: &PlanMetadata,
        document: Option<&[u8]>,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Option<PlanMetadata>>;

    /// Remove metadata and document together
    async fn delete(&self, id: Uuid) -> Result<bool>;

    /// One page of matching metadata, newest first, ties by identifier
    async fn find_projected(
        &self,
        query: &CatalogQuery,
        page: PageRequest,
    ) -> Result<Paginated<PlanMetadata>>;
}

/// Answer for a guarded write whose read has gone stale
pub(crate) fn stale_write(id: Uuid) -> Error {
    Error::Conflict(format!(
        "Plan {} was modified by another request; reload and retry",
        id
    ))
}

/// Persisted purchases, keyed by `(plan_id, user_id)`
#[async_trait]
pub trait PurchaseLedger: Send + Sync {
    /// Record a purchase; recording the same pair again returns the first entry
    async fn record(&self, purchase: &Purchase) -> Result<Purchase>;

    async fn has_purchase(&self, plan_id: Uuid, user_id: &str) -> Result<bool>;
}

/// Combined repository access for the Plans domain
#[derive(Clone)]
pub struct PlansRepositories {
    pub plans: Arc<dyn PlanStore>,
    pub purchases: Arc<dyn PurchaseLedger>,
}

impl PlansRepositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            plans: Arc::new(PgPlanStore::new(pool.clone())),
            purchases: Arc::new(PgPurchaseLedger::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            plans: Arc::new(InMemoryPlanStore::new()),
            purchases: Arc::new(InMemoryPurchaseLedger::new()),
        }
    }
}
