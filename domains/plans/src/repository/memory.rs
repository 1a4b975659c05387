//! In-memory stores
//!
//! Each operation takes the lock once, so a metadata-plus-document update is
//! never observed half applied.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use planmart_common::{PageRequest, Paginated, RepositoryError, Result};

use super::{stale_write, PlanStore, PurchaseLedger};
use crate::domain::catalog::CatalogQuery;
use crate::domain::entities::{Plan, PlanMetadata};
use crate::domain::entitlement::Purchase;

#[derive(Debug, Default)]
pub struct InMemoryPlanStore {
    plans: RwLock<HashMap<Uuid, Plan>>,
}

impl InMemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for InMemoryPlanStore {
    async fn insert(&self, plan: &Plan) -> Result<PlanMetadata> {
        let mut plans = self.plans.write().map_err(|_| RepositoryError::Poisoned)?;
        if plans.contains_key(&plan.id()) {
            return Err(RepositoryError::AlreadyExists.into());
        }
        plans.insert(plan.id(), plan.clone());
        Ok(plan.metadata.clone())
    }

    async fn find_metadata(&self, id: Uuid) -> Result<Option<PlanMetadata>> {
        let plans = self.plans.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(plans.get(&id).map(|plan| plan.metadata.clone()))
    }

    async fn find_full(&self, id: Uuid) -> Result<Option<Plan>> {
        let plans = self.plans.read().map_err(|_| RepositoryError::Poisoned)?;
        Ok(plans.get(&id).cloned())
    }

    async fn update(
        &self,
        metadata: &PlanMetadata,
        document: Option<&[u8]>,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<Option<PlanMetadata>> {
        let mut plans = self.plans.write().map_err(|_| RepositoryError::Poisoned)?;
        let Some(plan) = plans.get_mut(&metadata.id) else {
            return Ok(None);
        };
        if plan.metadata.updated_at != expected_updated_at {
            return Err(stale_write(metadata.id));
        }

        plan.metadata = metadata.clone();
        if let Some(bytes) = document {
            plan.document = Some(bytes.to_vec());
        }
        Ok(Some(plan.metadata.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut plans = self.plans.write().map_err(|_| RepositoryError::Poisoned)?;
        Ok(plans.remove(&id).is_some())
    }

    async fn find_projected(
        &self,
        query: &CatalogQuery,
        page: PageRequest,
    ) -> Result<Paginated<PlanMetadata>> {
        let plans = self.plans.read().map_err(|_| RepositoryError::Poisoned)?;
        let mut matching: Vec<PlanMetadata> = plans
            .values()
            .map(|plan| &plan.metadata)
            .filter(|metadata| query.matches(metadata))
            .cloned()
            .collect();
        drop(plans);

        matching.sort_by_key(|m| (Reverse(m.created_at), m.id));
        Ok(Paginated::from_records(matching, page))
    }
}

#[derive(Debug, Default)]
pub struct InMemoryPurchaseLedger {
    purchases: RwLock<HashMap<(Uuid, String), Purchase>>,
}

impl InMemoryPurchaseLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PurchaseLedger for InMemoryPurchaseLedger {
    async fn record(&self, purchase: &Purchase) -> Result<Purchase> {
        let mut purchases = self
            .purchases
            .write()
            .map_err(|_| RepositoryError::Poisoned)?;
        let entry = purchases
            .entry((purchase.plan_id, purchase.user_id.clone()))
            .or_insert_with(|| purchase.clone());
        Ok(entry.clone())
    }

    async fn has_purchase(&self, plan_id: Uuid, user_id: &str) -> Result<bool> {
        let purchases = self
            .purchases
            .read()
            .map_err(|_| RepositoryError::Poisoned)?;
        Ok(purchases.contains_key(&(plan_id, user_id.to_string())))
    }
}
