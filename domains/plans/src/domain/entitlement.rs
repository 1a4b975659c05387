//! Download entitlement
//!
//! `has_access` never fails: a ledger that cannot be read answers `false`
//! and the failure is logged.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use planmart_common::EntitlementMode;

use crate::repository::PurchaseLedger;

/// A recorded purchase of one plan by one user. Access does not expire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Purchase {
    pub plan_id: Uuid,
    pub user_id: String,
    /// Price at the time of purchase
    pub price: Decimal,
    pub payment_method: Option<String>,
    pub purchased_at: DateTime<Utc>,
}

impl Purchase {
    pub fn new(
        plan_id: Uuid,
        user_id: &str,
        price: Decimal,
        payment_method: Option<String>,
    ) -> Self {
        Self {
            plan_id,
            user_id: user_id.to_string(),
            price,
            payment_method,
            purchased_at: Utc::now(),
        }
    }
}

/// Answers "may this user fetch the full document of this plan?"
#[async_trait]
pub trait Entitlement: Send + Sync {
    async fn has_access(&self, plan_id: Uuid, user_id: &str) -> bool;
}

/// Grants access to users with a recorded purchase
#[derive(Clone)]
pub struct LedgerEntitlement {
    ledger: Arc<dyn PurchaseLedger>,
}

impl LedgerEntitlement {
    pub fn new(ledger: Arc<dyn PurchaseLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl Entitlement for LedgerEntitlement {
    async fn has_access(&self, plan_id: Uuid, user_id: &str) -> bool {
        match self.ledger.has_purchase(plan_id, user_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    plan_id = %plan_id,
                    user_id = user_id,
                    error = %e,
                    "Purchase ledger lookup failed, denying access"
                );
                false
            }
        }
    }
}

/// Grants access to every well-formed request
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAccess;

#[async_trait]
impl Entitlement for OpenAccess {
    async fn has_access(&self, _plan_id: Uuid, _user_id: &str) -> bool {
        true
    }
}

/// Build the entitlement policy selected by configuration
pub fn entitlement_for(
    mode: EntitlementMode,
    ledger: Arc<dyn PurchaseLedger>,
) -> Arc<dyn Entitlement> {
    match mode {
        EntitlementMode::Ledger => Arc::new(LedgerEntitlement::new(ledger)),
        EntitlementMode::Open => {
            tracing::warn!("ENTITLEMENT_MODE=open: full downloads are not gated");
            Arc::new(OpenAccess)
        }
    }
}
