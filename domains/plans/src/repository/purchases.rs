//! Purchase ledger repository (Postgres)

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use planmart_common::Result;

use super::PurchaseLedger;
use crate::domain::entitlement::Purchase;

const PURCHASE_COLUMNS: &str = "plan_id, user_id, price, payment_method, purchased_at";

#[derive(Clone)]
pub struct PgPurchaseLedger {
    pool: PgPool,
}

impl PgPurchaseLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PurchaseLedger for PgPurchaseLedger {
    async fn record(&self, purchase: &Purchase) -> Result<Purchase> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let query = format!(
            "INSERT INTO plan_purchases ({PURCHASE_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (plan_id, user_id) DO UPDATE SET plan_id = plan_purchases.plan_id \
             RETURNING {PURCHASE_COLUMNS}"
        );
        let recorded = sqlx::query_as::<_, Purchase>(&query)
            .bind(purchase.plan_id)
            .bind(&purchase.user_id)
            .bind(purchase.price)
            .bind(&purchase.payment_method)
            .bind(purchase.purchased_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(recorded)
    }

    async fn has_purchase(&self, plan_id: Uuid, user_id: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM plan_purchases WHERE plan_id = $1 AND user_id = $2)",
        )
        .bind(plan_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
