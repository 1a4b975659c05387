//! Preview and download orchestration
//!
//! Each request is independent: fetch the record, then either slice a preview
//! or check entitlement and hand back the stored bytes unchanged.

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use planmart_common::{Error, Result};

use crate::domain::assets::AssetStore;
use crate::domain::document;
use crate::domain::entitlement::{Entitlement, Purchase};
use crate::domain::preview::select_pages;
use crate::repository::PurchaseLedger;

/// Longest accepted user identifier
pub const MAX_USER_ID_LENGTH: usize = 128;

/// A derived preview document
#[derive(Debug, Clone)]
pub struct PreviewDocument {
    pub title: String,
    /// Source page numbers, in the order they appear in `bytes`
    pub pages: Vec<i32>,
    pub bytes: Vec<u8>,
}

/// A full document released to an entitled user
#[derive(Debug, Clone)]
pub struct DownloadDocument {
    pub title: String,
    pub bytes: Vec<u8>,
}

/// Outcome of recording a purchase
#[derive(Debug, Clone)]
pub struct PurchaseReceipt {
    pub plan_id: Uuid,
    pub title: String,
    pub price: Decimal,
    pub purchase: Purchase,
}

#[derive(Clone)]
pub struct DistributionService {
    assets: AssetStore,
    entitlement: Arc<dyn Entitlement>,
    ledger: Arc<dyn PurchaseLedger>,
}

impl DistributionService {
    pub fn new(
        assets: AssetStore,
        entitlement: Arc<dyn Entitlement>,
        ledger: Arc<dyn PurchaseLedger>,
    ) -> Self {
        Self {
            assets,
            entitlement,
            ledger,
        }
    }

    /// Derive a preview holding the curated pages, or a random half.
    ///
    /// Without a curated list, repeated calls may expose different pages.
    pub async fn preview(&self, plan_id: Uuid) -> Result<PreviewDocument> {
        let stored = self.assets.fetch(plan_id).await?;
        let metadata = stored.metadata;

        let pages = select_pages(
            metadata.total_pages,
            &metadata.preview_pages,
            &mut rand::thread_rng(),
        );
        let bytes =
            document::extract_pages(self.assets.codec(), stored.bytes, pages.clone()).await?;

        tracing::info!(
            plan_id = %plan_id,
            pages = ?pages,
            bytes = bytes.len(),
            "Preview generated"
        );

        Ok(PreviewDocument {
            title: metadata.title,
            pages,
            bytes,
        })
    }

    /// Release the full document. The user is checked before the store is read.
    pub async fn download(&self, plan_id: Uuid, user_id: Option<&str>) -> Result<DownloadDocument> {
        let user_id = require_user_id(user_id)?;

        if !self.entitlement.has_access(plan_id, user_id).await {
            tracing::info!(plan_id = %plan_id, user_id = user_id, "Download refused");
            return Err(Error::Unauthorized(
                "No purchase of this plan is recorded for the user".to_string(),
            ));
        }

        let stored = self.assets.fetch(plan_id).await?;
        tracing::info!(
            plan_id = %plan_id,
            user_id = user_id,
            bytes = stored.bytes.len(),
            "Download released"
        );

        Ok(DownloadDocument {
            title: stored.metadata.title,
            bytes: stored.bytes,
        })
    }

    /// Record a purchase; no payment is taken
    pub async fn purchase(
        &self,
        plan_id: Uuid,
        user_id: Option<&str>,
        payment_method: Option<String>,
    ) -> Result<PurchaseReceipt> {
        let user_id = require_user_id(user_id)?;
        let metadata = self.assets.metadata(plan_id).await?;

        let purchase = self
            .ledger
            .record(&Purchase::new(plan_id, user_id, metadata.price, payment_method))
            .await?;

        tracing::info!(plan_id = %plan_id, user_id = user_id, "Purchase recorded");

        Ok(PurchaseReceipt {
            plan_id,
            title: metadata.title,
            price: purchase.price,
            purchase,
        })
    }
}

/// A present, non-blank user identifier of bounded length
pub fn require_user_id(raw: Option<&str>) -> Result<&str> {
    let user_id = raw.map(str::trim).unwrap_or_default();
    if user_id.is_empty() {
        return Err(Error::BadRequest("userId is required".to_string()));
    }
    if user_id.len() > MAX_USER_ID_LENGTH {
        return Err(Error::BadRequest(format!(
            "userId must be at most {} characters",
            MAX_USER_ID_LENGTH
        )));
    }
    Ok(user_id)
}

/// Header-safe filename: ASCII letters, digits, `-`, `_` and `.`
pub fn safe_filename(title: &str, suffix: &str, extension: &str) -> String {
    let mut stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    stem.truncate(120);
    let stem = stem.trim_matches(|c| c == '_' || c == '.');
    let stem = if stem.is_empty() { "plan" } else { stem };
    format!("{}{}.{}", stem, suffix, extension)
}
