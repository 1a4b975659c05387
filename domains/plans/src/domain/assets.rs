//! Asset store: plan records and their document bytes
//!
//! Every write that carries a document recomputes `total_pages` from the
//! document itself. Metadata reads never load the bytes.

use std::sync::Arc;

use uuid::Uuid;

use planmart_common::{validate, Error, Result};

use crate::domain::document::{self, DocumentCodec};
use crate::domain::entities::{validate_preview_pages, Plan, PlanChanges, PlanDraft, PlanMetadata};
use crate::repository::PlanStore;

/// A plan's metadata together with its document bytes
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub metadata: PlanMetadata,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct AssetStore {
    store: Arc<dyn PlanStore>,
    codec: Arc<dyn DocumentCodec>,
    max_document_bytes: usize,
}

impl AssetStore {
    pub fn new(
        store: Arc<dyn PlanStore>,
        codec: Arc<dyn DocumentCodec>,
        max_document_bytes: usize,
    ) -> Self {
        Self {
            store,
            codec,
            max_document_bytes,
        }
    }

    pub fn codec(&self) -> Arc<dyn DocumentCodec> {
        self.codec.clone()
    }

    /// Enforce the size limit, then count pages off the async runtime
    async fn inspect(&self, bytes: Vec<u8>) -> Result<(i32, Vec<u8>)> {
        if bytes.is_empty() {
            return Err(Error::CorruptDocument("Document is empty".to_string()));
        }
        if bytes.len() > self.max_document_bytes {
            return Err(Error::PayloadTooLarge(format!(
                "Document is {} bytes; the limit is {} bytes",
                bytes.len(),
                self.max_document_bytes
            )));
        }
        document::count_pages(self.codec.clone(), bytes).await
    }

    /// Create a plan. With a document, the page count comes from the document.
    pub async fn create(&self, draft: PlanDraft, document: Option<Vec<u8>>) -> Result<PlanMetadata> {
        validate(&draft)?;

        let plan = match document {
            Some(bytes) => {
                let (total_pages, bytes) = self.inspect(bytes).await?;
                Plan::new(draft, Some(bytes), total_pages)?
            }
            None => {
                let declared = draft.declared_pages.ok_or_else(|| {
                    Error::BadRequest(
                        "A page count is required when no document is supplied".to_string(),
                    )
                })?;
                Plan::new(draft, None, declared)?
            }
        };

        let created = self.store.insert(&plan).await?;
        tracing::info!(
            plan_id = %created.id,
            pages = created.total_pages,
            bytes = created.document_size.unwrap_or(0),
            "Plan created"
        );
        Ok(created)
    }

    /// Store a new document for an existing plan and return its page count
    pub async fn put(&self, id: Uuid, bytes: Vec<u8>) -> Result<i32> {
        let updated = self.update(id, PlanChanges::default(), Some(bytes)).await?;
        Ok(updated.total_pages)
    }

    /// Apply metadata changes and an optional document replacement in one write.
    ///
    /// Fails with `InvalidPageRange`, writing nothing, when the resulting
    /// preview list does not fit the resulting page count. Fails with
    /// `Conflict` when another write landed between the read and this write.
    pub async fn update(
        &self,
        id: Uuid,
        changes: PlanChanges,
        document: Option<Vec<u8>>,
    ) -> Result<PlanMetadata> {
        validate(&changes)?;

        let inspected = match document {
            Some(bytes) => Some(self.inspect(bytes).await?),
            None => None,
        };

        let mut metadata = self.metadata(id).await?;
        let read_at = metadata.updated_at;
        metadata.apply(changes);
        if let Some((total_pages, bytes)) = &inspected {
            metadata.attach_document(bytes.len(), *total_pages);
        }
        validate_preview_pages(&metadata.preview_pages, metadata.total_pages)?;

        let bytes = inspected.as_ref().map(|(_, bytes)| bytes.as_slice());
        let updated = self
            .store
            .update(&metadata, bytes, read_at)
            .await?
            .ok_or_else(|| plan_not_found(id))?;

        tracing::info!(
            plan_id = %id,
            pages = updated.total_pages,
            document_replaced = inspected.is_some(),
            "Plan updated"
        );
        Ok(updated)
    }

    /// Metadata only; the document is not loaded
    pub async fn metadata(&self, id: Uuid) -> Result<PlanMetadata> {
        self.store
            .find_metadata(id)
            .await?
            .ok_or_else(|| plan_not_found(id))
    }

    /// The full record. `MissingAsset` when the plan has no document.
    pub async fn fetch(&self, id: Uuid) -> Result<StoredDocument> {
        let plan = self
            .store
            .find_full(id)
            .await?
            .ok_or_else(|| plan_not_found(id))?;

        match plan.document {
            Some(bytes) => Ok(StoredDocument {
                metadata: plan.metadata,
                bytes,
            }),
            None => Err(Error::MissingAsset(format!(
                "Plan {} has no stored document",
                id
            ))),
        }
    }

    /// Document bytes only
    pub async fn get(&self, id: Uuid) -> Result<Vec<u8>> {
        self.fetch(id).await.map(|stored| stored.bytes)
    }

    /// Remove the plan and its document
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.store.delete(id).await? {
            return Err(plan_not_found(id));
        }
        tracing::info!(plan_id = %id, "Plan deleted");
        Ok(())
    }
}

fn plan_not_found(id: Uuid) -> Error {
    Error::NotFound(format!("Plan {} not found", id))
}
