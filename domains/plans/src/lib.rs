//! Plans domain: design document storage, controlled previews and
//! entitlement-gated downloads

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::assets::{AssetStore, StoredDocument};
pub use domain::catalog::{CatalogIndex, CatalogQuery, PlanFilter, PlanLinks, PlanSummary};
pub use domain::distribution::{
    DistributionService, DownloadDocument, PreviewDocument, PurchaseReceipt,
};
pub use domain::document::{DocumentCodec, PdfCodec};
pub use domain::entities::{Difficulty, Plan, PlanChanges, PlanDraft, PlanMetadata};
pub use domain::entitlement::{Entitlement, LedgerEntitlement, OpenAccess, Purchase};
pub use domain::preview::select_pages;

// Re-export repository types
pub use repository::{PlanStore, PlansRepositories, PurchaseLedger};

// Re-export API types
pub use api::routes;
pub use api::{PlansSettings, PlansState};
