//! Plans domain state

use std::sync::Arc;

use planmart_common::Config;

use crate::domain::assets::AssetStore;
use crate::domain::catalog::{CatalogIndex, PlanLinks};
use crate::domain::distribution::DistributionService;
use crate::domain::document::{DocumentCodec, PdfCodec};
use crate::domain::entitlement::entitlement_for;
use crate::repository::PlansRepositories;

/// Request-facing settings taken from [`Config`] at startup
#[derive(Debug, Clone)]
pub struct PlansSettings {
    pub default_page_size: u32,
    pub preview_cache_seconds: u32,
    pub max_document_bytes: usize,
}

impl From<&Config> for PlansSettings {
    fn from(config: &Config) -> Self {
        Self {
            default_page_size: config.default_page_size,
            preview_cache_seconds: config.preview_cache_seconds,
            max_document_bytes: config.max_document_bytes,
        }
    }
}

/// Application state for the Plans domain
#[derive(Clone)]
pub struct PlansState {
    pub assets: AssetStore,
    pub catalog: CatalogIndex,
    pub distribution: DistributionService,
    pub settings: PlansSettings,
}

impl PlansState {
    pub fn new(repos: PlansRepositories, config: &Config) -> Self {
        let codec: Arc<dyn DocumentCodec> = Arc::new(PdfCodec);
        let assets = AssetStore::new(repos.plans.clone(), codec, config.max_document_bytes);
        let catalog = CatalogIndex::new(
            repos.plans.clone(),
            PlanLinks::new(config.public_base_path.clone()),
        );
        let entitlement = entitlement_for(config.entitlement_mode, repos.purchases.clone());
        let distribution = DistributionService::new(assets.clone(), entitlement, repos.purchases);

        Self {
            assets,
            catalog,
            distribution,
            settings: PlansSettings::from(config),
        }
    }
}
