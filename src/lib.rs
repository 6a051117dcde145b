//! Biblos application library: module wiring around the catalog engine.

pub mod modules;

use std::sync::Arc;

use biblos_catalog::{CatalogConfig, CatalogService};
use biblos_kernel::settings::Settings;
use biblos_store::memory::{MemoryBookStore, MemoryReviewStore};

/// Assemble the catalog service over the process-local stores.
pub fn build_catalog_service(settings: &Settings) -> Arc<CatalogService> {
    let config = CatalogConfig {
        featured_capacity: settings.catalog.featured_capacity,
        default_page: settings.catalog.default_page,
        default_page_size: settings.catalog.default_page_size,
        recent_limit: settings.catalog.recent_limit,
    };
    Arc::new(CatalogService::new(
        Arc::new(MemoryBookStore::new()),
        Arc::new(MemoryReviewStore::new()),
        config,
    ))
}
