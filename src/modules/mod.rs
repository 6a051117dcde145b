pub mod catalog;
pub mod reviews;

use std::sync::Arc;

use biblos_catalog::CatalogService;
use biblos_kernel::ModuleRegistry;

/// Register all project-specific modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, service: Arc<CatalogService>) {
    registry.register(catalog::create_module(service.clone()));
    registry.register(reviews::create_module(service));
}
