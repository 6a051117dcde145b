use anyhow::Context;
use biblos_kernel::settings::Settings;
use biblos_kernel::{InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Biblos settings")?;
    biblos_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        featured_capacity = settings.catalog.featured_capacity,
        "biblos-app bootstrap starting"
    );

    let service = biblos_app::build_catalog_service(&settings);
    let mut registry = ModuleRegistry::new();
    biblos_app::modules::register_all(&mut registry, service);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    biblos_http::start_server(&registry, &settings).await?;

    registry.stop_modules().await?;

    Ok(())
}
