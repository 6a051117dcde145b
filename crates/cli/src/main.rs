use anyhow::Context;
use biblos_kernel::settings::Settings;
use biblos_kernel::ModuleRegistry;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "biblos", about = "Operator tooling for the Biblos catalog backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the effective layered settings
    Settings,
    /// Print the merged OpenAPI document of all registered modules
    Openapi,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::try_init().ok();

    let cli = Cli::parse();
    let settings = Settings::load().with_context(|| "failed to load Biblos settings")?;

    match cli.command {
        Command::Settings => {
            println!("{settings:#?}");
        }
        Command::Openapi => {
            let service = biblos_app::build_catalog_service(&settings);
            let mut registry = ModuleRegistry::new();
            biblos_app::modules::register_all(&mut registry, service);

            let spec = biblos_http::router::merged_openapi(&registry);
            println!("{}", serde_json::to_string_pretty(&spec)?);
        }
    }

    Ok(())
}
