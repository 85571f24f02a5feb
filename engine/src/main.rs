// Analyst engine
// Main entry point for the analyst binary

use clap::Parser;

use analyst_engine::cli::{Cli, Command};
use analyst_engine::config::Config;
use analyst_engine::handlers::{handle_ask, handle_doctor, handle_seed, OutputFormat};
use analyst_engine::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine output format
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    // Load configuration (or use custom path if provided)
    let config = if let Some(config_path) = &cli.config {
        Config::load_from_path(config_path)?
    } else {
        Config::load_or_create()?
    };

    // Initialize telemetry with the config-driven log level
    // (RUST_LOG still takes precedence)
    telemetry::init(&config.core.log_level);

    tracing::info!("Analyst Engine v{}", env!("CARGO_PKG_VERSION"));

    // Handle commands
    match cli.command {
        Command::Ask { question } => {
            tracing::info!("Answering question");
            handle_ask(question, &config, format).await
        }

        Command::Seed => {
            tracing::info!("Seeding demo data");
            handle_seed(&config, format).await
        }

        Command::Doctor => {
            tracing::info!("Running diagnostics...");
            handle_doctor(&config, format).await
        }
    }
}
