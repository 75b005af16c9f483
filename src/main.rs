use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use repository_pattern::{
    config::{Config, defaults::DEFAULT_CONFIG_FILE},
    errors::GeneratorError,
    generator::RepositoryGenerator,
};

#[derive(Parser)]
#[command(name = "repository-pattern")]
#[command(version)]
#[command(about = "Repository scaffolding for SeaORM applications")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: String,

    /// Source root of the application (overrides config file)
    #[arg(long, value_name = "DIR")]
    app_path: Option<PathBuf>,

    /// Module path of the source root in generated code (overrides config file)
    #[arg(long, value_name = "PATH")]
    crate_path: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new repository and register it in the provider
    #[command(name = "setup:repository")]
    SetupRepository {
        /// Model name, e.g. `User` or `order_line`
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("repository_pattern={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load_from_file(&cli.config).map_err(GeneratorError::from)?;
    debug!("Configuration loaded from: {}", cli.config);

    if let Some(app_path) = cli.app_path {
        config.app_path = app_path;
    }
    if let Some(crate_path) = cli.crate_path {
        config.crate_path = crate_path;
    }

    match cli.command {
        Command::SetupRepository { name } => setup_repository(config, &name),
    }
}

fn setup_repository(config: Config, name: &str) -> Result<()> {
    let generator = RepositoryGenerator::new(config);
    let generated = match generator.generate(name) {
        Ok(generated) => generated,
        Err(e @ GeneratorError::AlreadyExists { .. }) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let plan = &generated.plan;
    info!(
        "Provider {} {}",
        plan.provider_file.display(),
        if generated.provider_created { "created" } else { "updated" }
    );
    for file in &generated.declared_in {
        info!("Declared module in {}", file.display());
    }
    println!("Repository {} created successfully !!!", plan.model_name);
    println!("  Implement: {}", plan.class_file.display());
    println!("  Interface: {}", plan.interface_file.display());
    Ok(())
}
