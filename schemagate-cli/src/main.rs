mod cli;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use cli::{Cli, Commands, ConfigCommands};
use schemagate_config::{ConfigLoader, LoggingConfig, SchemagateConfig};
use schemagate_migrate::{DataResetter, Direction, MigrationConfig, MigrationRunner, ResetGuard};

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<SchemagateConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            if path.exists() {
                info!("Loading configuration from: {:?}", path);
                loader
                    .from_file(path)
                    .context(format!("Failed to load configuration from {:?}", path))
            } else {
                warn!("Configuration file not found: {:?}. Using defaults.", path);
                loader
                    .from_env()
                    .context("Failed to load configuration from environment")
            }
        }
        None => {
            debug!("No configuration file specified. Loading from environment or defaults.");
            loader
                .from_env()
                .context("Failed to load configuration from environment")
        }
    }
}

/// Connection targets after command-line overrides
struct Targets {
    database_url: String,
    source_url: String,
}

impl Targets {
    fn resolve(cli: &Cli, config: &SchemagateConfig) -> Self {
        Self {
            database_url: cli
                .database_url
                .clone()
                .unwrap_or_else(|| config.migrations.database_url.clone()),
            source_url: cli
                .source
                .clone()
                .unwrap_or_else(|| config.migrations.source_url.clone()),
        }
    }
}

/// Step count for a direction: the flag, then the configured default when it
/// was set for the same direction, then -1 for up and 1 for down
fn resolve_steps(direction: Direction, flag: Option<i64>, config: &SchemagateConfig) -> Result<i64> {
    if let Some(steps) = flag {
        return Ok(steps);
    }

    let configured = Direction::from_str(&config.migrations.direction)
        .context("Invalid migrations.direction in configuration")?;
    if configured == direction {
        return Ok(config.migrations.steps);
    }

    Ok(match direction {
        Direction::Up => -1,
        Direction::Down => 1,
    })
}

async fn migrate_command(direction: Direction, steps: i64, targets: &Targets) -> Result<()> {
    let config = MigrationConfig::new(direction, steps, &targets.database_url, &targets.source_url);

    MigrationRunner::new()
        .run(&config)
        .await
        .context(format!("Failed to run migrations {}", direction))?;

    println!("✅ Migrations {} complete", direction);
    Ok(())
}

async fn reset_command(targets: &Targets, config: &SchemagateConfig) -> Result<()> {
    let guard = ResetGuard::with_markers(config.reset.allowed_markers.iter().cloned());

    DataResetter::new()
        .with_guard(guard)
        .reset(&targets.source_url, &targets.database_url)
        .await
        .context("Failed to reset database")?;

    println!("✅ All data removed");
    Ok(())
}

async fn version_command(targets: &Targets) -> Result<()> {
    let version = MigrationRunner::new()
        .version(&targets.source_url, &targets.database_url)
        .await
        .context("Failed to read schema version")?;

    match version {
        Some(version) => println!("{}", version),
        None => println!("no migrations applied"),
    }
    Ok(())
}

/// Handle configuration validation
fn handle_config_validate(config_file: &Path) -> Result<()> {
    info!("Validating configuration file: {:?}", config_file);

    if !config_file.exists() {
        return Err(anyhow::anyhow!("Configuration file not found: {:?}", config_file));
    }

    match ConfigLoader::new().from_file(config_file) {
        Ok(_config) => {
            println!("✅ Configuration file is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {}", e);
            error!("Configuration validation failed: {}", e);
            Err(e.into())
        }
    }
}

/// Handle configuration generation
fn handle_config_generate(output: &Path, force: bool) -> Result<()> {
    info!("Generating configuration at: {:?}", output);

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {:?}. Use --force to overwrite.",
            output
        ));
    }

    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, SchemagateConfig::generate_sample())
        .context(format!("Failed to write configuration to {:?}", output))?;

    println!("✅ Configuration written to {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // config commands run before the environment configuration is loaded
    if let Commands::Config { config_cmd } = &cli.command {
        logging::init_logging(&LoggingConfig::default(), cli.log_level.as_deref())?;
        return match config_cmd {
            ConfigCommands::Validate { config_file } => handle_config_validate(config_file),
            ConfigCommands::Generate { output, force } => handle_config_generate(output, *force),
        };
    }

    let config = load_config(cli.config.as_ref())?;
    logging::init_logging(&config.logging, cli.log_level.as_deref())?;
    info!("schemagate starting");

    let targets = Targets::resolve(&cli, &config);

    match &cli.command {
        Commands::Up { steps } => {
            let steps = resolve_steps(Direction::Up, *steps, &config)?;
            migrate_command(Direction::Up, steps, &targets).await
        }
        Commands::Down { steps } => {
            let steps = resolve_steps(Direction::Down, *steps, &config)?;
            migrate_command(Direction::Down, steps, &targets).await
        }
        Commands::Reset => reset_command(&targets, &config).await,
        Commands::Version => version_command(&targets).await,
        Commands::Config { .. } => Ok(()),
    }
}
