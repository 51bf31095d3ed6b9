use anyhow::{Context, Result};
use clap::Parser;
use stacload_config::{ConfigLoader, StacLoadConfig};
use stacload_logging::{init_logging_from_config, init_simple_tracing};
use std::path::PathBuf;
use tracing::{debug, info, warn};

mod cli;
mod commands;
mod formatter;

use cli::{Cli, Commands, ConfigCommands};

/// Where the configuration came from, logged once tracing is up
#[derive(Debug, PartialEq)]
enum ConfigSource {
    File(PathBuf),
    MissingFile(PathBuf),
    Environment,
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::File(path) => info!("Loaded configuration from: {:?}", path),
            ConfigSource::MissingFile(path) => {
                warn!("Configuration file not found: {:?}. Using defaults.", path)
            }
            ConfigSource::Environment => {
                debug!("No configuration file specified. Loaded from environment or defaults.")
            }
        }
    }
}

/// Load configuration from file or use defaults
fn load_config(config_path: Option<&PathBuf>) -> Result<(StacLoadConfig, ConfigSource)> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) if path.exists() => {
            let config = loader
                .from_file(path)
                .context(format!("Failed to load configuration from {:?}", path))?;
            Ok((config, ConfigSource::File(path.clone())))
        }
        Some(path) => {
            let config = loader
                .from_env()
                .context("Failed to load configuration from environment")?;
            Ok((config, ConfigSource::MissingFile(path.clone())))
        }
        None => {
            let config = loader
                .from_env()
                .context("Failed to load configuration from environment")?;
            Ok((config, ConfigSource::Environment))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (config, source) = load_config(cli.config.as_ref())?;

    match cli.log_level {
        Some(ref level) => init_simple_tracing(level)?,
        None => init_logging_from_config(&config.logging)?,
    }
    source.log();

    debug!("stacload {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run(ref args) => commands::run_command(config, args).await,
        Commands::RunOnce {
            ref target,
            ref scenario,
            seed,
        } => {
            let mut config = config;
            target.apply(&mut config);
            commands::run_once_command(&config, scenario, seed).await
        }
        Commands::Ingest { ref target } => {
            let mut config = config;
            target.apply(&mut config);
            commands::ingest_command(&config).await
        }
        Commands::Scenarios => {
            commands::scenarios_command();
            Ok(())
        }
        Commands::Config { ref config_cmd } => match config_cmd {
            ConfigCommands::Validate { config_file } => {
                commands::handle_config_validate(config_file)
            }
            ConfigCommands::Generate { output, force } => {
                commands::handle_config_generate(output, *force)
            }
            ConfigCommands::Show { format } => commands::handle_config_show(&config, format),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_config_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(source, ConfigSource::MissingFile(path));
        assert_eq!(config.run.users, StacLoadConfig::default().run.users);
    }

    #[test]
    fn test_config_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stacload.yaml");
        fs::write(&path, "run:\n  users: 3\n").unwrap();

        let (config, source) = load_config(Some(&path)).unwrap();
        assert_eq!(source, ConfigSource::File(path));
        assert_eq!(config.run.users, 3);
    }
}
