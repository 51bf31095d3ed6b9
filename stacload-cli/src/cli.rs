//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand};
use stacload_config::{Backend, StacLoadConfig, ThinkTime};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a load test against a STAC API
    Run(RunArgs),

    /// Execute one scenario once, whatever its weight, and print its requests
    RunOnce {
        #[command(flatten)]
        target: TargetArgs,

        /// Scenario name (see `stacload scenarios`)
        #[arg(long, value_name = "NAME")]
        scenario: String,

        /// Seed for the scenario's random parameters
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,
    },

    /// Ingest the sample collection and items into a STAC API
    Ingest {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// List the built-in scenarios
    Scenarios,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

/// Which API to talk to
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Specify the STAC API URL to test against
    #[arg(short = 'a', long, value_name = "URL")]
    pub api_address: Option<String>,

    /// Use a local backend preset (pgstac, es, mongo)
    #[arg(short = 'b', long, value_name = "BACKEND")]
    pub backend: Option<Backend>,
}

impl TargetArgs {
    pub fn apply(&self, config: &mut StacLoadConfig) {
        if let Some(ref address) = self.api_address {
            config.target.base_url = address.clone();
            // an explicit address wins over a preset from the config file
            config.target.backend = None;
        }
        if let Some(backend) = self.backend {
            config.target.backend = Some(backend);
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Number of concurrent users
    #[arg(short = 'c', long, value_name = "N")]
    pub users: Option<usize>,

    /// Time over which users are started (e.g. 1m, 30s)
    #[arg(short = 'r', long, value_name = "DURATION")]
    pub ramp_up: Option<humantime::Duration>,

    /// Scenario invocations per user
    #[arg(short = 'n', long, value_name = "N")]
    pub iterations: Option<u64>,

    /// Stop the run after this long (e.g. 5m)
    #[arg(short = 'd', long, value_name = "DURATION")]
    pub duration: Option<humantime::Duration>,

    /// Only run scenarios with one of these tags
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Never run scenarios with one of these tags
    #[arg(long, value_name = "TAGS", value_delimiter = ',')]
    pub exclude_tags: Vec<String>,

    /// Seed for reproducible scenario sequences
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Pause between scenarios in milliseconds: MIN or MIN,MAX
    #[arg(long, value_name = "MIN[,MAX]", value_parser = parse_think_time)]
    pub think_time_ms: Option<ThinkTime>,

    /// Write the final report as JSON to this file
    #[arg(long, value_name = "PATH")]
    pub report_json: Option<PathBuf>,
}

impl RunArgs {
    /// Command line values override the loaded configuration
    pub fn apply(&self, config: &mut StacLoadConfig) {
        self.target.apply(config);

        let run = &mut config.run;
        if let Some(users) = self.users {
            run.users = users;
        }
        if let Some(ref ramp_up) = self.ramp_up {
            run.ramp_up = **ramp_up;
        }
        if let Some(iterations) = self.iterations {
            run.iterations = Some(iterations);
        }
        if let Some(ref duration) = self.duration {
            run.duration = Some(**duration);
        }
        if !self.tags.is_empty() {
            run.tags = self.tags.clone();
        }
        if !self.exclude_tags.is_empty() {
            run.exclude_tags = self.exclude_tags.clone();
        }
        if self.seed.is_some() {
            run.seed = self.seed;
        }
        if let Some(think_time) = self.think_time_ms {
            run.think_time = think_time;
        }
    }
}

fn parse_think_time(value: &str) -> Result<ThinkTime, String> {
    let parse = |part: &str| {
        part.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| format!("invalid milliseconds '{}': {}", part, e))
    };

    match value.split_once(',') {
        Some((min, max)) => {
            let (min, max) = (parse(min)?, parse(max)?);
            if min > max {
                return Err(format!("minimum {:?} exceeds maximum {:?}", min, max));
            }
            Ok(ThinkTime::between(min, max))
        }
        None => parse(value).map(ThinkTime::constant),
    }
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Generate a sample configuration file with every default spelled out
    Generate {
        /// Output file path
        #[arg(long, value_name = "PATH")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Show current configuration in use
    Show {
        /// Output format: yaml, json
        #[arg(long, value_name = "FORMAT", default_value = "yaml")]
        format: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_arguments_override_config() {
        let cli = Cli::parse_from([
            "stacload",
            "run",
            "-a",
            "http://stac.example.com",
            "-c",
            "25",
            "-r",
            "30s",
            "-n",
            "7",
            "--tags",
            "get_item,user_bbox",
            "--seed",
            "3",
            "--think-time-ms",
            "100,250",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };

        let mut config = StacLoadConfig::default();
        config.target.backend = Some(Backend::Es);
        args.apply(&mut config);

        assert_eq!(config.target.effective_base_url(), "http://stac.example.com");
        assert_eq!(config.run.users, 25);
        assert_eq!(config.run.ramp_up, Duration::from_secs(30));
        assert_eq!(config.run.iterations, Some(7));
        assert_eq!(config.run.tags, vec!["get_item", "user_bbox"]);
        assert_eq!(config.run.seed, Some(3));
        assert_eq!(
            config.run.think_time,
            ThinkTime::between(Duration::from_millis(100), Duration::from_millis(250))
        );
    }

    #[test]
    fn test_backend_preset() {
        let cli = Cli::parse_from(["stacload", "ingest", "-b", "mongo"]);
        let Commands::Ingest { target } = cli.command else {
            panic!("expected ingest command");
        };

        let mut config = StacLoadConfig::default();
        target.apply(&mut config);
        assert_eq!(config.target.effective_base_url(), "http://localhost:8085");
    }

    #[test]
    fn test_think_time_parsing() {
        assert_eq!(
            parse_think_time("50").unwrap(),
            ThinkTime::constant(Duration::from_millis(50))
        );
        assert!(parse_think_time("300,100").is_err());
        assert!(parse_think_time("fast").is_err());
    }
}
