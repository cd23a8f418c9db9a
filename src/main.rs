// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! bucketsort: browser-driven image triage
//!
//! Scans the input directories once, then serves a web UI that moves each
//! image into one of the configured left/right bucket folders.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use bucketsort::buckets::BucketRegistry;
use bucketsort::catalog::build_catalog;
use bucketsort::config::{AppConfig, ConfigOverrides};
use bucketsort::web::{self, AppState};
use bucketsort::{logging, Result, Sorter};

/// bucketsort CLI - sort images into buckets from the browser
#[derive(Parser, Debug)]
#[command(name = "bucketsort")]
#[command(author = "Jonathan D. A. Jewell <hyperpolymath>")]
#[command(version)]
#[command(about = "Sort images into left/right bucket folders from a web UI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (JSON format)
    #[arg(short, long, default_value = "config.json", global = true)]
    config: PathBuf,

    /// Input image directory (repeatable)
    #[arg(short, long, global = true)]
    input: Vec<PathBuf>,

    /// Output image directory
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Left bucket name (repeatable)
    #[arg(long, global = true)]
    left: Vec<String>,

    /// Right bucket name (repeatable)
    #[arg(long, global = true)]
    right: Vec<String>,

    /// Host to bind to
    #[arg(short = 'H', long, global = true)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Log file, truncated on start
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Directory served under /static
    #[arg(long, global = true)]
    static_dir: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable trace logging (most verbose)
    #[arg(long, global = true)]
    trace: bool,

    /// Suppress non-essential output (quiet mode)
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scan the input directories and serve the sorting UI (default)
    Serve,

    /// List the images a scan would catalogue, without moving anything
    Scan {
        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Generate default configuration file
    Generate {
        /// Output file path
        #[arg(long = "to", default_value = "config.json")]
        to: PathBuf,
    },
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            input: self.input.clone(),
            output: self.output.clone(),
            left: self.left.clone(),
            right: self.right.clone(),
            host: self.host.clone(),
            port: self.port,
            log_file: self.log_file.clone(),
            static_dir: self.static_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = AppConfig::read(&cli.config)?;
    let config_found = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    config.apply_overrides(cli.overrides());

    let filter = logging::level_filter(cli.trace, cli.verbose, cli.quiet);
    logging::init(filter, log_file(&cli.command, &config))?;

    if !config_found {
        debug!("Config file not found at {:?}, using defaults", cli.config);
    }

    match cli.command {
        None | Some(Commands::Serve) => run_serve(config).await,
        Some(Commands::Scan { format }) => run_scan(config, &format),
        Some(Commands::Config { action }) => run_config_command(config, action),
    }
}

/// Only the server writes (and truncates) the log file
fn log_file<'a>(command: &Option<Commands>, config: &'a AppConfig) -> Option<&'a Path> {
    match command {
        None | Some(Commands::Serve) => Some(Path::new(&config.logging.file)),
        _ => None,
    }
}

/// Build the catalog once, then serve until shutdown
async fn run_serve(config: AppConfig) -> Result<()> {
    config.validate()?;

    info!("Input directories: {:?}", config.input_paths);
    info!("Output directory: {}", config.output_path);
    info!("Left buckets: {:?}", config.buckets.left);
    info!("Right buckets: {:?}", config.buckets.right);

    let registry = BucketRegistry::new(
        config.buckets.left.iter().cloned(),
        config.buckets.right.iter().cloned(),
    )?;

    let catalog = build_catalog(&config.input_paths);
    info!("Catalogued {} images", catalog.len());
    if catalog.is_empty() {
        warn!("No images found in {:?}", config.input_paths);
    }

    let sorter = Sorter::new(catalog, registry, &config.output_path)?;
    info!("Bucket root resolved to {:?}", sorter.output_root());
    if config.prepare_bucket_dirs {
        sorter.prepare_output()?;
    }

    let state = AppState::new(sorter, config)?;
    web::start_server(state).await?;

    info!("bucketsort stopped.");
    Ok(())
}

/// Print what a scan finds
fn run_scan(config: AppConfig, format: &str) -> Result<()> {
    if config.input_paths.is_empty() {
        return Err(bucketsort::SortError::Config(
            "at least one input directory is required".to_string(),
        ));
    }

    let catalog = build_catalog(&config.input_paths);

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&catalog.records)?);
        }
        _ => {
            for record in &catalog.records {
                println!("{}  {}", record.id, record.original_path.display());
            }
            println!("\nFound {} images", catalog.len());
        }
    }

    Ok(())
}

/// Run config commands
fn run_config_command(config: AppConfig, action: ConfigCommands) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigCommands::Generate { to } => {
            AppConfig::default().save(&to)?;
            println!("Generated config at {:?}", to);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["bucketsort"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_repeatable_buckets() {
        let cli = Cli::try_parse_from([
            "bucketsort", "--input", "/in", "--output", "/out",
            "--left", "keep", "--left", "maybe", "--right", "toss",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.input, vec![PathBuf::from("/in")]);
        assert_eq!(overrides.output, Some(PathBuf::from("/out")));
        assert_eq!(overrides.left, vec!["keep", "maybe"]);
        assert_eq!(overrides.right, vec!["toss"]);
    }

    #[test]
    fn test_cli_scan_command() {
        let cli = Cli::try_parse_from(["bucketsort", "scan", "--format", "json", "-i", "/pics"]).unwrap();

        match cli.command {
            Some(Commands::Scan { format }) => assert_eq!(format, "json"),
            _ => panic!("Expected Scan command"),
        }
        assert_eq!(cli.input, vec![PathBuf::from("/pics")]);
    }

    #[test]
    fn test_only_serve_opens_log_file() {
        let config = AppConfig::default();
        assert_eq!(log_file(&None, &config), Some(Path::new("server.log")));
        assert_eq!(log_file(&Some(Commands::Serve), &config), Some(Path::new("server.log")));

        let scan = Some(Commands::Scan { format: "text".to_string() });
        assert_eq!(log_file(&scan, &config), None);
        let show = Some(Commands::Config { action: ConfigCommands::Show });
        assert_eq!(log_file(&show, &config), None);
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["bucketsort", "scan", "--format", "xml"]).is_err());
    }
}
