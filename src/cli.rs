//! Command-line interface for perfume.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::config::ScanConfig;
use crate::detect::{Engine, EngineConfig};
use crate::registry::{Registry, RegistryConfig};
use crate::report::{self, OutputConfig};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Static detector of code perfumes in Java sources.
///
/// Perfume scans Java source trees for well-engineered patterns: paired
/// equals/hashCode, copy constructors, singletons, try-with-resources,
/// defensive null checks and more. Each finding names the rule, the file,
/// the enclosing type and the matched source range.
#[derive(Parser)]
#[command(name = "perfume")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log progress to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan a file or directory for perfumes
    Scan(ScanArgs),
    /// List the loaded rules
    Rules(RulesArgs),
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Path to scan (file or directory)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover in the scanned directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Locale for rule descriptions (overrides the config)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Write JSON batches and a summary to this directory instead of stdout
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Skip symbol resolution and rely on syntactic checks only
    #[arg(long)]
    pub no_resolve: bool,
}

/// Arguments for the rules command.
#[derive(Parser)]
pub struct RulesArgs {
    /// Path to config YAML file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Locale for rule descriptions
    #[arg(short, long)]
    pub locale: Option<String>,
}

/// Install the stderr log subscriber.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("perfume=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load the explicit config, or discover one next to `dir`.
fn load_config(explicit: Option<&PathBuf>, dir: Option<&Path>) -> anyhow::Result<ScanConfig> {
    let path = match explicit {
        Some(p) => Some(p.clone()),
        None => dir.and_then(ScanConfig::discover),
    };
    let config = match path {
        Some(p) => {
            tracing::debug!(config = %p.display(), "using config");
            ScanConfig::parse_file(&p)?
        }
        None => ScanConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn load_registry(config: &ScanConfig, locale: &str) -> anyhow::Result<Registry> {
    let mut registry = Registry::new(RegistryConfig::from_scan(config)?);
    registry.load_registry(locale)?;
    Ok(registry)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    let search_dir = if args.path.is_dir() {
        Some(args.path.as_path())
    } else {
        args.path.parent()
    };
    let mut config = load_config(args.config.as_ref(), search_dir)?;
    if args.no_resolve {
        config.resolve_symbols = false;
    }
    let locale = args.locale.clone().unwrap_or_else(|| config.locale.clone());

    let registry = Arc::new(load_registry(&config, &locale)?);
    let engine = Engine::new(registry, EngineConfig::from(&config));

    if let Some(dir) = &args.output_dir {
        let summary = engine.detect_and_serialize(&args.path, &OutputConfig::new(dir))?;
        println!(
            "Wrote {} findings from {} files to {}",
            summary.total_findings,
            summary.files_scanned,
            dir.display()
        );
        return Ok(EXIT_SUCCESS);
    }

    let result = engine.scan(&args.path)?;
    match args.format.as_str() {
        "json" => report::write_json(&args.path, &result)?,
        _ => report::write_pretty(&args.path, &result),
    }
    Ok(EXIT_SUCCESS)
}

/// Run the rules command.
pub fn run_rules(args: &RulesArgs) -> anyhow::Result<i32> {
    let config = load_config(args.config.as_ref(), None)?;
    let locale = args.locale.clone().unwrap_or_else(|| config.locale.clone());
    let registry = load_registry(&config, &locale)?;

    println!("Loaded rules ({}):", registry.len());
    println!();
    for d in registry.registered_detectables() {
        println!("  {:<34} {}", d.name, d.detector);
        println!("      {}", d.description);
    }
    Ok(EXIT_SUCCESS)
}
