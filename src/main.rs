//! Volume Shorthand CLI
//!
//! Converts a pod's volumes between the compact shorthand and the
//! platform volume list.
//!
//! ```text
//! volume-shorthand to-platform volumes.yaml      {name: shorthand} -> [Volume]
//! volume-shorthand from-platform volumes.json    [Volume] -> {name: shorthand}
//! ```
//!
//! Input is read from a file, or from stdin when the path is `-`, and may be
//! YAML or JSON.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use volume_shorthand::config::parse_document;
use volume_shorthand::{ConversionConfig, OutputFormat};

// =============================================================================
// CLI Arguments
// =============================================================================

/// Volume Shorthand - Convert volume sources between shorthand and platform form
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (YAML or JSON); flags override its values
    #[arg(long, env = "VOLUME_CONFIG")]
    config: Option<PathBuf>,

    /// Platform API version
    #[arg(long, env = "VOLUME_API_VERSION")]
    api_version: Option<String>,

    /// Output format
    #[arg(long, env = "VOLUME_OUTPUT", value_enum)]
    output: Option<OutputFormat>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a {name: shorthand} map into a platform volume list
    ToPlatform {
        /// Input file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },
    /// Convert a platform volume list into a {name: shorthand} map
    FromPlatform {
        /// Input file, or `-` for stdin
        #[arg(default_value = "-")]
        input: PathBuf,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(&args);

    let config = build_config(&args)?;
    info!("Starting {} {}", volume_shorthand::NAME, volume_shorthand::VERSION);
    info!("  API version: {}", config.api_version()?);
    info!("  Output: {}", config.output);

    let output = match &args.command {
        Command::ToPlatform { input } => {
            let document = read_document(input)?;
            config
                .to_platform(&document)
                .with_context(|| format!("converting {} to platform volumes", input.display()))?
        }
        Command::FromPlatform { input } => {
            let document = read_document(input)?;
            config
                .from_platform(&document)
                .with_context(|| format!("converting {} to shorthand", input.display()))?
        }
    };

    let rendered = config.render(&output)?;
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}

// =============================================================================
// Configuration
// =============================================================================

fn build_config(args: &Args) -> anyhow::Result<ConversionConfig> {
    let mut config = match &args.config {
        Some(path) => ConversionConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ConversionConfig::default(),
    };

    if let Some(version) = &args.api_version {
        config.api_version = version.clone();
    }
    if let Some(output) = args.output {
        config.output = output;
    }

    config.api_version()?;
    Ok(config)
}

fn read_document(input: &Path) -> anyhow::Result<serde_json::Value> {
    let text = if input == Path::new("-") {
        debug!("Reading input from stdin");
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading stdin")?;
        text
    } else {
        debug!("Reading input from {}", input.display());
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?
    };

    parse_document(&text).with_context(|| format!("parsing {}", input.display()))
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // logs go to stderr so stdout stays a clean document
    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
