//! md CLI - Markdown service.
//!
//! Provides commands for:
//! - `render`: Render a Markdown file or URL to HTML
//! - `parsers`: List parser and extension plugins
//! - `guidelines`: Print the syntax guidelines of a parser

mod commands;
mod error;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use md_config::{CliSettings, Config};
use md_service::Markdown;
use tracing_subscriber::EnvFilter;

use commands::{GuidelinesArgs, ParsersArgs, RenderArgs};
use error::CliError;
use output::Output;

/// md - Markdown service.
#[derive(Parser)]
#[command(name = "md", version, about)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command.
#[derive(Args)]
struct GlobalArgs {
    /// Path to configuration file (default: auto-discover markdown.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Do not read or write the cache.
    #[arg(long, global = true)]
    no_cache: bool,

    /// Base URL for relative remote sources (overrides config).
    #[arg(long, global = true, env = "MD_BASE_URL")]
    base_url: Option<String>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file or URL to HTML.
    Render(RenderArgs),
    /// List parser and extension plugins.
    Parsers(ParsersArgs),
    /// Print the syntax guidelines of a parser as JSON.
    Guidelines(GuidelinesArgs),
}

impl GlobalArgs {
    fn load_config(&self, parser: Option<String>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            parser,
            cache_enabled: self.no_cache.then_some(false),
            base_url: self.base_url.clone(),
            ..Default::default()
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Render(args) => {
            let config = cli.global.load_config(args.parser.clone())?;
            args.execute(&Markdown::from_config(&config))
        }
        Commands::Parsers(args) => {
            let config = cli.global.load_config(None)?;
            args.execute(&Markdown::from_config(&config))
        }
        Commands::Guidelines(args) => {
            let config = cli.global.load_config(None)?;
            args.execute(&Markdown::from_config(&config))
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.global.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
