//! rfhub-static CLI
//!
//! Builds a static, searchable keyword documentation site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use rfhub_static::cmd::build::{self, BuildOptions};

/// Command-line interface for rfhub-static.
#[derive(Parser)]
#[command(
    name = "rfhub-static",
    version,
    about = "Generate a static keyword documentation site"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Interpreter hosting the documentation generator
    #[arg(long)]
    python: Option<String>,

    /// Do not document built-in or installed libraries
    #[arg(long)]
    no_libraries: bool,

    /// Output directory (deleted and recreated)
    output: PathBuf,

    /// Resources directory, then an optional page objects directory
    #[arg(required = true, num_args = 1..=2, value_name = "INPUT_DIR")]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    rfhub_static::init_tracing(cli.verbose);

    build::run(&BuildOptions {
        config_path: cli.config.as_deref(),
        output: &cli.output,
        inputs: &cli.inputs,
        python: cli.python.as_deref(),
        no_libraries: cli.no_libraries,
    })?;

    Ok(())
}
