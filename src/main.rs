mod cache;
mod checker;
mod commands;
mod config;
mod diagnostics;
mod error;
mod extract;
mod grammar;
mod loader;
mod normalize;
mod render;
mod scanner;
mod types;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::OutputFormat;

/// Usage examples shown after `--help`.
const EXAMPLES: &str = "\
Examples:
  doclinks                         check the current directory
  doclinks docs                    check docs/, resolve /links against .
  doclinks docs docs               resolve /guide/intro to docs/guide/intro.md
  doclinks . . '/api/**'           skip links matching the glob
  RUST_LOG=debug doclinks docs     trace every loaded document";

/// Command-line arguments. Positionals keep their order through `index`.
#[derive(Parser)]
#[command(
    name = "doclinks",
    version,
    about = "Check that local links and anchors in markdown and MDX documents resolve",
    after_help = EXAMPLES
)]
struct Cli {
    /// Root that `/`-prefixed links resolve against
    #[arg(index = 2, default_value = ".")]
    basepath: PathBuf,
    /// Directory to scan for documents
    #[arg(index = 1, default_value = ".")]
    dir: PathBuf,
    /// Output format for findings
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Glob; links matching it are not checked
    #[arg(index = 3)]
    ignore_pattern: Option<String>,
}

/// Initialize logging, run the check, and map the outcome to an exit code.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| return EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    return match commands::check(&cli.dir, &cli.basepath, cli.ignore_pattern.as_deref(), cli.format) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}
