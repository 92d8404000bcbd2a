//! The check command: walk, load, check, report.

use std::path::Path;
use std::process::ExitCode;

use crate::cache::ResolutionCache;
use crate::checker;
use crate::config::Config;
use crate::diagnostics;
use crate::error;
use crate::loader::Loader;
use crate::scanner;

/// How findings are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array on stdout.
    Json,
    /// One line per finding on stderr.
    Text,
}

/// Scan `dir`, check every local link and anchor, and report findings.
/// Exit code is success only when nothing is broken.
///
/// # Errors
///
/// Returns errors from config loading, the directory walk, or a document
/// that cannot be read or rendered. Broken links are not errors.
pub fn check(
    dir: &Path,
    base: &Path,
    ignore: Option<&str>,
    format: OutputFormat,
) -> Result<ExitCode, error::Error> {
    let config = Config::load(dir, ignore)?;
    let files = scanner::scan(dir, &config)?;
    let cwd = std::env::current_dir()?;
    let loader = Loader::new(base.to_path_buf(), cwd, config.extension())?;

    let mut cache = ResolutionCache::default();
    for file in &files {
        loader.load(file, &mut cache)?;
    }
    let scanned = cache.len();
    if cache.is_empty() {
        tracing::warn!(dir = %dir.display(), "no markdown or MDX documents found");
    }

    let report = checker::check(&loader, &config, &mut cache)?;
    tracing::info!(
        scanned,
        documents = report.documents,
        checked = report.links_checked,
        ignored = report.links_ignored,
        broken = report.findings.len(),
        "check complete"
    );

    match format {
        OutputFormat::Json => println!("{}", diagnostics::render_json(&report.findings)?),
        OutputFormat::Text => diagnostics::print_findings(&report.findings),
    }

    if report.is_success() {
        return Ok(ExitCode::SUCCESS);
    }
    return Ok(ExitCode::FAILURE);
}
