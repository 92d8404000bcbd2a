//! Link checking over the lazily expanding document graph.

use std::collections::HashSet;
use std::path::Path;

use crate::cache::ResolutionCache;
use crate::config::Config;
use crate::error::Error;
use crate::loader::Loader;
use crate::types::{Finding, LinkOccurrence};

/// Outcome of checking one link occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkOutcome {
    /// The target file exists but lacks the anchor.
    BrokenAnchor,
    /// The target file does not exist.
    BrokenFile,
    /// Exempted by an ignore pattern.
    Ignored,
    /// File and anchor (if any) resolved.
    Resolved,
}

/// Everything a check run found.
#[derive(Debug, Default)]
pub struct Report {
    /// Number of documents in the graph when checking finished.
    pub documents: usize,
    /// Broken files and anchors, in the order they were found.
    pub findings: Vec<Finding>,
    /// Internal link occurrences skipped by ignore patterns.
    pub links_ignored: usize,
    /// Internal link occurrences evaluated.
    pub links_checked: usize,
}

impl Report {
    /// True when nothing is broken.
    pub fn is_success(&self) -> bool {
        return self.findings.is_empty();
    }
}

/// Check every internal link of every cached document.
///
/// The cache is walked by position, so documents discovered while checking
/// are appended and reached by the same loop until no new targets appear.
///
/// # Errors
///
/// Returns `Error::ReadFailed` or `Error::ParseFailed` if a newly discovered
/// document cannot be loaded. Broken links are findings, not errors.
pub fn check(loader: &Loader, config: &Config, cache: &mut ResolutionCache) -> Result<Report, Error> {
    let mut report = Report::default();
    let mut reported_files: HashSet<String> = HashSet::new();
    let mut position = 0_usize;

    while let Some(record) = cache.record_at(position) {
        let source = record.source_path.clone();
        let links = record.internal_links.clone();

        for link in &links {
            let finding = match check_link(link, loader, config, cache)? {
                LinkOutcome::BrokenAnchor => Finding::BrokenAnchor {
                    file: source.clone(),
                    link: link.original.clone(),
                },
                LinkOutcome::BrokenFile => Finding::BrokenFile {
                    file: source.clone(),
                    link: link.target.to_string(),
                },
                LinkOutcome::Ignored => {
                    report.links_ignored = report.links_ignored.saturating_add(1);
                    continue;
                },
                LinkOutcome::Resolved => {
                    report.links_checked = report.links_checked.saturating_add(1);
                    continue;
                },
            };
            report.links_checked = report.links_checked.saturating_add(1);

            if matches!(finding, Finding::BrokenFile { .. }) && !reported_files.insert(finding.to_string()) {
                continue;
            }
            report.findings.push(finding);
        }

        position = position.saturating_add(1);
    }

    report.documents = cache.len();
    return Ok(report);
}

/// Evaluate one occurrence, loading its target document on first sight.
///
/// # Errors
///
/// Returns loader errors for an existing target that cannot be read or rendered.
fn check_link(
    link: &LinkOccurrence,
    loader: &Loader,
    config: &Config,
    cache: &mut ResolutionCache,
) -> Result<LinkOutcome, Error> {
    if config.is_ignored(&link.original) {
        return Ok(LinkOutcome::Ignored);
    }

    let file = link.target.file.as_path();
    if !cache.contains(file) {
        if !file.exists() {
            return Ok(LinkOutcome::BrokenFile);
        }
        if loader.load(file, cache)? {
            tracing::debug!(path = %file.display(), "expanded graph to linked document");
        }
    }

    if let Some(anchor) = &link.target.anchor
        && !declares(cache, file, anchor)
    {
        return Ok(LinkOutcome::BrokenAnchor);
    }
    return Ok(LinkOutcome::Resolved);
}

/// Whether the document at `file` declares `anchor`. Non-documents declare nothing.
fn declares(cache: &ResolutionCache, file: &Path, anchor: &str) -> bool {
    return cache
        .get(file)
        .is_some_and(|record| return record.identifiers.contains(anchor));
}
