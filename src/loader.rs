//! Document loader: read, strip, render, extract, and insert into the cache.

use std::path::{Path, PathBuf};

use crate::cache::ResolutionCache;
use crate::error::Error;
use crate::extract::ExtractionPatterns;
use crate::grammar;
use crate::normalize::{self, LinkContext};
use crate::render::Renderer;
use crate::types::{DocumentRecord, LinkKind, LinkOccurrence};

/// Turns document files into cache records. Holds everything that stays the
/// same for a whole run: compiled patterns and the path context.
pub struct Loader {
    /// Root for `/`-prefixed links, as given on the command line.
    base: PathBuf,
    /// Absolute working directory captured at startup.
    cwd: PathBuf,
    /// Extension appended to extensionless links.
    extension: String,
    /// Identifier and link patterns.
    patterns: ExtractionPatterns,
    /// Verbatim stripping and structural rendering.
    renderer: Renderer,
}

impl Loader {
    /// Compile patterns and fix the path context for this run.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a pattern fails to compile.
    pub fn new(base: PathBuf, cwd: PathBuf, extension: &str) -> Result<Self, Error> {
        return Ok(Self {
            base,
            cwd,
            extension: extension.to_string(),
            patterns: ExtractionPatterns::new()?,
            renderer: Renderer::new()?,
        });
    }

    /// Absolute, normalized form of `path` as used for cache keys.
    pub fn absolute(&self, path: &Path) -> PathBuf {
        return normalize::absolutize(&self.cwd, path);
    }

    /// Load `path` into the cache unless it is not a document or is already
    /// present. Returns whether a new record was added.
    ///
    /// # Errors
    ///
    /// Returns `Error::ReadFailed` if the document cannot be read as UTF-8,
    /// or `Error::ParseFailed` if it cannot be rendered.
    pub fn load(&self, path: &Path, cache: &mut ResolutionCache) -> Result<bool, Error> {
        let Some(kind) = grammar::document_kind_for_path(path) else {
            return Ok(false);
        };
        let absolute_path = self.absolute(path);
        if cache.contains(&absolute_path) {
            return Ok(false);
        }

        let source = std::fs::read_to_string(path).map_err(|source| {
            return Error::ReadFailed {
                file: path.to_path_buf(),
                source,
            };
        })?;
        let without_fences = self.renderer.strip_fenced_blocks(&source);
        let raw = self.renderer.strip_code_spans(&without_fences);
        let rendered = self.renderer.render(path, &without_fences, kind)?;

        let mut record = DocumentRecord::new(path.to_path_buf(), absolute_path);
        self.extract_into(&raw, &mut record);
        self.extract_into(&rendered, &mut record);

        tracing::debug!(
            path = %record.source_path.display(),
            identifiers = record.identifiers.len(),
            internal_links = record.internal_links.len(),
            external_links = record.external_links.len(),
            "loaded document"
        );
        return Ok(cache.insert(record));
    }

    /// Merge identifiers and classified links found in `text` into `record`.
    fn extract_into(&self, text: &str, record: &mut DocumentRecord) {
        let found = self.patterns.extract(text);
        record.identifiers.extend(found.identifiers);

        let ctx = LinkContext {
            base: &self.base,
            cwd: &self.cwd,
            extension: &self.extension,
            source: &record.source_path,
        };
        for original in found.links {
            match normalize::classify(&original, &ctx) {
                LinkKind::External => record.external_links.push(original),
                LinkKind::Ignored => {},
                LinkKind::Internal(target) => {
                    record.internal_links.push(LinkOccurrence { original, target });
                },
            }
        }
    }
}
