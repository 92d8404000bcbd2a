/// Core domain types for doclinks documents, links, and findings.
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Everything extracted from one scanned document.
/// Created once by the loader and never mutated after population.
#[derive(Debug, Clone)]
pub struct DocumentRecord {
    /// Lexically normalized absolute path. The cache key.
    pub absolute_path: PathBuf,
    /// External URLs found in the document. Collected, never validated.
    pub external_links: Vec<String>,
    /// Heading slugs and explicit `id`/`name` values declared in the document.
    pub identifiers: BTreeSet<String>,
    /// Every internal link occurrence, in discovery order, duplicates kept.
    pub internal_links: Vec<LinkOccurrence>,
    /// Path as given by the directory walk or by the link that discovered it.
    pub source_path: PathBuf,
}

impl DocumentRecord {
    /// An empty record for a document about to be populated.
    pub const fn new(source_path: PathBuf, absolute_path: PathBuf) -> Self {
        return Self {
            absolute_path,
            external_links: Vec::new(),
            identifiers: BTreeSet::new(),
            internal_links: Vec::new(),
            source_path,
        };
    }
}

/// A problem found while checking links. Accumulated, never thrown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    /// The target file exists but does not declare the anchor.
    BrokenAnchor {
        /// Document containing the link.
        file: PathBuf,
        /// The link exactly as written.
        link: String,
    },
    /// The target file does not exist.
    BrokenFile {
        /// Document containing the link.
        file: PathBuf,
        /// The resolved absolute target, including any fragment.
        link: String,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            Self::BrokenAnchor { file, link } => {
                write!(f, "Anchor of link is broken: '{link}' in file {}", file.display())
            },
            Self::BrokenFile { file, link } => {
                write!(f, "Link is broken: '{link}' in file {}", file.display())
            },
        };
    }
}

/// Classification of a raw link string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    /// `http://` or `https://` URL. Never checked.
    External,
    /// Another scheme (`mailto:`, `javascript:`) or an empty value. Dropped.
    Ignored,
    /// A local target that must exist.
    Internal(LinkTarget),
}

/// One internal link as found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOccurrence {
    /// The link exactly as written.
    pub original: String,
    /// Where the link points after normalization.
    pub target: LinkTarget,
}

/// Absolute local target of an internal link.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkTarget {
    /// Fragment after `#`, if any.
    pub anchor: Option<String>,
    /// Absolute, lexically normalized file path.
    pub file: PathBuf,
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match &self.anchor {
            Some(anchor) => write!(f, "{}#{anchor}", self.file.display()),
            None => write!(f, "{}", self.file.display()),
        };
    }
}
