/// Document kind and tree-sitter grammar resolution by file extension.
use std::path::Path;

use tree_sitter::Language;

/// Markup dialects that are scanned for links and identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// Plain CommonMark/GFM (`.md`, `.markdown`).
    Markdown,
    /// Markdown with JSX and `{…}` expressions (`.mdx`).
    Mdx,
}

/// Map a file extension to its document kind.
/// Returns `None` for files that are link targets only.
pub fn document_kind_for_path(path: &Path) -> Option<DocumentKind> {
    let ext = path.extension().and_then(|e| return e.to_str()).unwrap_or("");

    return match ext {
        "md" | "markdown" => Some(DocumentKind::Markdown),
        "mdx" => Some(DocumentKind::Mdx),
        _ => None,
    };
}

/// Block-level markdown grammar: sections, headings, code blocks, paragraphs.
pub fn block_language() -> Language {
    return tree_sitter_md::LANGUAGE.into();
}

/// Inline markdown grammar: links, images, code spans, inline HTML.
pub fn inline_language() -> Language {
    return tree_sitter_md::INLINE_LANGUAGE.into();
}
