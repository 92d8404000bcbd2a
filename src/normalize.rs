//! Link normalization: raw link string to external, ignored, or absolute local target.

use std::path::{Component, Path, PathBuf};

use crate::types::{LinkKind, LinkTarget};

/// Everything the normalizer needs to know about where a link was written.
#[derive(Debug, Clone, Copy)]
pub struct LinkContext<'a> {
    /// Root that `/`-prefixed links are resolved against.
    pub base: &'a Path,
    /// Absolute working directory used to anchor relative paths.
    pub cwd: &'a Path,
    /// Extension appended to extensionless and directory links, without the dot.
    pub extension: &'a str,
    /// Document that contains the link.
    pub source: &'a Path,
}

/// Classify a raw link and, for local links, resolve it to an absolute target.
///
/// Never fails and never touches the filesystem: a malformed link simply
/// resolves to a path that won't exist.
pub fn classify(raw: &str, ctx: &LinkContext<'_>) -> LinkKind {
    if raw.is_empty() {
        return LinkKind::Ignored;
    }
    if raw.starts_with("http://") || raw.starts_with("https://") || raw.starts_with("//") {
        return LinkKind::External;
    }
    if has_scheme(raw) {
        return LinkKind::Ignored;
    }

    if let Some(fragment) = raw.strip_prefix('#') {
        return LinkKind::Internal(LinkTarget {
            anchor: non_empty(fragment),
            file: absolutize(ctx.cwd, ctx.source),
        });
    }

    let (path, fragment) = match raw.split_once('#') {
        Some((path, fragment)) => (path, non_empty(fragment)),
        None => (raw, None),
    };
    let path = with_document_suffix(path, ctx.extension);

    let joined = match path.strip_prefix('/') {
        Some(rooted) => ctx.base.join(rooted),
        None => ctx.source.parent().unwrap_or(Path::new("")).join(&path),
    };

    return LinkKind::Internal(LinkTarget {
        anchor: fragment,
        file: absolutize(ctx.cwd, &joined),
    });
}

/// Anchor `path` at `cwd` when relative, then collapse `.` and `..`.
pub fn absolutize(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    return normalize_path(&cwd.join(path));
}

/// Whether the link starts with a URI scheme such as `mailto:`.
fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    return chars.next().is_some_and(|c| return c.is_ascii_alphabetic())
        && chars.all(|c| return c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
}

/// `None` for an empty fragment, which points at the top of the page.
fn non_empty(fragment: &str) -> Option<String> {
    if fragment.is_empty() {
        return None;
    }
    return Some(fragment.to_string());
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// `..` directly under the root is dropped; on a relative path with nothing
/// left to pop it is preserved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        push_normalized_component(&mut components, component);
    }
    return components.iter().collect();
}

/// Handle a single path component during normalization.
fn push_normalized_component<'a>(components: &mut Vec<Component<'a>>, component: Component<'a>) {
    match component {
        Component::CurDir => {},
        Component::ParentDir => match components.last() {
            Some(Component::Normal(_)) => {
                components.pop();
            },
            Some(Component::RootDir | Component::Prefix(_)) => {},
            _ => components.push(component),
        },
        other => components.push(other),
    }
}

/// Point directory links at their index document and give extensionless
/// links the default document extension.
fn with_document_suffix(path: &str, extension: &str) -> String {
    if path.ends_with('/') {
        return format!("{path}index.{extension}");
    }
    let last = path.rsplit('/').next().unwrap_or(path);
    if last == "." || last == ".." {
        return format!("{path}/index.{extension}");
    }
    if Path::new(last).extension().is_some() {
        return path.to_string();
    }
    return format!("{path}.{extension}");
}
