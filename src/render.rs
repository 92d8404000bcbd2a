//! Verbatim stripping and structural rendering of markdown documents.
//!
//! The rendered form is HTML-like text: headings carry slug `id`s, inline
//! and reference links become `href` attributes, images become `src`
//! attributes, raw HTML and JSX are carried through, and code is dropped. It exists only to be scanned by the
//! extraction patterns.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;
use std::ops::Range;
use std::path::Path;

use regex::Regex;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;
use crate::grammar::{self, DocumentKind};

/// Compiled patterns used while stripping and rendering.
pub struct Renderer {
    /// Inline code spans on a single line.
    code_span: Regex,
    /// Backtick or tilde fenced blocks, up to the next fence or end of text.
    fenced_block: Regex,
}

impl Renderer {
    /// Compile the stripping patterns.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a pattern fails to compile.
    pub fn new() -> Result<Self, Error> {
        return Ok(Self {
            code_span: Regex::new(r"`[^`\n]*`")?,
            fenced_block: Regex::new(r"(?s)```.*?(?:```|\z)|~~~.*?(?:~~~|\z)")?,
        });
    }

    /// Remove fenced code blocks so their content never yields matches.
    pub fn strip_fenced_blocks(&self, text: &str) -> String {
        return self.fenced_block.replace_all(text, "").into_owned();
    }

    /// Remove inline code spans.
    pub fn strip_code_spans(&self, text: &str) -> String {
        return self.code_span.replace_all(text, "").into_owned();
    }

    /// Render `source` into its structural form.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the grammar cannot parse the document,
    /// the tree contains syntax errors, or an MDX expression is unbalanced.
    pub fn render(&self, file: &Path, source: &str, kind: DocumentKind) -> Result<String, Error> {
        if kind == DocumentKind::Mdx {
            check_expressions_balanced(file, &self.strip_code_spans(source))?;
        }

        let tree = parse_source(file, source, &grammar::block_language())?;
        if let Some(node) = first_error_node(tree.root_node()) {
            let line = node.start_position().row.saturating_add(1);
            return Err(Error::ParseFailed {
                file: file.to_path_buf(),
                reason: format!("syntax error at line {line}"),
            });
        }

        let mut definitions = HashMap::new();
        collect_definitions(tree.root_node(), source, &mut definitions);

        let mut state = RenderState {
            definitions,
            file,
            inline: new_parser(file, &grammar::inline_language())?,
            out: String::new(),
            slugger: Slugger::default(),
            source,
        };
        state.block(tree.root_node())?;
        return Ok(state.out);
    }
}

/// Mutable state for rendering one document.
struct RenderState<'r> {
    /// Reference definitions by normalized label.
    definitions: HashMap<String, String>,
    /// Document being rendered, for error messages.
    file: &'r Path,
    /// Parser for the inline grammar, reused across inline nodes.
    inline: Parser,
    /// Rendered output.
    out: String,
    /// Heading slugs assigned so far.
    slugger: Slugger,
    /// Full document text the block tree was parsed from.
    source: &'r str,
}

impl<'r> RenderState<'r> {
    /// Render a block-level node and its descendants.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if an inline region cannot be parsed.
    fn block(&mut self, node: Node<'_>) -> Result<(), Error> {
        match node.kind() {
            "fenced_code_block" | "indented_code_block" | "link_reference_definition" => {},
            "atx_heading" | "setext_heading" => self.heading(node)?,
            "html_block" => {
                let html = self.text(node);
                self.out.push_str(html);
                self.out.push('\n');
            },
            "inline" => {
                let text = self.text(node);
                self.inline(text)?;
            },
            "pipe_table_cell" if node.named_child_count() == 0 => {
                let text = self.text(node);
                self.inline(text)?;
            },
            _ => {
                let mut cursor = node.walk();
                for child in node.children(&mut cursor) {
                    self.block(child)?;
                }
            },
        }
        return Ok(());
    }

    /// Render a heading as `<hN id="slug">…</hN>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the heading's inline content cannot be parsed.
    fn heading(&mut self, node: Node<'_>) -> Result<(), Error> {
        let level = heading_level(node);
        let content = heading_content(node).map_or("", |n| return self.text(n)).trim();
        let (text, custom_id) = split_custom_id(content);
        let tree = self.parse_inline(text)?;

        let slug = match custom_id {
            Some(id) => self.slugger.claim(id),
            None => self.slugger.slug(&plain_text(tree.root_node(), text)),
        };

        if slug.is_empty() {
            let _ = write!(self.out, "<h{level}>");
        } else {
            let _ = write!(self.out, "<h{level} id=\"{slug}\">");
        }
        self.inline_node(tree.root_node(), text);
        let _ = writeln!(self.out, "</h{level}>");
        return Ok(());
    }

    /// Parse and render a run of inline markdown.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the inline grammar returns no tree.
    fn inline(&mut self, text: &str) -> Result<(), Error> {
        let tree = self.parse_inline(text)?;
        self.inline_node(tree.root_node(), text);
        return Ok(());
    }

    /// Parse a run of inline markdown with the shared inline parser.
    ///
    /// # Errors
    ///
    /// Returns `Error::ParseFailed` if the inline grammar returns no tree.
    fn parse_inline(&mut self, text: &str) -> Result<Tree, Error> {
        return self.inline.parse(text, None).ok_or_else(|| {
            return Error::ParseFailed {
                file: self.file.to_path_buf(),
                reason: "inline grammar returned None".to_string(),
            };
        });
    }

    /// Render one inline node. Code spans vanish; links and images become attributes.
    /// Reference links render once per use, with the destination of their definition.
    fn inline_node(&mut self, node: Node<'_>, text: &str) {
        match node.kind() {
            "code_span" => return,
            "html_tag" => {
                self.out.push_str(node.utf8_text(text.as_bytes()).unwrap_or(""));
                self.out.push(' ');
                return;
            },
            "image" => {
                if let Some(dest) = destination(node, text).or_else(|| return self.reference(node, text)) {
                    let _ = write!(self.out, "<img src=\"{dest}\"> ");
                }
                return;
            },
            "inline_link" => {
                if let Some(dest) = destination(node, text) {
                    let _ = write!(self.out, "<a href=\"{dest}\"> ");
                }
            },
            "collapsed_reference_link" | "full_reference_link" | "shortcut_link" => {
                if let Some(dest) = self.reference(node, text) {
                    let _ = write!(self.out, "<a href=\"{dest}\"> ");
                }
            },
            "uri_autolink" => {
                let uri = node.utf8_text(text.as_bytes()).unwrap_or("");
                let uri = uri.trim_start_matches('<').trim_end_matches('>');
                let _ = write!(self.out, "<a href=\"{}\"> ", attribute_value(uri));
                return;
            },
            _ => {},
        }

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.inline_node(child, text);
        }
    }

    /// Destination defined for the label of a reference link or image.
    /// Full references use their label; collapsed and shortcut forms use their text.
    fn reference(&self, node: Node<'_>, text: &str) -> Option<String> {
        let label = child_text(node, "link_label", text)
            .or_else(|| return child_text(node, "link_text", text))
            .or_else(|| return child_text(node, "image_description", text))?;
        return self.definitions.get(&reference_label(label)).cloned();
    }

    /// Source text covered by a block-tree node.
    fn text(&self, node: Node<'_>) -> &'r str {
        return node.utf8_text(self.source.as_bytes()).unwrap_or("");
    }
}

/// GitHub-style heading slugs; repeated headings get `-1`, `-2`, … suffixes.
#[derive(Debug, Default)]
struct Slugger {
    /// Every slug handed out so far.
    seen: HashSet<String>,
}

impl Slugger {
    /// Register an explicit id so later generated slugs avoid it.
    fn claim(&mut self, id: &str) -> String {
        self.seen.insert(id.to_string());
        return id.to_string();
    }

    /// Slug for `text`, unique within this document.
    fn slug(&mut self, text: &str) -> String {
        let base = to_anchor(text);
        let mut candidate = base.clone();
        let mut counter = 0_u32;
        while self.seen.contains(&candidate) {
            counter = counter.saturating_add(1);
            candidate = format!("{base}-{counter}");
        }
        self.seen.insert(candidate.clone());
        return candidate;
    }
}

/// Lowercase, spaces to hyphens, drop everything but letters, digits, `-` and `_`.
fn to_anchor(text: &str) -> String {
    return text
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                return Some(c);
            }
            if c == ' ' {
                return Some('-');
            }
            return None;
        })
        .collect();
}

/// Make a link destination safe to place inside a double-quoted attribute.
fn attribute_value(raw: &str) -> String {
    return raw.trim().replace('"', "%22");
}

/// MDX treats `{` as the start of a JavaScript expression; every one must close.
/// Quoted strings inside an expression or a JSX tag are skipped, so `{'{'}`
/// and `label="}"` do not count.
///
/// # Errors
///
/// Returns `Error::ParseFailed` naming the line of the first unbalanced brace.
fn check_expressions_balanced(file: &Path, text: &str) -> Result<(), Error> {
    let mut open_lines: Vec<usize> = Vec::new();
    // Expression depth at which the current JSX tag opened.
    let mut tag_depth: Option<usize> = None;
    for (index, line) in text.lines().enumerate() {
        let line_number = index.saturating_add(1);
        let mut escaped = false;
        let mut quote: Option<char> = None;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            if escaped {
                escaped = false;
                continue;
            }
            if let Some(open) = quote {
                if c == '\\' {
                    escaped = true;
                } else if c == open {
                    quote = None;
                }
                continue;
            }

            let in_code = !open_lines.is_empty() || tag_depth.is_some();
            match c {
                '\\' => escaped = true,
                '"' | '\'' if in_code => quote = Some(c),
                '<' if tag_depth.is_none() && chars.peek().is_some_and(|next| return next.is_alphabetic() || *next == '/') => {
                    tag_depth = Some(open_lines.len());
                },
                '>' if tag_depth == Some(open_lines.len()) => tag_depth = None,
                '{' => open_lines.push(line_number),
                '}' if open_lines.pop().is_none() => {
                    return Err(Error::ParseFailed {
                        file: file.to_path_buf(),
                        reason: format!("unexpected closing brace at line {line_number}"),
                    });
                },
                _ => {},
            }
        }
    }

    if let Some(line) = open_lines.first() {
        return Err(Error::ParseFailed {
            file: file.to_path_buf(),
            reason: format!("unclosed expression starting at line {line}"),
        });
    }
    return Ok(());
}

/// Text of the first child of `node` with the given kind.
fn child_text<'t>(node: Node<'_>, kind: &str, text: &'t str) -> Option<&'t str> {
    let mut cursor = node.walk();
    let child = node.children(&mut cursor).find(|child| return child.kind() == kind)?;
    return child.utf8_text(text.as_bytes()).ok();
}

/// Byte ranges of inline nodes that show no text to a reader, in document order.
fn collect_hidden(node: Node<'_>, hidden: &mut Vec<Range<usize>>) {
    match node.kind() {
        "code_span_delimiter"
        | "emphasis_delimiter"
        | "entity_reference"
        | "html_tag"
        | "image"
        | "link_destination"
        | "link_label"
        | "link_title"
        | "numeric_character_reference" => {
            hidden.push(node.byte_range());
            return;
        },
        "backslash_escape" => {
            let start = node.start_byte();
            hidden.push(start..start.saturating_add(1));
            return;
        },
        _ => {},
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_hidden(child, hidden);
    }
}

/// Reference definitions under `node`, keyed by normalized label. The first
/// definition of a label wins.
fn collect_definitions(node: Node<'_>, source: &str, definitions: &mut HashMap<String, String>) {
    if node.kind() == "link_reference_definition" {
        if let Some(label) = child_text(node, "link_label", source)
            && let Some(dest) = destination(node, source)
        {
            definitions.entry(reference_label(label)).or_insert(dest);
        }
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_definitions(child, source, definitions);
    }
}

/// Cleaned `link_destination` child of a link, image, or reference definition.
fn destination(node: Node<'_>, text: &str) -> Option<String> {
    let raw = child_text(node, "link_destination", text)?;
    let raw = raw.trim().trim_start_matches('<').trim_end_matches('>');
    return Some(attribute_value(raw));
}

/// Depth-first search for the first `ERROR` or missing node.
fn first_error_node(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
    return children.into_iter().find_map(first_error_node);
}

/// The inline content node of an ATX or setext heading.
fn heading_content(heading: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = heading.walk();
    let children: Vec<Node<'_>> = heading.children(&mut cursor).collect();
    for child in children {
        match child.kind() {
            "heading_content" | "inline" => return Some(child),
            "paragraph" => return heading_content(child),
            _ => {},
        }
    }
    return None;
}

/// Heading level from the ATX marker or setext underline. Defaults to 2.
fn heading_level(heading: Node<'_>) -> u8 {
    let mut cursor = heading.walk();
    for child in heading.children(&mut cursor) {
        let kind = child.kind();
        if kind == "setext_h1_underline" {
            return 1;
        }
        if let Some(level) = kind
            .strip_prefix("atx_h")
            .and_then(|rest| return rest.strip_suffix("_marker"))
            .and_then(|digit| return digit.parse().ok())
        {
            return level;
        }
    }
    return 2;
}

/// Create a parser for `language`.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set.
fn new_parser(file_path: &Path, language: &Language) -> Result<Parser, Error> {
    let mut parser = Parser::new();
    parser.set_language(language).map_err(|e| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: e.to_string(),
        };
    })?;
    return Ok(parser);
}

/// Parse source into a tree-sitter tree.
///
/// # Errors
///
/// Returns `Error::ParseFailed` if the language cannot be set or parsing fails.
fn parse_source(file_path: &Path, source: &str, language: &Language) -> Result<Tree, Error> {
    let mut parser = new_parser(file_path, language)?;
    return parser.parse(source, None).ok_or_else(|| {
        return Error::ParseFailed {
            file: file_path.to_path_buf(),
            reason: "tree-sitter returned None".to_string(),
        };
    });
}

/// Inline markdown as a reader sees it: delimiters, destinations, images and tags dropped.
fn plain_text(root: Node<'_>, text: &str) -> String {
    let mut hidden = Vec::new();
    collect_hidden(root, &mut hidden);

    let mut plain = String::new();
    let mut position = 0;
    for range in hidden {
        if range.start >= position {
            plain.push_str(text.get(position..range.start).unwrap_or(""));
            position = range.end;
        }
    }
    plain.push_str(text.get(position..).unwrap_or(""));
    return plain;
}

/// Label normalized for matching: brackets removed, whitespace collapsed, lowercased.
fn reference_label(raw: &str) -> String {
    let inner = raw.trim().trim_start_matches('[').trim_end_matches(']');
    return inner.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
}

/// Split a trailing `{#custom-id}` off heading text.
fn split_custom_id(text: &str) -> (&str, Option<&str>) {
    if let Some(body) = text.strip_suffix('}')
        && let Some((heading, id)) = body.rsplit_once("{#")
        && !id.is_empty()
        && !id.contains(char::is_whitespace)
    {
        return (heading.trim_end(), Some(id));
    }
    return (text, None);
}
