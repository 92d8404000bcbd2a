//! Pattern-based extraction of identifiers and links from document text.
//!
//! Two dialects are recognized: markup attributes (`href="…"`) and JSON keys
//! (`"href": "…"`). Both run over the raw source and over the rendered form.

use regex::{Captures, Regex};

use crate::error::Error;

/// Compiled patterns for one attribute dialect.
struct Dialect {
    /// Matches `id`/`name` declarations; the value is in the first matching group.
    identifiers: Regex,
    /// Matches `href`/`to`/`src` links; the value is in the first matching group.
    links: Regex,
}

/// All extraction patterns, compiled once per run.
pub struct ExtractionPatterns {
    /// `id="…"` / `href='…'` style.
    attribute: Dialect,
    /// `"id": "…"` / `"href": "…"` style.
    json_key: Dialect,
}

/// Identifier and link values found in one text blob, in source order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Extracted {
    /// Declared identifier values.
    pub identifiers: Vec<String>,
    /// Raw link values, not yet normalized.
    pub links: Vec<String>,
}

impl ExtractionPatterns {
    /// Compile the attribute and JSON-key dialects.
    ///
    /// # Errors
    ///
    /// Returns `Error::Pattern` if a pattern fails to compile.
    pub fn new() -> Result<Self, Error> {
        return Ok(Self {
            attribute: Dialect {
                identifiers: Regex::new(r#"(?:^|\s)(?:id|name)=(?:"([^"]*)"|'([^']*)')"#)?,
                links: Regex::new(r#"(?:^|\s)(?:href|to|src)=(?:"([^"]*)"|'([^']*)')"#)?,
            },
            json_key: Dialect {
                identifiers: Regex::new(r#""(?:id|name)"\s*:\s*"([^"]*)""#)?,
                links: Regex::new(r#""(?:href|to|src)"\s*:\s*"([^"]*)""#)?,
            },
        });
    }

    /// Run both dialects over `text`. Attribute-style matches come first.
    pub fn extract(&self, text: &str) -> Extracted {
        let mut found = Extracted::default();
        for dialect in [&self.attribute, &self.json_key] {
            found.identifiers.extend(captured_values(&dialect.identifiers, text));
            found.links.extend(captured_values(&dialect.links, text));
        }
        return found;
    }
}

/// Values of the first participating capture group of every match.
fn captured_values<'t>(pattern: &'t Regex, text: &'t str) -> impl Iterator<Item = String> + 't {
    return pattern
        .captures_iter(text)
        .filter_map(|cap| return first_group(&cap).map(str::to_string));
}

/// The first capture group that participated in the match.
fn first_group<'t>(cap: &Captures<'t>) -> Option<&'t str> {
    return cap.iter().skip(1).flatten().next().map(|m| return m.as_str());
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    fn patterns() -> ExtractionPatterns {
        ExtractionPatterns::new().unwrap()
    }

    #[test]
    fn attribute_style_links_and_ids() {
        let found = patterns().extract(r#"<a href="./a.md" id="top">x</a> <img src='b.png'/> <Link to="/c">"#);
        assert_eq!(found.links, vec!["./a.md", "b.png", "/c"]);
        assert_eq!(found.identifiers, vec!["top"]);
    }

    #[test]
    fn json_key_style_links_and_ids() {
        let found = patterns().extract(r##"{"href": "/guide", "name":"anchor", "to" : "#x"}"##);
        assert_eq!(found.links, vec!["/guide", "#x"]);
        assert_eq!(found.identifiers, vec!["anchor"]);
    }

    #[test]
    fn prefixed_attributes_are_not_matched() {
        let found = patterns().extract(r#"<div data-id="nope" data-href="nope" xhref="nope">"#);
        assert_eq!(found, Extracted::default());
    }

    #[test]
    fn any_whitespace_separates_attributes() {
        let found = patterns().extract("<a\thref=\"./tab.md\"\n   id=\"next-line\"\r\nname='crlf'>");
        assert_eq!(found.links, vec!["./tab.md"]);
        assert_eq!(found.identifiers, vec!["next-line", "crlf"]);
    }

    #[test]
    fn attribute_names_ending_in_link_names_are_not_links() {
        let found = patterns().extract(r#"<Step goto="nope" photo="nope" filename="nope">"#);
        assert_eq!(found, Extracted::default());
    }

    #[test]
    fn attribute_at_start_of_text() {
        let found = patterns().extract(r#"id="first" rest"#);
        assert_eq!(found.identifiers, vec!["first"]);
    }

    #[test]
    fn empty_values_are_reported() {
        let found = patterns().extract(r#"<a href="">"#);
        assert_eq!(found.links, vec![String::new()]);
    }
}
