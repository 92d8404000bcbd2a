use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::types::Finding;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print one line per finding to stderr.
pub fn print_findings(findings: &[Finding]) {
    for finding in findings {
        eprintln!("{finding}");
    }
}

/// Serialize findings as a pretty JSON array.
///
/// # Errors
///
/// Returns `Error::Json` if serialization fails.
pub fn render_json(findings: &[Finding]) -> Result<String, Error> {
    return Ok(serde_json::to_string_pretty(findings)?);
}

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    let md = render_error(e);
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render a fatal error as a structured markdown diagnostic:
/// what happened and, where there is one, how to fix it.
pub fn render_error(e: &Error) -> String {
    return match e {
        Error::DirectoryNotFound { path } => format!("\
# Error: Directory Not Found

`{}` does not exist or is not a directory.
", path.display()),

        Error::InvalidIgnorePattern { pattern, reason } => format!("\
# Error: Invalid Ignore Pattern

`{pattern}` is not a valid glob: {reason}

## Fix

Quote the pattern so the shell does not expand it, and check brackets:

    doclinks docs . '/api/**'
"),

        Error::Io(e) => format!("\
# Error: I/O

{e}
"),

        Error::Json(e) => format!("\
# Error: JSON Output

{e}
"),

        Error::ParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}

Links in this document cannot be trusted, so the run stopped here.

## Fix

Correct the markup, or wrap literal braces and examples in code.
", file.display()),

        Error::Pattern(e) => format!("\
# Error: Pattern

{e}
"),

        Error::ReadFailed { file, source } => format!("\
# Error: Unreadable Document

Could not read `{}`: {source}

## Fix

Documents must be UTF-8 text files. Rename or exclude anything else.
", file.display()),

        Error::TomlDe(e) => format!("\
# Error: Invalid TOML

{e}

## Fix

Check `{CONFIG_FILE}`. Supported keys: `extension`, `exclude`, `ignore`.
"),
    };
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parse_failure_names_the_file() {
        let md = render_error(&Error::ParseFailed {
            file: PathBuf::from("docs/bad.mdx"),
            reason: "unclosed expression starting at line 3".to_string(),
        });
        assert!(md.starts_with("# Error: Parse Failed"));
        assert!(md.contains("`docs/bad.mdx`"));
        assert!(md.contains("line 3"));
    }

    #[test]
    fn read_failure_names_the_file() {
        let md = render_error(&Error::ReadFailed {
            file: PathBuf::from("docs/latin1.md"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "stream did not contain valid UTF-8"),
        });
        assert!(md.starts_with("# Error: Unreadable Document"));
        assert!(md.contains("`docs/latin1.md`"));
        assert!(md.contains("valid UTF-8"));
    }

    #[test]
    fn findings_serialize_with_kind_tag() {
        let json = render_json(&[Finding::BrokenAnchor {
            file: PathBuf::from("a.md"),
            link: "#x".to_string(),
        }])
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["kind"], "broken_anchor");
        assert_eq!(value[0]["file"], "a.md");
        assert_eq!(value[0]["link"], "#x");
    }

    #[test]
    fn finding_messages() {
        let file = PathBuf::from("docs/a.md");
        let broken = Finding::BrokenFile {
            file: file.clone(),
            link: "/work/docs/b.md".to_string(),
        };
        let anchor = Finding::BrokenAnchor {
            file,
            link: "./b.md#x".to_string(),
        };
        assert_eq!(broken.to_string(), "Link is broken: '/work/docs/b.md' in file docs/a.md");
        assert_eq!(anchor.to_string(), "Anchor of link is broken: './b.md#x' in file docs/a.md");
    }
}
