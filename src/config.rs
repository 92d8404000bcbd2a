use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::Error;

/// Name of the optional config file read from the scanned directory.
pub const CONFIG_FILE: &str = ".doclinks.toml";

/// Extension given to extensionless and directory links when none is configured.
const DEFAULT_EXTENSION: &str = "md";

/// Run configuration: `.doclinks.toml` merged with the command line.
/// Exclude patterns are path prefixes applied to the initial directory walk;
/// ignore patterns are globs matched against raw link strings.
#[derive(Debug)]
pub struct Config {
    /// Path prefixes (relative to the scanned directory) skipped by the walk.
    exclude: Vec<String>,
    /// Extension appended to extensionless links, without the leading dot.
    extension: String,
    /// Compiled ignore globs from the config file and the command line.
    ignore: GlobSet,
}

/// Raw TOML structure for `.doclinks.toml`.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DoclinksTomlConfig {
    /// Path prefixes skipped by the walk.
    #[serde(default)]
    exclude: Vec<String>,
    /// Default document extension.
    #[serde(default)]
    extension: Option<String>,
    /// Globs exempting raw link strings from checking.
    #[serde(default)]
    ignore: Vec<String>,
}

impl Config {
    /// Load config from `.doclinks.toml` in `root` and merge the command-line
    /// ignore pattern. A missing file means defaults; a malformed file is an
    /// error, never a silent fallback.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// `Error::TomlDe` if the TOML is malformed,
    /// or `Error::InvalidIgnorePattern` if a glob does not compile.
    pub fn load(root: &Path, cli_ignore: Option<&str>) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let raw = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => DoclinksTomlConfig::default(),
            Err(e) => return Err(Error::Io(e)),
        };
        return Self::from_raw(raw, cli_ignore);
    }

    /// Build a config from parsed TOML plus the command-line ignore pattern.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidIgnorePattern` if a glob does not compile.
    fn from_raw(raw: DoclinksTomlConfig, cli_ignore: Option<&str>) -> Result<Self, Error> {
        let patterns = raw.ignore.iter().map(String::as_str).chain(cli_ignore);
        let extension = raw
            .extension
            .as_deref()
            .map(|ext| return ext.trim_start_matches('.'))
            .filter(|ext| return !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
            .to_string();

        return Ok(Self {
            exclude: raw.exclude,
            extension,
            ignore: compile_ignore_set(patterns)?,
        });
    }

    /// Extension appended to extensionless and directory links.
    pub fn extension(&self) -> &str {
        return &self.extension;
    }

    /// Whether a raw link string is exempt from checking.
    pub fn is_ignored(&self, link: &str) -> bool {
        return self.ignore.is_match(link);
    }

    /// Check whether a file found by the walk should be loaded up front.
    /// A path is skipped if it starts with any exclude prefix.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        return !self.exclude.iter().any(|p| return relative_path.starts_with(p.as_str()));
    }
}

/// Compile glob patterns into one set. `*` does not cross `/`; use `**` for that.
///
/// # Errors
///
/// Returns `Error::InvalidIgnorePattern` naming the first pattern that fails.
fn compile_ignore_set<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                return Error::InvalidIgnorePattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                };
            })?;
        builder.add(glob);
    }
    return builder.build().map_err(|e| {
        return Error::InvalidIgnorePattern {
            pattern: String::new(),
            reason: e.to_string(),
        };
    });
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path(), None).unwrap();
        assert_eq!(config.extension(), "md");
        assert!(config.should_scan("docs/a.md"));
        assert!(!config.is_ignored("./a.md"));
    }

    #[test]
    fn toml_values_are_merged_with_cli_pattern() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "extension = \".mdx\"\nexclude = [\"node_modules/\"]\nignore = [\"/api/**\"]\n",
        )
        .unwrap();

        let config = Config::load(dir.path(), Some("*.pdf")).unwrap();
        assert_eq!(config.extension(), "mdx");
        assert!(!config.should_scan("node_modules/pkg/README.md"));
        assert!(config.is_ignored("/api/v1/users"));
        assert!(config.is_ignored("manual.pdf"));
        assert!(!config.is_ignored("./guide.md"));
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let config = DoclinksTomlConfig::default();
        let config = Config::from_raw(config, Some("/api/*")).unwrap();
        assert!(config.is_ignored("/api/users"));
        assert!(!config.is_ignored("/api/v1/users"));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "ignore = 3\n").unwrap();
        assert!(matches!(Config::load(dir.path(), None), Err(Error::TomlDe(_))));
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let err = Config::from_raw(DoclinksTomlConfig::default(), Some("a[")).unwrap_err();
        assert!(matches!(err, Error::InvalidIgnorePattern { ref pattern, .. } if pattern == "a["));
    }
}
