/// Crate-level error types for doclinks.
use std::path::PathBuf;

/// Fatal errors that abort a run. Broken links are not errors: they are
/// collected as findings by the checker. Each variant names the file,
/// pattern, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-internal error type in binary")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The directory to scan does not exist.
    #[error("directory not found: {}", path.display())]
    DirectoryNotFound {
        /// Path that was requested on the command line.
        path: PathBuf,
    },

    /// An ignore glob could not be compiled.
    #[error("invalid ignore pattern `{pattern}`: {reason}")]
    InvalidIgnorePattern {
        /// The pattern as written by the user.
        pattern: String,
        /// Description from the glob compiler.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// Findings could not be serialized for `--format json`.
    #[error("json: {0}")]
    Json(
        /// The wrapped serialization error.
        #[from]
        serde_json::Error,
    ),

    /// A document could not be rendered into its structural form.
    #[error("parse failed: {}: {reason}", file.display())]
    ParseFailed {
        /// Document that failed to render.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// A document could not be read, or is not valid UTF-8.
    #[error("failed to read {}: {source}", file.display())]
    ReadFailed {
        /// Document that could not be read.
        file: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// One of the extraction patterns failed to compile.
    #[error("pattern: {0}")]
    Pattern(
        /// The wrapped regex error.
        #[from]
        regex::Error,
    ),

    /// TOML deserialization of `.doclinks.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
