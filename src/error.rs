/// Crate-level error types for introspection and editing.
use std::path::PathBuf;

/// Errors that abort a whole call. Per-file parse failures during a walk,
/// unknown qualified names, and rejected edits are not errors: they are
/// reported as data so an agent can keep going after a failed tool call.
#[allow(clippy::error_impl_error, reason = "crate error type re-exported at the library root")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The tree-sitter grammar could not be loaded into a parser.
    #[error("grammar: {reason}")]
    Grammar {
        /// Description of the ABI or language mismatch.
        reason: String,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON serialization of records failed.
    #[error("json: {0}")]
    Json(
        /// The wrapped JSON error.
        #[from]
        serde_json::Error,
    ),

    /// The directory to index does not exist or is not a directory.
    #[error("root not found: {}", path.display())]
    RootNotFound {
        /// Path that was given as the root.
        path: PathBuf,
    },

    /// The walk found more source files than the configured limit allows.
    #[error("scan limit exceeded: more than {max_files} source files under {}", root.display())]
    ScanLimitExceeded {
        /// Configured maximum number of files.
        max_files: usize,
        /// Root that was being walked.
        root: PathBuf,
    },

    /// TOML deserialization of `.introspect.toml` failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
