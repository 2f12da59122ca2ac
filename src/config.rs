use std::path::Path;

use crate::error::Error;

/// File name of the optional per-root configuration.
pub const CONFIG_FILE: &str = ".introspect.toml";

/// Default cap on source files parsed in one extraction run.
const DEFAULT_MAX_FILES: usize = 20_000;

/// Default per-file size limit (16 MiB).
const DEFAULT_MAX_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// Extraction settings loaded from `.introspect.toml` in the indexed root.
/// Exclude patterns are path prefixes relative to the root, `/`-separated.
#[derive(Debug, Clone)]
pub struct Config {
    exclude: Vec<String>,
    /// Files larger than this are skipped.
    pub max_file_bytes: u64,
    /// Walks that find more source files than this fail.
    pub max_files: usize,
}

/// Raw TOML structure for `.introspect.toml`.
#[derive(serde::Deserialize)]
struct IntrospectTomlConfig {
    #[serde(default)]
    exclude: Vec<String>,
    max_file_bytes: Option<u64>,
    max_files: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        return Self {
            exclude: Vec::new(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            max_files: DEFAULT_MAX_FILES,
        };
    }
}

impl Config {
    /// Load config from `.introspect.toml` in the given root directory.
    /// Returns defaults if the file doesn't exist, and an error if it exists
    /// but is malformed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        return Self::parse(&content);
    }

    /// Parse config from TOML content, filling unset limits with defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlDe` if the TOML is malformed.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let raw: IntrospectTomlConfig = toml::from_str(content)?;
        let exclude = raw
            .exclude
            .into_iter()
            .map(|p| return p.trim_end_matches('/').to_string())
            .filter(|p| return !p.is_empty())
            .collect();

        return Ok(Self {
            exclude,
            max_file_bytes: raw.max_file_bytes.unwrap_or(DEFAULT_MAX_FILE_BYTES),
            max_files: raw.max_files.unwrap_or(DEFAULT_MAX_FILES),
        });
    }

    /// Check whether a path relative to the root should be walked.
    ///
    /// A path is excluded when it equals an exclude pattern or lies beneath one.
    /// `build` excludes `build/x.py` but not `builder.py`.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        return !self.exclude.iter().any(|p| {
            return relative_path == p
                || relative_path
                    .strip_prefix(p.as_str())
                    .is_some_and(|rest| return rest.starts_with('/'));
        });
    }
}
