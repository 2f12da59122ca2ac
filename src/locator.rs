//! Source lookup by qualified name. Every call re-extracts, so answers always
//! reflect what is on disk now.

use std::path::Path;

use crate::config::Config;
use crate::error::Error;
use crate::extractor;
use crate::index;
use crate::types::SourceLookup;

/// Verbatim contents of the file that owns `qualified_name`, or `None` if no
/// definition has that name.
///
/// # Errors
///
/// Returns extraction errors, or `Error::Io` if the owning file can't be read.
pub fn locate_module_source(
    root: &Path,
    config: &Config,
    qualified_name: &str,
) -> Result<Option<String>, Error> {
    let records = extractor::extract(root, config)?;
    let Some(record) = index::find(&records, qualified_name) else {
        return Ok(None);
    };

    let content = std::fs::read_to_string(extractor::absolute_path(root, record))?;
    return Ok(Some(content));
}

/// The literal text of the named definition, or the list of every valid
/// qualified name when it doesn't exist. Unknown names are not errors.
///
/// # Errors
///
/// Returns extraction errors only.
pub fn locate_definition_source(
    root: &Path,
    config: &Config,
    qualified_name: &str,
) -> Result<SourceLookup, Error> {
    let records = extractor::extract(root, config)?;

    return Ok(match index::find(&records, qualified_name) {
        Some(record) => SourceLookup::Found {
            text: record.full_text.clone(),
        },
        None => SourceLookup::Unknown {
            requested: qualified_name.to_string(),
            valid_names: index::qualified_names(&records),
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("pkg")).unwrap();
        std::fs::write(
            dir.path().join("pkg/mod.py"),
            "def f(a, b):\n    pass\n\n\nclass K:\n    x = 1\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn found_definition_text() {
        let dir = tree();
        let lookup = locate_definition_source(dir.path(), &Config::default(), "pkg.mod.f").unwrap();
        assert_eq!(
            lookup,
            SourceLookup::Found {
                text: "def f(a, b):\n    pass".to_string()
            }
        );
    }

    #[test]
    fn unknown_lists_valid_names() {
        let dir = tree();
        let lookup = locate_definition_source(dir.path(), &Config::default(), "pkg.mod.nope").unwrap();
        let rendered = lookup.to_string();
        assert!(rendered.contains("pkg.mod.f"), "guidance lists f: {rendered}");
        assert!(rendered.contains("pkg.mod.K"), "guidance lists K: {rendered}");
    }

    #[test]
    fn module_source_is_verbatim() {
        let dir = tree();
        let module = locate_module_source(dir.path(), &Config::default(), "pkg.mod.K").unwrap();
        assert_eq!(
            module.as_deref(),
            Some("def f(a, b):\n    pass\n\n\nclass K:\n    x = 1\n")
        );
        let missing = locate_module_source(dir.path(), &Config::default(), "pkg.other.K").unwrap();
        assert!(missing.is_none(), "unknown name has no module");
    }
}
