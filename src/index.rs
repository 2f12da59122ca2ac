//! Qualified-name derivation and lookup over an extraction run.

use std::fmt::Write as _;
use std::path::{Component, Path};

use crate::grammar::SOURCE_EXTENSION;
use crate::types::DefinitionRecord;

/// Derive `<path with separators as dots, extension stripped>.<name>`.
///
/// `pkg/mod.py` + `f` gives `pkg.mod.f`. This string is the address agents
/// pass back to locate and replace, so this derivation must not change.
pub fn qualify(relative_path: &Path, name: &str) -> String {
    let joined = relative_path
        .components()
        .filter(|c| return matches!(c, Component::Normal(_)))
        .map(|c| return c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(".");

    let suffix = format!(".{SOURCE_EXTENSION}");
    let module = joined.strip_suffix(suffix.as_str()).unwrap_or(&joined);
    return format!("{module}.{name}");
}

/// Linear scan for an exact qualified-name match. When two definitions in
/// one file share a name, the first in walk order wins.
pub fn find<'r>(records: &'r [DefinitionRecord], qualified_name: &str) -> Option<&'r DefinitionRecord> {
    return records.iter().find(|r| return r.qualified_name == qualified_name);
}

/// Every qualified name in the run, in walk order.
pub fn qualified_names(records: &[DefinitionRecord]) -> Vec<String> {
    return records.iter().map(|r| return r.qualified_name.clone()).collect();
}

/// Records whose qualified name contains `needle`, ignoring case.
pub fn search<'r>(records: &'r [DefinitionRecord], needle: &str) -> Vec<&'r DefinitionRecord> {
    let needle = needle.to_lowercase();
    return records
        .iter()
        .filter(|r| return r.qualified_name.to_lowercase().contains(&needle))
        .collect();
}

/// Names sharing the requested name's last segment, for "did you mean" hints.
pub fn similar_names(valid_names: &[String], qualified_name: &str) -> Vec<String> {
    let wanted = last_segment(qualified_name);
    return valid_names
        .iter()
        .filter(|n| return last_segment(n) == wanted && n.as_str() != qualified_name)
        .cloned()
        .collect();
}

fn last_segment(qualified_name: &str) -> &str {
    return qualified_name.rsplit('.').next().unwrap_or(qualified_name);
}

/// One line per definition, sorted by qualified name:
/// `pkg.mod.f (function): f(a, b) - first docstring line`.
pub fn summarize(records: &[DefinitionRecord]) -> String {
    let mut sorted: Vec<&DefinitionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| return a.qualified_name.cmp(&b.qualified_name));

    let mut out = String::new();
    for record in sorted {
        let signature = record.signature.as_deref().unwrap_or(&record.name);
        let _ = write!(out, "{} ({}): {signature}", record.qualified_name, record.kind.label());
        if let Some(summary) = record.docstring.as_deref().and_then(|d| return d.lines().next()) {
            let _ = write!(out, " - {summary}");
        }
        out.push('\n');
    }
    return out;
}
