//! Splice-and-validate replacement of a definition's source lines.
//!
//! The write is a plain overwrite: there is no lock and no temp-file rename,
//! so a concurrent writer to the same file between read and write is lost.

use std::path::Path;

use crate::config::Config;
use crate::error::Error;
use crate::extractor;
use crate::grammar::{self, ParseOutcome};
use crate::index;
use crate::types::{DefinitionRecord, EditOutcome};

/// Replace the definition named `qualified_name` with `new_text`, but only if
/// the whole file still parses afterwards. Anything other than
/// `EditOutcome::Applied` leaves the disk untouched.
///
/// # Errors
///
/// Returns extraction errors, or `Error::Io` if the owning file can't be read
/// or written.
pub fn replace_definition(
    root: &Path,
    config: &Config,
    qualified_name: &str,
    new_text: &str,
) -> Result<EditOutcome, Error> {
    let records = extractor::extract(root, config)?;
    let Some(record) = index::find(&records, qualified_name) else {
        tracing::debug!(%qualified_name, "replace target not found");
        return Ok(EditOutcome::NotFound);
    };
    return replace_record(root, record, new_text);
}

/// Splice `new_text` over `record`'s line range in its file as it is on disk now.
///
/// # Errors
///
/// Returns `Error::Io` if the file can't be read or written, or
/// `Error::Grammar` if the parser can't be built.
pub fn replace_record(root: &Path, record: &DefinitionRecord, new_text: &str) -> Result<EditOutcome, Error> {
    let invalid_range = EditOutcome::InvalidRange {
        end_line: record.end_line,
        start_line: record.start_line,
    };

    let disk_path = extractor::absolute_path(root, record);
    let current = std::fs::read_to_string(&disk_path)?;

    let Some(on_disk) = extractor::slice_lines(&current, record.start_line, record.end_line) else {
        return Ok(invalid_range);
    };
    if on_disk != record.full_text {
        tracing::warn!(file = %record.path.display(), name = %record.qualified_name, "record is stale");
        return Ok(EditOutcome::Stale { path: record.path.clone() });
    }

    let Some(candidate) = splice(&current, record.start_line, record.end_line, new_text) else {
        return Ok(invalid_range);
    };

    let mut parser = grammar::python_parser()?;
    if let ParseOutcome::Failed(reason) = grammar::parse_module(&mut parser, &candidate) {
        tracing::debug!(name = %record.qualified_name, %reason, "replacement rejected");
        return Ok(EditOutcome::InvalidSyntax { reason });
    }

    std::fs::write(&disk_path, candidate)?;
    tracing::info!(file = %record.path.display(), name = %record.qualified_name, "definition replaced");
    return Ok(EditOutcome::Applied { path: record.path.clone() });
}

/// Lines before `start_line`, then `new_text`, then lines after `end_line`.
/// `None` if the 1-based inclusive range doesn't fit `source`.
pub fn splice(source: &str, start_line: u32, end_line: u32, new_text: &str) -> Option<String> {
    if start_line == 0 || end_line < start_line {
        return None;
    }
    let start = usize::try_from(start_line.checked_sub(1)?).ok()?;
    let end = usize::try_from(end_line).ok()?;

    let lines: Vec<&str> = source.split('\n').collect();
    let before = lines.get(..start)?;
    let after = lines.get(end..)?;

    let mut spliced: Vec<&str> = Vec::with_capacity(lines.len());
    spliced.extend_from_slice(before);
    spliced.extend(new_text.split('\n'));
    spliced.extend_from_slice(after);
    return Some(spliced.join("\n"));
}
