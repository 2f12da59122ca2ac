use std::fmt::Write as _;

use crate::config::CONFIG_FILE;
use crate::error::Error;
use crate::types::EditOutcome;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Print markdown to stderr with bold headings.
pub fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and how to fix it.
/// Designed to be readable by both humans and LLM agents.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::RootNotFound { path } => format!("\
# Error: Root Not Found

`{}` is not a directory.

## Fix

Pass the directory that contains the Python sources:

    introspect --root path/to/repo list
", path.display()),

        Error::ScanLimitExceeded { max_files, root } => format!("\
# Error: Too Many Files

More than {max_files} Python files were found under `{}`.

## Fix

Exclude generated or vendored directories in `{CONFIG_FILE}`:

    exclude = [\".venv\", \"build\"]

or raise `max_files`.
", root.display()),

        Error::TomlDe(err) => format!("\
# Error: Invalid Config

`{CONFIG_FILE}` could not be parsed: {err}
"),

        Error::Grammar { reason } => format!("\
# Error: Grammar

The Python grammar could not be loaded: {reason}
"),

        Error::Io(err) => format!("\
# Error: I/O

{err}
"),

        Error::Json(err) => format!("\
# Error: JSON

{err}
"),
    }
}

/// Render the suggestion block shown after an unknown-name lookup.
pub fn render_did_you_mean(requested: &str, similar: &[String]) -> String {
    let Some(first) = similar.first() else {
        return String::new();
    };
    let mut out = format!("\n## Did you mean `{first}`?\n");
    if similar.len() > 1 {
        out.push_str("\nOther definitions with the same name:\n\n");
        for name in similar.iter().skip(1) {
            let _ = writeln!(out, "- `{name}`");
        }
    }
    let _ = writeln!(out, "\n(`{requested}` does not exist.)");
    return out;
}

/// Describe an edit outcome in one short paragraph.
pub fn render_edit_outcome(qualified_name: &str, outcome: &EditOutcome) -> String {
    match outcome {
        EditOutcome::Applied { path } => {
            format!("Replaced `{qualified_name}` in `{}`.", path.display())
        },
        EditOutcome::NotFound => format!("\
# Edit Rejected: Unknown Definition

`{qualified_name}` does not exist. List valid names with the definitions summary.
"),
        EditOutcome::InvalidSyntax { reason } => format!("\
# Edit Rejected: Invalid Syntax

The file would not parse after replacing `{qualified_name}` ({reason}).
Nothing was written.

## Fix

Send the complete definition, including the `def`/`class` line and its colon.
"),
        EditOutcome::InvalidRange { start_line, end_line } => format!("\
# Edit Rejected: Invalid Range

Lines {start_line}-{end_line} of `{qualified_name}` do not fit the file on disk.
Nothing was written.
"),
        EditOutcome::Stale { path } => format!("\
# Edit Rejected: File Changed

`{}` changed while `{qualified_name}` was being replaced. Nothing was written.

## Fix

Fetch the source again and retry.
", path.display()),
    }
}
