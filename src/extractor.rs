use std::path::{Path, PathBuf};

use tree_sitter::Node;
use walkdir::WalkDir;

use crate::config::Config;
use crate::docstring;
use crate::error::Error;
use crate::grammar::{self, ParseOutcome};
use crate::index;
use crate::signature;
use crate::types::{ClassMember, DefinitionKind, DefinitionRecord, MethodRecord};

/// Syntax node kinds the extractor distinguishes. Anything else is `Other`
/// and ignored on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Class,
    Decorated,
    Function,
    Other,
}

impl NodeKind {
    fn of(node: Node<'_>) -> Self {
        return match node.kind() {
            "class_definition" => NodeKind::Class,
            "decorated_definition" => NodeKind::Decorated,
            "function_definition" => NodeKind::Function,
            _ => NodeKind::Other,
        };
    }
}

/// Walk every `.py` file under `root` and extract its top-level functions
/// and classes. Files that can't be read or don't parse contribute nothing.
///
/// Records come out in walk order, then source order. The walk order is not
/// sorted; callers that need determinism must sort.
///
/// # Errors
///
/// Returns `Error::RootNotFound` if `root` is not a directory,
/// `Error::ScanLimitExceeded` if more than `config.max_files` source files
/// are found, or `Error::Grammar` if the Python grammar can't be loaded.
pub fn extract(root: &Path, config: &Config) -> Result<Vec<DefinitionRecord>, Error> {
    if !root.is_dir() {
        return Err(Error::RootNotFound { path: root.to_path_buf() });
    }

    let mut parser = grammar::python_parser()?;
    let mut records = Vec::new();
    let mut scanned = 0usize;

    let walker = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| return config.should_scan(&relative_slash_path(root, e.path())))
        .filter_map(Result::ok)
        .filter(|e| return e.file_type().is_file())
        .filter(|e| return e.path().extension().is_some_and(|ext| return ext == grammar::SOURCE_EXTENSION));

    for entry in walker {
        scanned = scanned.saturating_add(1);
        if scanned > config.max_files {
            return Err(Error::ScanLimitExceeded {
                max_files: config.max_files,
                root: root.to_path_buf(),
            });
        }

        let file_path = entry.path();
        let relative = file_path.strip_prefix(root).unwrap_or(file_path).to_path_buf();
        let Some(source) = read_source(file_path, config.max_file_bytes) else {
            continue;
        };

        match grammar::parse_module(&mut parser, &source) {
            ParseOutcome::Parsed(tree) => {
                records.extend(records_from_module(tree.root_node(), &source, &relative));
            },
            ParseOutcome::Failed(reason) => {
                tracing::debug!(file = %relative.display(), %reason, "skipping file with syntax error");
            },
        }
    }

    tracing::debug!(files = scanned, definitions = records.len(), "extraction finished");
    return Ok(records);
}

/// Parse one module's text and extract its records, outside of any walk.
///
/// # Errors
///
/// Returns `Error::Grammar` if the Python grammar can't be loaded.
pub fn extract_source(source: &str, relative: &Path) -> Result<Option<Vec<DefinitionRecord>>, Error> {
    let mut parser = grammar::python_parser()?;
    return match grammar::parse_module(&mut parser, source) {
        ParseOutcome::Parsed(tree) => Ok(Some(records_from_module(tree.root_node(), source, relative))),
        ParseOutcome::Failed(_) => Ok(None),
    };
}

/// Read a source file, or log why it was skipped.
fn read_source(path: &Path, max_bytes: u64) -> Option<String> {
    let size = match std::fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "skipping unreadable file");
            return None;
        },
    };
    if size > max_bytes {
        tracing::warn!(file = %path.display(), size, max_bytes, "skipping oversized file");
        return None;
    }

    return match std::fs::read_to_string(path) {
        Ok(source) => Some(source),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "skipping unreadable file");
            None
        },
    };
}

/// `/`-separated path of `path` relative to `root`, empty for the root itself.
fn relative_slash_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    return relative
        .components()
        .map(|c| return c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
}

/// Extract records for every top-level function and class in a module.
fn records_from_module(module: Node<'_>, source: &str, relative: &Path) -> Vec<DefinitionRecord> {
    let mut records = Vec::new();
    let mut cursor = module.walk();

    for node in module.named_children(&mut cursor) {
        let record = match NodeKind::of(node) {
            NodeKind::Function => function_record(node, source, relative, Vec::new()),
            NodeKind::Class => class_record(node, source, relative, Vec::new()),
            NodeKind::Decorated => decorated_record(node, source, relative),
            NodeKind::Other => None,
        };
        if let Some(record) = record {
            records.push(record);
        }
    }

    return records;
}

/// Unwrap `@decorator` lines and extract the definition underneath.
fn decorated_record(node: Node<'_>, source: &str, relative: &Path) -> Option<DefinitionRecord> {
    let definition = node.child_by_field_name("definition")?;
    let decorators = decorators_of(node, source);
    return match NodeKind::of(definition) {
        NodeKind::Function => function_record(definition, source, relative, decorators),
        NodeKind::Class => class_record(definition, source, relative, decorators),
        NodeKind::Decorated | NodeKind::Other => None,
    };
}

fn function_record(
    node: Node<'_>,
    source: &str,
    relative: &Path,
    decorators: Vec<String>,
) -> Option<DefinitionRecord> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let (start_line, end_line) = line_range(node)?;

    let signature = match signature::render_function(&name, node.child_by_field_name("parameters"), source) {
        Ok(sig) => Some(sig),
        Err(e) => {
            tracing::warn!(file = %relative.display(), function = %name, error = %e, "signature not rendered");
            None
        },
    };

    let kind = if is_async(node) { DefinitionKind::AsyncFunction } else { DefinitionKind::Function };

    return Some(DefinitionRecord {
        body: Vec::new(),
        decorators,
        docstring: node
            .child_by_field_name("body")
            .and_then(|b| return docstring::from_block(b, source)),
        end_line,
        full_text: slice_lines(source, start_line, end_line)?,
        kind,
        qualified_name: index::qualify(relative, &name),
        name,
        path: relative.to_path_buf(),
        return_annotation: node
            .child_by_field_name("return_type")
            .map(|t| return node_text(t, source)),
        signature,
        start_line,
    });
}

fn class_record(
    node: Node<'_>,
    source: &str,
    relative: &Path,
    decorators: Vec<String>,
) -> Option<DefinitionRecord> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let (start_line, end_line) = line_range(node)?;
    let block = node.child_by_field_name("body");

    return Some(DefinitionRecord {
        body: block.map(|b| return class_members(b, source)).unwrap_or_default(),
        decorators,
        docstring: block.and_then(|b| return docstring::from_block(b, source)),
        end_line,
        full_text: slice_lines(source, start_line, end_line)?,
        kind: DefinitionKind::Class,
        qualified_name: index::qualify(relative, &name),
        signature: Some(format!("class {name}")),
        name,
        path: relative.to_path_buf(),
        return_annotation: None,
        start_line,
    });
}

/// One level of class body: methods, plain assignments, bare expressions.
/// Nested classes and anything inside methods are not walked.
fn class_members(block: Node<'_>, source: &str) -> Vec<ClassMember> {
    let mut members = Vec::new();
    let mut cursor = block.walk();

    for statement in block.named_children(&mut cursor) {
        let member = match NodeKind::of(statement) {
            NodeKind::Function => method_record(statement, source, Vec::new()).map(ClassMember::Method),
            NodeKind::Decorated => statement
                .child_by_field_name("definition")
                .filter(|d| return NodeKind::of(*d) == NodeKind::Function)
                .and_then(|d| return method_record(d, source, decorators_of(statement, source)))
                .map(ClassMember::Method),
            NodeKind::Class => None,
            NodeKind::Other if statement.kind() == "expression_statement" => {
                statement_member(statement, source)
            },
            NodeKind::Other => None,
        };
        if let Some(member) = member {
            members.push(member);
        }
    }

    return members;
}

fn method_record(node: Node<'_>, source: &str, decorators: Vec<String>) -> Option<MethodRecord> {
    let name = node_text(node.child_by_field_name("name")?, source);
    let (start_line, end_line) = line_range(node)?;

    return Some(MethodRecord {
        decorators,
        docstring: node
            .child_by_field_name("body")
            .and_then(|b| return docstring::from_block(b, source)),
        end_line,
        full_text: slice_lines(source, start_line, end_line)?,
        is_async: is_async(node),
        return_annotation: node
            .child_by_field_name("return_type")
            .map(|t| return node_text(t, source)),
        signature: signature::render_method(&name, node.child_by_field_name("parameters"), source),
        name,
        start_line,
    });
}

/// Classify an `expression_statement` in a class body. Annotated and
/// augmented assignments are neither plain assignments nor bare expressions.
fn statement_member(statement: Node<'_>, source: &str) -> Option<ClassMember> {
    let line = one_based(statement.start_position().row)?;
    let first = statement.named_child(0)?;

    return match first.kind() {
        "assignment" if first.child_by_field_name("type").is_some() => None,
        "assignment" => Some(ClassMember::Assignment {
            line,
            name: node_text(first.child_by_field_name("left")?, source),
        }),
        "augmented_assignment" => None,
        _ => Some(ClassMember::Expression {
            line,
            value: node_text(statement, source),
        }),
    };
}

/// `@expr` lines of a `decorated_definition`, without the `@`.
fn decorators_of(node: Node<'_>, source: &str) -> Vec<String> {
    let mut cursor = node.walk();
    return node
        .named_children(&mut cursor)
        .filter(|c| return c.kind() == "decorator")
        .map(|c| return node_text(c, source).trim_start_matches('@').trim().to_string())
        .collect();
}

/// `function_definition` nodes start with an anonymous `async` token when async.
fn is_async(node: Node<'_>) -> bool {
    return node.child(0).is_some_and(|c| return c.kind() == "async");
}

/// 1-based inclusive line range of a node, ending at its last code token.
fn line_range(node: Node<'_>) -> Option<(u32, u32)> {
    let start = one_based(node.start_position().row)?;
    let end = one_based(last_code_row(node))?;
    return Some((start, end));
}

/// Row of the last token in `node` that isn't a comment. Tree-sitter keeps
/// indented trailing comments inside the block they follow.
fn last_code_row(node: Node<'_>) -> usize {
    let count = node.child_count();
    for i in (0..count).rev() {
        let Some(child) = node.child(i) else {
            continue;
        };
        if child.kind() == "comment" || child.start_byte() == child.end_byte() {
            continue;
        }
        return last_code_row(child);
    }
    return node.end_position().row;
}

fn one_based(row: usize) -> Option<u32> {
    return u32::try_from(row).ok()?.checked_add(1);
}

/// Lines `start..=end` (1-based) of `source`, joined and trimmed.
/// `None` if the range doesn't fit inside the source.
pub fn slice_lines(source: &str, start_line: u32, end_line: u32) -> Option<String> {
    if start_line == 0 || end_line < start_line {
        return None;
    }
    let start = usize::try_from(start_line.checked_sub(1)?).ok()?;
    let end = usize::try_from(end_line).ok()?;
    let lines: Vec<&str> = source.split('\n').collect();
    let selected = lines.get(start..end)?;
    return Some(selected.join("\n").trim().to_string());
}

fn node_text(node: Node<'_>, source: &str) -> String {
    return node.utf8_text(source.as_bytes()).unwrap_or("").to_string();
}

/// Path of a record's file on disk.
pub fn absolute_path(root: &Path, record: &DefinitionRecord) -> PathBuf {
    return root.join(&record.path);
}
