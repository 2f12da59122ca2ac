/// Core domain types for extracted definitions and edit results.
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// What kind of syntax node a record or class member came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DefinitionKind {
    /// Plain `x = ...` statement inside a class body.
    Assignment,
    /// Top-level `async def`.
    AsyncFunction,
    /// Top-level `class`.
    Class,
    /// Bare expression statement inside a class body.
    Expression,
    /// Top-level `def`.
    Function,
    /// `def` or `async def` directly inside a class body.
    Method,
}

impl DefinitionKind {
    /// Lowercase label used in summaries and diagnostics.
    pub const fn label(self) -> &'static str {
        return match self {
            DefinitionKind::Assignment => "assignment",
            DefinitionKind::AsyncFunction => "async function",
            DefinitionKind::Class => "class",
            DefinitionKind::Expression => "expression",
            DefinitionKind::Function => "function",
            DefinitionKind::Method => "method",
        };
    }
}

/// One top-level function or class found during an extraction run.
///
/// Line numbers are 1-based and inclusive. The record is a snapshot: it goes
/// stale as soon as its file is rewritten, and callers must re-extract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionRecord {
    /// Class members in body order. Empty for functions.
    pub body: Vec<ClassMember>,
    /// Decorator expressions without the leading `@`, in source order.
    pub decorators: Vec<String>,
    /// Cleaned leading string literal of the body.
    pub docstring: Option<String>,
    /// Last line of the definition.
    pub end_line: u32,
    /// Source text of lines `start_line..=end_line`, trimmed at both ends.
    pub full_text: String,
    /// Function, async function, or class.
    pub kind: DefinitionKind,
    /// Unqualified identifier.
    pub name: String,
    /// File path relative to the indexed root.
    pub path: PathBuf,
    /// Dotted `<path without extension>.<name>` address.
    pub qualified_name: String,
    /// Source text of the `-> T` annotation, functions only.
    pub return_annotation: Option<String>,
    /// Rendered parameter list, or `None` if a default was not a literal.
    pub signature: Option<String>,
    /// Line of the `def` or `class` keyword.
    pub start_line: u32,
}

/// A method found one level inside a class body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodRecord {
    /// Decorator expressions without the leading `@`.
    pub decorators: Vec<String>,
    /// Cleaned leading string literal of the method body.
    pub docstring: Option<String>,
    /// Last line of the method.
    pub end_line: u32,
    /// Source text of the method's line range, trimmed.
    pub full_text: String,
    /// Whether the method was declared with `async def`.
    pub is_async: bool,
    /// Method name.
    pub name: String,
    /// Source text of the return annotation.
    pub return_annotation: Option<String>,
    /// `name(a, b)` with positional parameter names only.
    pub signature: String,
    /// Line of the `def` keyword.
    pub start_line: u32,
}

/// A statement directly inside a class body that the extractor records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClassMember {
    /// `name = value`; the name is the first assignment target's text.
    Assignment {
        /// Line of the statement.
        line: u32,
        /// First target of the assignment.
        name: String,
    },
    /// A bare expression, including a class docstring.
    Expression {
        /// Line of the statement.
        line: u32,
        /// Source text of the expression.
        value: String,
    },
    /// A `def` or `async def`.
    Method(MethodRecord),
}

impl ClassMember {
    /// The member's kind tag.
    pub const fn kind(&self) -> DefinitionKind {
        return match self {
            ClassMember::Assignment { .. } => DefinitionKind::Assignment,
            ClassMember::Expression { .. } => DefinitionKind::Expression,
            ClassMember::Method(_) => DefinitionKind::Method,
        };
    }

    /// First source line of the member.
    pub const fn line(&self) -> u32 {
        return match self {
            ClassMember::Assignment { line, .. } | ClassMember::Expression { line, .. } => *line,
            ClassMember::Method(method) => method.start_line,
        };
    }
}

/// Answer to "give me the source of X".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLookup {
    /// The definition's literal text.
    Found {
        /// Trimmed source of the definition.
        text: String,
    },
    /// No definition has that name; here is everything that does exist.
    Unknown {
        /// The name that was asked for.
        requested: String,
        /// Every qualified name in the current extraction, in walk order.
        valid_names: Vec<String>,
    },
}

impl fmt::Display for SourceLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return match self {
            SourceLookup::Found { text } => f.write_str(text),
            SourceLookup::Unknown { requested, valid_names } => {
                writeln!(f, "Could not find `{requested}`. Valid qualified names are:")?;
                for name in valid_names {
                    writeln!(f, "- {name}")?;
                }
                Ok(())
            },
        };
    }
}

/// Result of a replace request. Only `Applied` touched the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The replacement parsed and was written.
    Applied {
        /// File that was rewritten, relative to the root.
        path: PathBuf,
    },
    /// The record's line range does not fit the file on disk.
    InvalidRange {
        /// Recorded last line.
        end_line: u32,
        /// Recorded first line.
        start_line: u32,
    },
    /// The spliced file would not parse as a module.
    InvalidSyntax {
        /// Where the parser gave up.
        reason: String,
    },
    /// No definition has that qualified name.
    NotFound,
    /// The file changed between extraction and splice.
    Stale {
        /// File whose content no longer matches the record.
        path: PathBuf,
    },
}

impl EditOutcome {
    /// `true` only when the replacement landed on disk.
    pub const fn is_applied(&self) -> bool {
        return matches!(self, EditOutcome::Applied { .. });
    }
}
