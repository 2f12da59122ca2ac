//! Agent-facing tool calls: a single string argument, usually a JSON object.
//!
//! Every call returns text. Malformed input degrades to a best-effort reading
//! or a correction hint, and errors are rendered rather than propagated, so an
//! agent can keep working after a bad call.

use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::config::Config;
use crate::diagnostics;
use crate::extractor;
use crate::index;
use crate::locator;
use crate::mutator;
use crate::types::SourceLookup;

/// A fenced block around the whole input, as the editor prompt asks the model to reply.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A\s*```[\w+.-]*[ \t]*\r?\n(.*?)\r?\n[ \t]*```\s*\z").expect("valid regex")
});

/// The tools exposed to an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    /// Replace a definition's source.
    EditSource,
    /// Source of the module owning a definition.
    GetModule,
    /// Source of one definition.
    GetSource,
    /// One line per definition in the tree.
    Summary,
}

impl ToolName {
    /// All tools, in registration order.
    pub const ALL: [ToolName; 4] = [ToolName::Summary, ToolName::GetSource, ToolName::GetModule, ToolName::EditSource];

    /// Identifier used on the command line and in tool registration.
    pub const fn id(self) -> &'static str {
        return match self {
            ToolName::EditSource => "edit-source",
            ToolName::GetModule => "get-module",
            ToolName::GetSource => "get-source",
            ToolName::Summary => "summary",
        };
    }

    /// Description shown to the agent when the tool is registered.
    pub const fn description(self) -> &'static str {
        return match self {
            ToolName::EditSource => {
                "Replace a function or class definition. Input: JSON \
                 {\"qualified_name\": \"pkg.mod.name\", \"new_code\": \"<full definition>\"}. \
                 The edit is rejected unless the file still parses."
            },
            ToolName::GetModule => {
                "Get the full source of the module that defines a qualified name. \
                 Input: {\"qualified_name\": \"pkg.mod.name\"} or the bare name."
            },
            ToolName::GetSource => {
                "Get the source code of a function or class by qualified name. \
                 Input: {\"qualified_name\": \"pkg.mod.name\"} or the bare name."
            },
            ToolName::Summary => {
                "List every function and class in the repo with its qualified name, \
                 signature, and docstring summary. Input is ignored."
            },
        };
    }
}

impl FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        return ToolName::ALL
            .into_iter()
            .find(|t| return t.id() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = ToolName::ALL.iter().map(|t| return t.id()).collect();
                return format!("unknown tool `{s}`, expected one of: {}", known.join(", "));
            });
    }
}

/// Arguments of a single-argument tool call.
#[derive(Deserialize)]
struct NameArgs {
    qualified_name: String,
}

/// Arguments of an edit call.
#[derive(Debug, Deserialize, PartialEq, Eq)]
pub struct EditArgs {
    /// Replacement definition text.
    pub new_code: String,
    /// Definition to replace.
    pub qualified_name: String,
}

/// Run one tool call against the tree at `root`.
pub fn invoke(root: &Path, config: &Config, tool: ToolName, input: &str) -> String {
    return match tool {
        ToolName::Summary => summary(root, config),
        ToolName::GetSource => get_source(root, config, &parse_name_input(input)),
        ToolName::GetModule => get_module(root, config, &parse_name_input(input)),
        ToolName::EditSource => match parse_edit_input(input) {
            Ok(args) => edit_source(root, config, &args),
            Err(hint) => hint,
        },
    };
}

/// Read `qualified_name` from a JSON object, a JSON string, or the raw input.
pub fn parse_name_input(input: &str) -> String {
    if let Ok(args) = serde_json::from_str::<NameArgs>(input) {
        return args.qualified_name.trim().to_string();
    }
    if let Ok(name) = serde_json::from_str::<String>(input) {
        return name.trim().to_string();
    }
    return input.trim().to_string();
}

/// Read an edit request, or explain the expected shape.
///
/// # Errors
///
/// Returns a correction hint when the input isn't a JSON object with string
/// `qualified_name` and `new_code` fields.
pub fn parse_edit_input(input: &str) -> Result<EditArgs, String> {
    return serde_json::from_str::<EditArgs>(input).map_err(|e| {
        return format!(
            "\
# Malformed Request

Could not read the edit request: {e}

## Expected

A JSON object with two string fields:

    {{\"qualified_name\": \"pkg.module.function_name\", \"new_code\": \"def function_name(...):\\n    ...\"}}

Escape newlines in `new_code` as `\\n`.
"
        );
    });
}

/// Unwrap a fenced code block such as ```` ```python ... ``` ````.
pub fn strip_code_fence(code: &str) -> &str {
    return CODE_FENCE
        .captures(code)
        .and_then(|c| return c.get(1))
        .map_or(code, |m| return m.as_str());
}

fn summary(root: &Path, config: &Config) -> String {
    return match extractor::extract(root, config) {
        Ok(records) if records.is_empty() => {
            format!("No Python definitions found under `{}`.", root.display())
        },
        Ok(records) => index::summarize(&records),
        Err(e) => diagnostics::render_error(&e),
    };
}

fn get_source(root: &Path, config: &Config, qualified_name: &str) -> String {
    return match locator::locate_definition_source(root, config, qualified_name) {
        Ok(SourceLookup::Found { text }) => text,
        Ok(lookup @ SourceLookup::Unknown { .. }) => unknown_guidance(&lookup, qualified_name),
        Err(e) => diagnostics::render_error(&e),
    };
}

fn get_module(root: &Path, config: &Config, qualified_name: &str) -> String {
    return match locator::locate_module_source(root, config, qualified_name) {
        Ok(Some(text)) => text,
        Ok(None) => match locator::locate_definition_source(root, config, qualified_name) {
            Ok(lookup) => unknown_guidance(&lookup, qualified_name),
            Err(e) => diagnostics::render_error(&e),
        },
        Err(e) => diagnostics::render_error(&e),
    };
}

fn edit_source(root: &Path, config: &Config, args: &EditArgs) -> String {
    let new_code = strip_code_fence(&args.new_code);
    let qualified_name = args.qualified_name.trim();
    return match mutator::replace_definition(root, config, qualified_name, new_code) {
        Ok(outcome) => diagnostics::render_edit_outcome(qualified_name, &outcome),
        Err(e) => diagnostics::render_error(&e),
    };
}

/// Valid-name listing plus a "did you mean" block when one applies.
fn unknown_guidance(lookup: &SourceLookup, qualified_name: &str) -> String {
    let mut out = lookup.to_string();
    if let SourceLookup::Unknown { valid_names, .. } = lookup {
        out.push_str(&diagnostics::render_did_you_mean(
            qualified_name,
            &index::similar_names(valid_names, qualified_name),
        ));
    }
    return out;
}
