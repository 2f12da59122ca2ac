//! Tree-sitter Python grammar and whole-module parse checking.
//!
//! Tree-sitter accepts more than CPython does (Python 2 `print`, misplaced
//! defaults, inconsistent dedents), so a module only counts as parsed when
//! the CPython-grammar parser in `rustpython-parser` also accepts it.

use rustpython_parser::Mode;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::error::Error;

/// Extension of files the extractor reads, without the dot.
pub const SOURCE_EXTENSION: &str = "py";

/// Result of parsing a whole module. Tree-sitter always produces a tree, so a
/// tree with any ERROR or MISSING node is reported as `Failed`, as is any
/// text the CPython grammar rejects.
pub enum ParseOutcome {
    /// Clean parse.
    Parsed(Tree),
    /// The text is not a valid module.
    Failed(String),
}

/// The Python language.
pub fn python() -> Language {
    return tree_sitter_python::LANGUAGE.into();
}

/// Build a parser with the Python grammar loaded.
///
/// # Errors
///
/// Returns `Error::Grammar` if the grammar's ABI does not match the runtime.
pub fn python_parser() -> Result<Parser, Error> {
    let mut parser = Parser::new();
    parser
        .set_language(&python())
        .map_err(|e| return Error::Grammar { reason: e.to_string() })?;
    return Ok(parser);
}

/// Parse `source` as a complete module.
pub fn parse_module(parser: &mut Parser, source: &str) -> ParseOutcome {
    let Some(tree) = parser.parse(source, None) else {
        return ParseOutcome::Failed("parser returned no tree".to_string());
    };

    let root = tree.root_node();
    if root.has_error() {
        let reason = first_error(root, source)
            .unwrap_or_else(|| return "syntax error".to_string());
        return ParseOutcome::Failed(reason);
    }

    if let Err(reason) = check_python_grammar(source) {
        return ParseOutcome::Failed(reason);
    }
    return ParseOutcome::Parsed(tree);
}

/// Validate `source` against the CPython grammar, including the checks
/// CPython makes after parsing (argument order, indentation consistency).
///
/// # Errors
///
/// Returns `line N: <message>` for the first rejected construct.
pub fn check_python_grammar(source: &str) -> Result<(), String> {
    return rustpython_parser::parse(source, Mode::Module, "<module>")
        .map(|_| return ())
        .map_err(|e| {
            let offset = usize::from(e.offset);
            let prefix = source.get(..offset).unwrap_or(source);
            let line = prefix.matches('\n').count().saturating_add(1);
            return format!("line {line}: {}", e.error);
        });
}

/// Describe the first ERROR or MISSING node in document order.
fn first_error(node: Node<'_>, source: &str) -> Option<String> {
    if node.is_missing() {
        let line = node.start_position().row.saturating_add(1);
        return Some(format!("line {line}: missing `{}`", node.kind()));
    }
    if node.is_error() {
        let line = node.start_position().row.saturating_add(1);
        let text = node.utf8_text(source.as_bytes()).unwrap_or("");
        let snippet = text.lines().next().unwrap_or("").trim();
        return Some(format!("line {line}: unexpected `{snippet}`"));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if !child.has_error() {
            continue;
        }
        if let Some(reason) = first_error(child, source) {
            return Some(reason);
        }
    }
    return None;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(source: &str) -> ParseOutcome {
        let mut parser = python_parser().unwrap();
        parse_module(&mut parser, source)
    }

    #[test]
    fn valid_module_parses() {
        let outcome = check("def f(a, b):\n    return a + b\n");
        assert!(matches!(outcome, ParseOutcome::Parsed(_)), "valid module rejected");
    }

    #[test]
    fn missing_colon_fails_with_line() {
        let ParseOutcome::Failed(reason) = check("def f(a, b)\n    return a + b\n") else {
            panic!("missing colon accepted");
        };
        assert!(reason.starts_with("line "), "reason carries a line: {reason}");
    }

    fn rejected(source: &str) -> String {
        let ParseOutcome::Failed(reason) = check(source) else {
            panic!("accepted invalid module: {source:?}");
        };
        return reason;
    }

    #[test]
    fn python2_print_and_exec_fail() {
        rejected("def f(a, b):\n    print \"hi\"\n");
        rejected("def f(a, b):\n    exec \"x\"\n");
    }

    #[test]
    fn default_before_plain_parameter_fails() {
        let reason = rejected("def f(a=1, b):\n    pass\n");
        assert!(reason.starts_with("line 1:"), "{reason}");
    }

    #[test]
    fn positional_after_keyword_argument_fails() {
        let reason = rejected("def f(a, b):\n    return g(a=1, b)\n");
        assert!(reason.starts_with("line 2:"), "{reason}");
    }

    #[test]
    fn unmatched_dedent_fails() {
        rejected("def f(a, b):\n    if a:\n        return a\n  return b\n");
    }

    #[test]
    fn modern_syntax_still_parses() {
        let source = "\
async def f(x, /, y=1, *, z):
    match x:
        case [a, *_]:
            return a
    return [i async for i in y if (n := i)]
";
        assert!(matches!(check(source), ParseOutcome::Parsed(_)), "valid module rejected");
    }

    #[test]
    fn empty_module_parses() {
        assert!(matches!(check(""), ParseOutcome::Parsed(_)), "empty module rejected");
    }
}
