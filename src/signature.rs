//! Parameter-list rendering for extracted functions and methods.
//!
//! Default values are rendered only when they are literal constants. Anything
//! else fails the rendering step; expressions are never evaluated.

use std::fmt::Write as _;

use tree_sitter::Node;

use crate::docstring;

/// Why a signature could not be rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// A parameter default is an expression rather than a constant.
    #[error("default value is not a literal: `{text}`")]
    NonLiteralDefault {
        /// Source text of the offending default.
        text: String,
    },
}

/// One entry of a `parameters` node, in source order.
enum Param<'t> {
    /// `**name`
    KwArgs(String),
    /// Bare `*` marking the start of keyword-only parameters.
    KeywordMarker,
    /// A named parameter with an optional default expression.
    Named {
        default: Option<Node<'t>>,
        name: String,
    },
    /// Bare `/` closing the positional-only parameters.
    PositionalMarker,
    /// `*name`
    VarArgs(String),
}

/// Parameter groups in the shape Python's `ast.arguments` exposes them.
struct Arguments<'t> {
    /// Names of ordinary positional parameters (not positional-only).
    args: Vec<String>,
    /// Defaults of positional-only and ordinary positional parameters.
    defaults: Vec<Node<'t>>,
    kwarg: Option<String>,
    vararg: Option<String>,
}

/// Render a function signature: `name(a, b, *args, **kwargs, 1, 'x')`.
///
/// Positional names come first, then the catch-alls, then the rendered
/// defaults. Keyword-only parameters are not shown.
///
/// # Errors
///
/// Returns `SignatureError::NonLiteralDefault` if any positional default is
/// not a literal constant.
pub fn render_function(
    name: &str,
    parameters: Option<Node<'_>>,
    source: &str,
) -> Result<String, SignatureError> {
    let arguments = parameters.map_or_else(Arguments::empty, |p| return Arguments::collect(p, source));

    let mut parts = arguments.args.clone();
    if let Some(vararg) = &arguments.vararg {
        parts.push(format!("*{vararg}"));
    }
    if let Some(kwarg) = &arguments.kwarg {
        parts.push(format!("**{kwarg}"));
    }
    for default in &arguments.defaults {
        parts.push(render_literal(*default, source)?);
    }

    return Ok(format!("{name}({})", parts.join(", ")));
}

/// Render a method signature: `name(self, a)`, positional names only.
pub fn render_method(name: &str, parameters: Option<Node<'_>>, source: &str) -> String {
    let arguments = parameters.map_or_else(Arguments::empty, |p| return Arguments::collect(p, source));
    return format!("{name}({})", arguments.args.join(", "));
}

impl<'t> Arguments<'t> {
    const fn empty() -> Self {
        return Self {
            args: Vec::new(),
            defaults: Vec::new(),
            kwarg: None,
            vararg: None,
        };
    }

    /// Group a `parameters` node the way Python's `ast` does.
    fn collect(parameters: Node<'t>, source: &str) -> Self {
        let params = params_in_order(parameters, source);
        let positional_only_end = params
            .iter()
            .position(|p| return matches!(p, Param::PositionalMarker));

        let mut arguments = Self::empty();
        let mut keyword_only = false;

        for (index, param) in params.into_iter().enumerate() {
            match param {
                Param::Named { name, default } => {
                    if keyword_only {
                        continue;
                    }
                    let positional_only = positional_only_end.is_some_and(|end| return index < end);
                    if !positional_only {
                        arguments.args.push(name);
                    }
                    if let Some(default) = default {
                        arguments.defaults.push(default);
                    }
                },
                Param::VarArgs(name) => {
                    arguments.vararg = Some(name);
                    keyword_only = true;
                },
                Param::KeywordMarker => keyword_only = true,
                Param::KwArgs(name) => arguments.kwarg = Some(name),
                Param::PositionalMarker => {},
            }
        }

        return arguments;
    }
}

/// Flatten the children of a `parameters` node.
fn params_in_order<'t>(parameters: Node<'t>, source: &str) -> Vec<Param<'t>> {
    let mut params = Vec::new();
    let mut cursor = parameters.walk();

    for child in parameters.named_children(&mut cursor) {
        let param = match child.kind() {
            "identifier" => Param::Named {
                default: None,
                name: text(child, source),
            },
            "default_parameter" | "typed_default_parameter" => Param::Named {
                default: child.child_by_field_name("value"),
                name: child
                    .child_by_field_name("name")
                    .map(|n| return text(n, source))
                    .unwrap_or_default(),
            },
            "typed_parameter" => {
                let Some(inner) = child.named_child(0) else {
                    continue;
                };
                splat_or_named(inner, source)
            },
            "list_splat_pattern" | "dictionary_splat_pattern" => splat_or_named(child, source),
            "keyword_separator" => Param::KeywordMarker,
            "positional_separator" => Param::PositionalMarker,
            _ => continue,
        };
        params.push(param);
    }

    return params;
}

/// Classify an identifier or a `*`/`**` pattern.
fn splat_or_named<'t>(node: Node<'t>, source: &str) -> Param<'t> {
    let inner_name = || {
        return node
            .named_child(0)
            .map(|n| return text(n, source))
            .unwrap_or_default();
    };
    return match node.kind() {
        "list_splat_pattern" => Param::VarArgs(inner_name()),
        "dictionary_splat_pattern" => Param::KwArgs(inner_name()),
        _ => Param::Named {
            default: None,
            name: text(node, source),
        },
    };
}

/// Render a literal constant the way Python's `repr` shows it.
///
/// # Errors
///
/// Returns `SignatureError::NonLiteralDefault` for anything that isn't a
/// number, string, bytes, `True`/`False`/`None`, `...`, or a container of those.
pub fn render_literal(node: Node<'_>, source: &str) -> Result<String, SignatureError> {
    let non_literal = || {
        return SignatureError::NonLiteralDefault {
            text: text(node, source),
        };
    };

    return match node.kind() {
        "integer" => Ok(render_integer(&text(node, source))),
        "float" => Ok(render_float(&text(node, source))),
        "true" => Ok("True".to_string()),
        "false" => Ok("False".to_string()),
        "none" => Ok("None".to_string()),
        "ellipsis" => Ok("Ellipsis".to_string()),
        "string" | "concatenated_string" => render_string(node, source).ok_or_else(non_literal),
        "unary_operator" => render_signed(node, source).ok_or_else(non_literal),
        "binary_operator" => render_complex(node, source).ok_or_else(non_literal),
        "parenthesized_expression" => {
            let inner = node.named_child(0).ok_or_else(non_literal)?;
            render_literal(inner, source)
        },
        "tuple" => {
            let items = render_items(node, source)?;
            if items.len() == 1 {
                Ok(format!("({},)", items.join("")))
            } else {
                Ok(format!("({})", items.join(", ")))
            }
        },
        "list" => Ok(format!("[{}]", render_items(node, source)?.join(", "))),
        "set" => Ok(format!("{{{}}}", render_items(node, source)?.join(", "))),
        "dictionary" => render_dictionary(node, source),
        _ => Err(non_literal()),
    };
}

/// Render every named child of a container, skipping comments.
fn render_items(node: Node<'_>, source: &str) -> Result<Vec<String>, SignatureError> {
    let mut cursor = node.walk();
    return node
        .named_children(&mut cursor)
        .filter(|c| return c.kind() != "comment")
        .map(|c| return render_literal(c, source))
        .collect();
}

/// Render `{k: v, ...}`; `**spread` entries are not literals.
fn render_dictionary(node: Node<'_>, source: &str) -> Result<String, SignatureError> {
    let mut entries = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "comment" => {},
            "pair" => {
                let missing = || {
                    return SignatureError::NonLiteralDefault {
                        text: text(child, source),
                    };
                };
                let key = child.child_by_field_name("key").ok_or_else(missing)?;
                let value = child.child_by_field_name("value").ok_or_else(missing)?;
                entries.push(format!(
                    "{}: {}",
                    render_literal(key, source)?,
                    render_literal(value, source)?
                ));
            },
            _ => {
                return Err(SignatureError::NonLiteralDefault {
                    text: text(child, source),
                });
            },
        }
    }
    return Ok(format!("{{{}}}", entries.join(", ")));
}

/// `-1`, `+2.5`: a sign applied directly to a number.
fn render_signed(node: Node<'_>, source: &str) -> Option<String> {
    let operator = node.child_by_field_name("operator")?;
    let argument = node.child_by_field_name("argument")?;
    if !matches!(argument.kind(), "integer" | "float") {
        return None;
    }
    let magnitude = render_literal(argument, source).ok()?;
    return match operator.kind() {
        "-" => Some(format!("-{magnitude}")),
        "+" => Some(magnitude),
        _ => None,
    };
}

/// `1+2j` / `-1-2j`: a real part combined with an imaginary literal.
fn render_complex(node: Node<'_>, source: &str) -> Option<String> {
    let left = node.child_by_field_name("left")?;
    let operator = node.child_by_field_name("operator")?;
    let right = node.child_by_field_name("right")?;

    let real = match left.kind() {
        "integer" | "float" => render_literal(left, source).ok()?,
        "unary_operator" => render_signed(left, source)?,
        _ => return None,
    };
    let imaginary = text(right, source);
    if !matches!(right.kind(), "integer" | "float") || !imaginary.to_ascii_lowercase().ends_with('j') {
        return None;
    }
    let sign = match operator.kind() {
        "+" => '+',
        "-" => '-',
        _ => return None,
    };
    return Some(format!("({real}{sign}{})", imaginary.to_ascii_lowercase().replace('_', "")));
}

/// Normalise hex/octal/binary/underscored integers to decimal.
fn render_integer(raw: &str) -> String {
    let digits = raw.replace('_', "").to_ascii_lowercase();
    if digits.ends_with('j') {
        return digits;
    }

    let parsed = if let Some(hex) = digits.strip_prefix("0x") {
        i128::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = digits.strip_prefix("0o") {
        i128::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = digits.strip_prefix("0b") {
        i128::from_str_radix(bin, 2).ok()
    } else {
        digits.parse::<i128>().ok()
    };

    return parsed.map_or(digits, |n| return n.to_string());
}

/// Render a float the shortest way that round-trips, always with a `.` or exponent.
fn render_float(raw: &str) -> String {
    let digits = raw.replace('_', "").to_ascii_lowercase();
    if digits.ends_with('j') {
        return digits;
    }
    return digits
        .parse::<f64>()
        .map_or(digits, |value| return float_repr(value));
}

/// `{:?}` switches to exponent form at the same magnitudes Python's `repr`
/// does; Python also signs the exponent and pads it to two digits.
fn float_repr(value: f64) -> String {
    let shortest = format!("{value:?}");
    let Some((mantissa, exponent)) = shortest.split_once('e') else {
        return shortest;
    };
    let (sign, magnitude) = match exponent.strip_prefix('-') {
        Some(rest) => ('-', rest),
        None => ('+', exponent),
    };
    return format!("{mantissa}e{sign}{magnitude:0>2}");
}

/// Render a string or bytes literal.
fn render_string(node: Node<'_>, source: &str) -> Option<String> {
    if let Some(value) = docstring::string_value(node, source) {
        return Some(repr_str(&value));
    }

    // Bytes keep their source spelling; f-strings are expressions.
    let raw = text(node, source);
    let prefix: String = raw.chars().take_while(|c| return c.is_ascii_alphabetic()).collect();
    let prefix = prefix.to_ascii_lowercase();
    if prefix.contains('b') && !prefix.contains('f') {
        return Some(raw);
    }
    return None;
}

/// Python `repr` of a `str`: single quotes unless the value contains only `'`.
fn repr_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') { '"' } else { '\'' };
    let mut out = String::with_capacity(value.len().saturating_add(2));
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            },
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", u32::from(c));
            },
            c => out.push(c),
        }
    }
    out.push(quote);
    return out;
}

/// UTF-8 text of a node, empty on decode failure.
fn text(node: Node<'_>, source: &str) -> String {
    return node.utf8_text(source.as_bytes()).unwrap_or("").to_string();
}
