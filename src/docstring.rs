//! Docstring extraction: the leading string literal of a body, cleaned the
//! way `inspect.cleandoc` cleans it.

use tree_sitter::Node;

/// Return the cleaned docstring of a `block` node, if its first statement is
/// a plain (non-f, non-bytes) string literal.
pub fn from_block(block: Node<'_>, source: &str) -> Option<String> {
    let first = first_statement(block)?;
    if first.kind() != "expression_statement" || first.named_child_count() != 1 {
        return None;
    }
    let literal = first.named_child(0)?;
    let raw = string_value(literal, source)?;
    return Some(clean(&raw));
}

/// First named child that isn't a comment.
fn first_statement(block: Node<'_>) -> Option<Node<'_>> {
    let mut cursor = block.walk();
    return block
        .named_children(&mut cursor)
        .find(|n| return n.kind() != "comment");
}

/// Decode a `string` or `concatenated_string` node into its runtime value.
/// Returns `None` for f-strings and bytes, which are not docstrings.
pub fn string_value(node: Node<'_>, source: &str) -> Option<String> {
    return match node.kind() {
        "string" => decode_literal(node.utf8_text(source.as_bytes()).ok()?),
        "concatenated_string" => {
            let mut out = String::new();
            let mut cursor = node.walk();
            for part in node.named_children(&mut cursor) {
                if part.kind() != "string" {
                    continue;
                }
                out.push_str(&decode_literal(part.utf8_text(source.as_bytes()).ok()?)?);
            }
            Some(out)
        },
        _ => None,
    };
}

/// Split a literal like `r"""x"""` into prefix and body, then unescape.
fn decode_literal(text: &str) -> Option<String> {
    let quote_at = text.find(['"', '\''])?;
    let (prefix, quoted) = text.split_at(quote_at);
    let prefix = prefix.to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let body = strip_quotes(quoted)?;
    if prefix.contains('r') {
        return Some(body.to_string());
    }
    return Some(unescape(body));
}

/// Remove matching triple or single quotes from both ends.
fn strip_quotes(quoted: &str) -> Option<&str> {
    for delim in ["\"\"\"", "'''", "\"", "'"] {
        if quoted.len() < delim.len().saturating_mul(2) {
            continue;
        }
        if let Some(inner) = quoted.strip_prefix(delim).and_then(|s| return s.strip_suffix(delim)) {
            return Some(inner);
        }
    }
    return None;
}

/// Apply Python's escape sequences. Unknown escapes keep their backslash.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(next) = chars.next() else {
            out.push('\\');
            break;
        };
        match next {
            '\n' => {},
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\u{7}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\u{b}'),
            'x' => push_hex_escape(&mut out, &mut chars, 2, 'x'),
            'u' => push_hex_escape(&mut out, &mut chars, 4, 'u'),
            'U' => push_hex_escape(&mut out, &mut chars, 8, 'U'),
            other => {
                out.push('\\');
                out.push(other);
            },
        }
    }
    return out;
}

/// Consume exactly `width` hex digits and push the code point they name.
/// Malformed escapes are copied through verbatim.
fn push_hex_escape(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    width: usize,
    marker: char,
) {
    let mut digits = String::with_capacity(width);
    while digits.len() < width {
        match chars.peek() {
            Some(d) if d.is_ascii_hexdigit() => {
                digits.push(*d);
                chars.next();
            },
            _ => break,
        }
    }

    let decoded = (digits.len() == width)
        .then(|| return u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32);

    match decoded {
        Some(ch) => out.push(ch),
        None => {
            out.push('\\');
            out.push(marker);
            out.push_str(&digits);
        },
    }
}

/// Expand tabs to 8-column stops.
fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0usize;
    for c in line.chars() {
        if c == '\t' {
            let pad = 8usize.saturating_sub(column % 8);
            out.extend(std::iter::repeat_n(' ', pad));
            column = column.saturating_add(pad);
        } else {
            out.push(c);
            column = if c == '\n' { 0 } else { column.saturating_add(1) };
        }
    }
    return out;
}

/// Uniformly remove the indentation of the second and later lines, strip the
/// first line's leading whitespace, and drop blank lines at both ends.
pub fn clean(raw: &str) -> String {
    let expanded = expand_tabs(raw);
    let mut lines: Vec<&str> = expanded.split('\n').collect();

    let margin = lines
        .iter()
        .skip(1)
        .filter(|l| return !l.trim_start().is_empty())
        .map(|l| return l.len().saturating_sub(l.trim_start().len()))
        .min();

    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.drain(..).enumerate() {
        if i == 0 {
            cleaned.push(line.trim_start().to_string());
            continue;
        }
        let Some(margin) = margin else {
            cleaned.push(line.to_string());
            continue;
        };
        cleaned.push(line.get(margin..).unwrap_or("").to_string());
    }

    while cleaned.last().is_some_and(String::is_empty) {
        cleaned.pop();
    }
    let leading = cleaned.iter().take_while(|l| return l.is_empty()).count();
    return cleaned.split_off(leading).join("\n");
}
