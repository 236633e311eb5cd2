//! Python literals: decoding string nodes and rendering values the way
//! Python's `repr()` prints them.

use tree_sitter::Node;

use crate::parse::node_text;

// ============================================================================
// String nodes
// ============================================================================

/// Decoded value of a non-formatted string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringValue {
    Str(String),
    Bytes(Vec<u8>),
}

impl StringValue {
    pub fn repr(&self) -> String {
        match self {
            StringValue::Str(value) => repr_str(value),
            StringValue::Bytes(value) => repr_bytes(value),
        }
    }
}

/// A piece of a formatted string: literal text or an interpolated expression.
#[derive(Debug, Clone)]
pub enum FormattedPart<'t> {
    Text(String),
    Expression(Node<'t>),
}

/// Contents of a `string` or `concatenated_string` node.
#[derive(Debug, Clone)]
pub enum StringLiteral<'t> {
    Plain(StringValue),
    Formatted(Vec<FormattedPart<'t>>),
}

#[derive(Debug, Clone, Copy, Default)]
struct Prefix {
    raw: bool,
    bytes: bool,
    formatted: bool,
}

impl Prefix {
    /// Read the prefix letters of a `string_start` token (`rb'`, `f"""`).
    fn parse(start: &str) -> Prefix {
        let mut prefix = Prefix::default();
        for c in start.chars() {
            match c {
                'r' | 'R' => prefix.raw = true,
                'b' | 'B' => prefix.bytes = true,
                'f' | 'F' => prefix.formatted = true,
                'u' | 'U' => {}
                _ => break,
            }
        }
        prefix
    }
}

/// Parse a `string` or `concatenated_string` node.
///
/// Returns `None` for any other node kind.
pub fn string_literal<'t>(node: Node<'t>, source: &str) -> Option<StringLiteral<'t>> {
    match node.kind() {
        "string" => Some(single_string(node, source)),
        "concatenated_string" => {
            let mut cursor = node.walk();
            let pieces: Vec<_> = node
                .named_children(&mut cursor)
                .filter(|child| child.kind() == "string")
                .map(|child| single_string(child, source))
                .collect();
            Some(concatenate(pieces))
        }
        _ => None,
    }
}

fn single_string<'t>(node: Node<'t>, source: &str) -> StringLiteral<'t> {
    let text = node_text(node, source);
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();

    let start = children.iter().find(|c| c.kind() == "string_start");
    let end = children.iter().find(|c| c.kind() == "string_end");
    let prefix = Prefix::parse(start.map(|s| node_text(*s, source)).unwrap_or(text));

    if !prefix.formatted {
        let body_start = start.map(|s| s.end_byte()).unwrap_or(node.start_byte());
        let body_end = end.map(|e| e.start_byte()).unwrap_or(node.end_byte());
        let body = source.get(body_start..body_end).unwrap_or("");
        let value = if prefix.bytes {
            StringValue::Bytes(decode_bytes(body, prefix.raw))
        } else {
            StringValue::Str(decode_str(body, prefix.raw))
        };
        return StringLiteral::Plain(value);
    }

    let mut parts = Vec::new();
    let mut pending = String::new();
    for child in children {
        match child.kind() {
            "string_content" => {
                let decoded = decode_str(node_text(child, source), prefix.raw);
                pending.push_str(&decoded.replace("{{", "{").replace("}}", "}"));
            }
            "interpolation" => {
                if let Some(expression) = child.child_by_field_name("expression") {
                    if !pending.is_empty() {
                        parts.push(FormattedPart::Text(std::mem::take(&mut pending)));
                    }
                    parts.push(FormattedPart::Expression(expression));
                }
            }
            _ => {}
        }
    }
    if !pending.is_empty() {
        parts.push(FormattedPart::Text(pending));
    }
    StringLiteral::Formatted(parts)
}

/// Merge implicitly concatenated literals (`"a" "b"`, `"a" f"{b}"`).
fn concatenate(pieces: Vec<StringLiteral<'_>>) -> StringLiteral<'_> {
    let formatted = pieces
        .iter()
        .any(|piece| matches!(piece, StringLiteral::Formatted(_)));

    if formatted {
        let mut parts: Vec<FormattedPart<'_>> = Vec::new();
        for piece in pieces {
            let piece_parts = match piece {
                StringLiteral::Formatted(parts) => parts,
                StringLiteral::Plain(StringValue::Str(text)) => vec![FormattedPart::Text(text)],
                StringLiteral::Plain(StringValue::Bytes(bytes)) => {
                    vec![FormattedPart::Text(String::from_utf8_lossy(&bytes).into_owned())]
                }
            };
            for part in piece_parts {
                if let FormattedPart::Text(text) = &part {
                    if let Some(FormattedPart::Text(prev)) = parts.last_mut() {
                        prev.push_str(text);
                        continue;
                    }
                }
                parts.push(part);
            }
        }
        return StringLiteral::Formatted(parts);
    }

    let all_bytes = !pieces.is_empty()
        && pieces
            .iter()
            .all(|piece| matches!(piece, StringLiteral::Plain(StringValue::Bytes(_))));
    if all_bytes {
        let mut bytes = Vec::new();
        for piece in pieces {
            if let StringLiteral::Plain(StringValue::Bytes(b)) = piece {
                bytes.extend(b);
            }
        }
        return StringLiteral::Plain(StringValue::Bytes(bytes));
    }

    let mut text = String::new();
    for piece in pieces {
        match piece {
            StringLiteral::Plain(StringValue::Str(s)) => text.push_str(&s),
            StringLiteral::Plain(StringValue::Bytes(b)) => text.push_str(&String::from_utf8_lossy(&b)),
            StringLiteral::Formatted(_) => {}
        }
    }
    StringLiteral::Plain(StringValue::Str(text))
}

// ============================================================================
// Escape decoding
// ============================================================================

fn take_digits(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    max: usize,
    radix: u32,
) -> String {
    let mut digits = String::new();
    while digits.len() < max {
        match chars.peek() {
            Some(c) if c.is_digit(radix) => {
                digits.push(*c);
                chars.next();
            }
            _ => break,
        }
    }
    digits
}

/// Decode the body of a `str` literal.
pub fn decode_str(body: &str, raw: bool) -> String {
    if raw {
        return body.to_string();
    }

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
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' | '\'' | '"' => out.push(next),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut digits = next.to_string();
                digits.push_str(&take_digits(&mut chars, 2, 8));
                let code = u32::from_str_radix(&digits, 8).unwrap_or(0);
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            'x' | 'u' | 'U' => {
                let width = match next {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let digits = take_digits(&mut chars, width, 16);
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == width => out.push(decoded),
                    _ => {
                        out.push('\\');
                        out.push(next);
                        out.push_str(&digits);
                    }
                }
            }
            other => {
                // Unknown escapes (and `\N{...}`) are kept verbatim.
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}

/// Decode the body of a `bytes` literal.
pub fn decode_bytes(body: &str, raw: bool) -> Vec<u8> {
    if raw {
        return body.as_bytes().to_vec();
    }

    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut buf = [0u8; 4];
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let Some(next) = chars.next() else {
            out.push(b'\\');
            break;
        };
        match next {
            '\n' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\\' | '\'' | '"' => out.push(next as u8),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0c),
            'n' => out.push(b'\n'),
            'r' => out.push(b'\r'),
            't' => out.push(b'\t'),
            'v' => out.push(0x0b),
            '0'..='7' => {
                let mut digits = next.to_string();
                digits.push_str(&take_digits(&mut chars, 2, 8));
                let code = u32::from_str_radix(&digits, 8).unwrap_or(0);
                out.push((code & 0xff) as u8);
            }
            'x' => {
                let digits = take_digits(&mut chars, 2, 16);
                match u8::from_str_radix(&digits, 16) {
                    Ok(byte) if digits.len() == 2 => out.push(byte),
                    _ => {
                        out.extend_from_slice(b"\\x");
                        out.extend_from_slice(digits.as_bytes());
                    }
                }
            }
            other => {
                out.push(b'\\');
                out.extend_from_slice(other.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out
}

// ============================================================================
// repr()
// ============================================================================

/// Render a string the way Python's `repr()` does.
///
/// Single quotes unless the text contains a single quote and no double quote.
pub fn repr_str(value: &str) -> String {
    let quote = if value.contains('\'') && !value.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(value.len() + 2);
    out.push(quote);
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() || (c.is_whitespace() && c != ' ') => {
                let code = c as u32;
                if code <= 0xff {
                    out.push_str(&format!("\\x{:02x}", code));
                } else if code <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", code));
                } else {
                    out.push_str(&format!("\\U{:08x}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Render bytes the way Python's `repr()` does (`b'...'`).
pub fn repr_bytes(value: &[u8]) -> String {
    let quote = if value.contains(&b'\'') && !value.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };

    let mut out = String::with_capacity(value.len() + 3);
    out.push('b');
    out.push(quote as char);
    for &byte in value {
        match byte {
            b'\\' => out.push_str("\\\\"),
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b if b == quote => {
                out.push('\\');
                out.push(b as char);
            }
            b if !(0x20..0x7f).contains(&b) => out.push_str(&format!("\\x{:02x}", b)),
            b => out.push(b as char),
        }
    }
    out.push(quote as char);
    out
}

/// Render an `integer` literal as Python prints its value.
///
/// Underscores are dropped and hexadecimal, octal and binary forms are
/// converted to decimal; imaginary literals keep their `j` suffix.
pub fn repr_integer(text: &str) -> String {
    let cleaned = text.replace('_', "");
    if let Some(imag) = cleaned.strip_suffix(['j', 'J']) {
        return repr_imaginary(imag);
    }
    let cleaned = cleaned.trim_end_matches(['l', 'L']);

    let lower = cleaned.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    match u128::from_str_radix(digits, radix) {
        Ok(value) => value.to_string(),
        Err(_) => cleaned.to_string(),
    }
}

/// Render a `float` literal as Python's `repr()` of its value.
pub fn repr_float(text: &str) -> String {
    let cleaned = text.replace('_', "");
    if let Some(imag) = cleaned.strip_suffix(['j', 'J']) {
        return repr_imaginary(imag);
    }
    match cleaned.parse::<f64>() {
        Ok(value) => python_float_repr(value),
        Err(_) => cleaned,
    }
}

fn repr_imaginary(magnitude: &str) -> String {
    let value = match magnitude.parse::<f64>() {
        Ok(value) => python_float_repr(value),
        Err(_) => return format!("{}j", magnitude),
    };
    let value = value.strip_suffix(".0").unwrap_or(&value);
    format!("{}j", value)
}

/// Shortest round-trip representation, switching to exponent notation
/// outside `[1e-4, 1e16)` like CPython.
pub fn python_float_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-4..1e16).contains(&magnitude) {
        let text = value.to_string();
        if text.contains('.') {
            return text;
        }
        return format!("{}.0", text);
    }

    let text = format!("{:e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => text,
    }
}

/// Python `repr()` of a constant node, or `None` if the node is not a
/// constant (formatted strings are not constants).
pub fn constant_repr(node: Node<'_>, source: &str) -> Option<String> {
    match node.kind() {
        "integer" => Some(repr_integer(node_text(node, source))),
        "float" => Some(repr_float(node_text(node, source))),
        "true" => Some("True".to_string()),
        "false" => Some("False".to_string()),
        "none" => Some("None".to_string()),
        "ellipsis" => Some("Ellipsis".to_string()),
        "string" | "concatenated_string" => match string_literal(node, source)? {
            StringLiteral::Plain(value) => Some(value.repr()),
            StringLiteral::Formatted(_) => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repr_str_quote_selection() {
        assert_eq!(repr_str("abc"), "'abc'");
        assert_eq!(repr_str("it's"), "\"it's\"");
        assert_eq!(repr_str("both ' and \""), "'both \\' and \"'");
        assert_eq!(repr_str("say \"hi\""), "'say \"hi\"'");
    }

    #[test]
    fn test_repr_str_escapes() {
        assert_eq!(repr_str("a\nb\tc"), "'a\\nb\\tc'");
        assert_eq!(repr_str("back\\slash"), "'back\\\\slash'");
        assert_eq!(repr_str("\x01"), "'\\x01'");
        assert_eq!(repr_str("caf\u{e9}"), "'caf\u{e9}'");
    }

    #[test]
    fn test_repr_bytes() {
        assert_eq!(repr_bytes(b"abc"), "b'abc'");
        assert_eq!(repr_bytes(b"\x00\xff"), "b'\\x00\\xff'");
        assert_eq!(repr_bytes(b"it's"), "b\"it's\"");
    }

    #[test]
    fn test_decode_str_escapes() {
        assert_eq!(decode_str("a\\nb", false), "a\nb");
        assert_eq!(decode_str("a\\nb", true), "a\\nb");
        assert_eq!(decode_str("\\x41\\u00e9\\101", false), "A\u{e9}A");
        assert_eq!(decode_str("\\q", false), "\\q");
        assert_eq!(decode_str("line\\\ncontinued", false), "linecontinued");
    }

    #[test]
    fn test_decode_bytes_escapes() {
        assert_eq!(decode_bytes("\\x00a\\n", false), vec![0, b'a', b'\n']);
        assert_eq!(decode_bytes("\\u1234", false), b"\\u1234".to_vec());
    }

    #[test]
    fn test_repr_integer() {
        assert_eq!(repr_integer("42"), "42");
        assert_eq!(repr_integer("1_000"), "1000");
        assert_eq!(repr_integer("0x10"), "16");
        assert_eq!(repr_integer("0o17"), "15");
        assert_eq!(repr_integer("0b101"), "5");
        assert_eq!(repr_integer("3j"), "3j");
    }

    #[test]
    fn test_repr_float() {
        assert_eq!(repr_float("1.0"), "1.0");
        assert_eq!(repr_float("1."), "1.0");
        assert_eq!(repr_float(".5"), "0.5");
        assert_eq!(repr_float("1e3"), "1000.0");
        assert_eq!(repr_float("1e16"), "1e+16");
        assert_eq!(repr_float("1.5e-7"), "1.5e-07");
        assert_eq!(repr_float("0.0001"), "0.0001");
        assert_eq!(repr_float("2.5j"), "2.5j");
        assert_eq!(repr_float("1.0j"), "1j");
    }
}
