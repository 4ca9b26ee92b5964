//! Surface syntax of emitted code: identifiers and literal rendering
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use crate::value::Value;
use regex::Regex;
use std::fmt::Write;
use std::sync::OnceLock;

static IDENTIFIER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Words that cannot be used as names in emitted code
pub const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

fn identifier_regex() -> &'static Regex {
    IDENTIFIER_REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
    })
}

/// Whether `name` can be emitted as a bare identifier
pub fn is_identifier(name: &str) -> bool {
    identifier_regex().is_match(name) && !KEYWORDS.contains(&name)
}

/// Turn an arbitrary declared name into an identifier, or `None` when nothing
/// usable remains (e.g. an empty name)
pub fn sanitize_identifier(name: &str) -> Option<String> {
    let mut sanitized: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if sanitized.is_empty() || sanitized.chars().all(|c| c == '_') {
        return None;
    }
    if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
        sanitized.insert(0, '_');
    }
    if KEYWORDS.contains(&sanitized.as_str()) {
        sanitized.push('_');
    }
    Some(sanitized)
}

/// Total predicate: can `value` be emitted as literal source text?
///
/// Scalars are literal-safe except non-finite floats; lists, tuples and maps
/// are literal-safe when every element is. Map keys must additionally be
/// hashable, so lists and maps are rejected as keys. Objects and functions
/// never are.
pub fn is_literal_safe(value: &Value) -> bool {
    match value {
        Value::None | Value::Bool(_) | Value::Int(_) | Value::Str(_) => true,
        Value::Float(f) => f.is_finite(),
        Value::List(items) | Value::Tuple(items) => items.iter().all(is_literal_safe),
        Value::Map(entries) => entries
            .iter()
            .all(|(k, v)| is_hashable_literal(k) && is_literal_safe(v)),
        Value::Object(_) | Value::Function(_) => false,
    }
}

fn is_hashable_literal(value: &Value) -> bool {
    match value {
        Value::List(_) | Value::Map(_) => false,
        Value::Tuple(items) => items.iter().all(is_hashable_literal),
        other => is_literal_safe(other),
    }
}

/// Render `value` as literal source text when it is literal-safe
pub fn render_literal(value: &Value) -> Option<String> {
    if !is_literal_safe(value) {
        return None;
    }
    let mut out = String::new();
    write_literal(&mut out, value);
    Some(out)
}

fn write_literal(out: &mut String, value: &Value) {
    match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(n) => {
            let _ = write!(out, "{}", n);
        }
        Value::Float(f) => {
            // Debug keeps a fractional part ("1.0") so the literal stays a float
            let _ = write!(out, "{:?}", f);
        }
        Value::Str(s) => quote_str(out, s),
        Value::List(items) => {
            out.push('[');
            write_items(out, items);
            out.push(']');
        }
        Value::Tuple(items) => {
            out.push('(');
            write_items(out, items);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::Map(entries) => {
            out.push('{');
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_literal(out, k);
                out.push_str(": ");
                write_literal(out, v);
            }
            out.push('}');
        }
        Value::Object(_) | Value::Function(_) => {}
    }
}

fn write_items(out: &mut String, items: &[Value]) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_literal(out, item);
    }
}

/// Quote a string the way emitted code expects it
pub fn quote_str(out: &mut String, s: &str) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
}
