//! Recovery of structured JSON from free-text model output
//!
//! Models wrap JSON in code fences, surround it with commentary, add
//! comments and trailing commas, and emit raw control characters inside
//! strings. The sanitizer undoes each of these in turn:
//!
//! 1. unwrap a fenced code block
//! 2. narrow to the outermost array or object
//! 3. strip `//` and `/* */` comments outside strings
//! 4. drop commas directly before `]` or `}`
//! 5. decode, escaping control characters and retrying once if the
//!    decoder rejected one

use crate::error::ParseError;
use serde_json::{Map, Value};
use std::iter::Peekable;
use std::str::Chars;

const FENCE: &str = "```";
const CONTEXT_CHARS: usize = 500;

/// A decoded model response: always a list or a map
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedPayload {
    /// Top-level JSON array
    List(Vec<Value>),
    /// Top-level JSON object
    Map(Map<String, Value>),
}

impl ParsedPayload {
    /// Convert back into a JSON value
    pub fn into_value(self) -> Value {
        match self {
            ParsedPayload::List(items) => Value::Array(items),
            ParsedPayload::Map(map) => Value::Object(map),
        }
    }

    /// Whether the payload is a list
    pub fn is_list(&self) -> bool {
        matches!(self, ParsedPayload::List(_))
    }
}

/// Recover a JSON list or map from raw model output
pub fn extract_json(raw: &str) -> Result<ParsedPayload, ParseError> {
    let mut first_error = None;
    for candidate in narrow(unwrap_fence(raw)) {
        match decode(candidate) {
            Ok(payload) => return Ok(payload),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    Err(first_error.unwrap_or_else(|| ParseError {
        message: "no JSON candidate in response".to_string(),
        context: String::new(),
        line: 0,
        column: 0,
    }))
}

fn decode(candidate: &str) -> Result<ParsedPayload, ParseError> {
    let cleaned = remove_trailing_commas(&strip_comments(candidate));

    let value = match serde_json::from_str::<Value>(&cleaned) {
        Ok(value) => value,
        Err(e) if e.to_string().contains("control character") => {
            let escaped = escape_control_chars(&cleaned);
            serde_json::from_str::<Value>(&escaped).map_err(|e| decode_error(&escaped, &e))?
        }
        Err(e) => return Err(decode_error(&cleaned, &e)),
    };

    match value {
        Value::Array(items) => Ok(ParsedPayload::List(items)),
        Value::Object(map) => Ok(ParsedPayload::Map(map)),
        other => Err(ParseError {
            message: format!("expected a JSON object or array, found {}", kind(&other)),
            context: window(&cleaned, 0),
            line: 0,
            column: 0,
        }),
    }
}

/// Take the interior of the first fenced block, skipping its language tag
fn unwrap_fence(raw: &str) -> &str {
    let Some(open) = raw.find(FENCE) else {
        return raw;
    };
    let rest = &raw[open + FENCE.len()..];
    let tag_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '+'))
        .unwrap_or(rest.len());
    let body = &rest[tag_len..];
    match body.find(FENCE) {
        Some(close) => &body[..close],
        None => body,
    }
}

/// Candidate literals to decode, in order
///
/// Text starting with `[` narrows to the outermost brackets, otherwise to
/// the outermost braces when present. A bracket span enclosing those braces
/// follows as a fallback, for prose ahead of a list of objects.
fn narrow(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let brackets = trimmed.find('[').zip(trimmed.rfind(']')).filter(|(s, e)| s < e);
    let braces = trimmed.find('{').zip(trimmed.rfind('}')).filter(|(s, e)| s < e);

    match (brackets, braces) {
        (Some(list), _) if trimmed.starts_with('[') => vec![span(trimmed, list)],
        (Some(list), Some(obj)) if list.0 < obj.0 && list.1 > obj.1 => vec![span(trimmed, obj), span(trimmed, list)],
        (_, Some(obj)) => vec![span(trimmed, obj)],
        (Some(list), None) => vec![span(trimmed, list)],
        (None, None) => vec![trimmed],
    }
}

fn span(text: &str, (start, end): (usize, usize)) -> &str {
    &text[start..=end]
}

/// Scanner states shared by the comment stripper and the control-character escaper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Normal,
    InString,
    EscapePending,
    LineComment,
    BlockComment,
}

/// Advance the string-tracking states; returns the state after `c`
fn string_step(state: ScanState, c: char) -> ScanState {
    match (state, c) {
        (ScanState::Normal, '"') => ScanState::InString,
        (ScanState::InString, '\\') => ScanState::EscapePending,
        (ScanState::InString, '"') => ScanState::Normal,
        (ScanState::EscapePending, _) => ScanState::InString,
        (state, _) => state,
    }
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars: Peekable<Chars<'_>> = text.chars().peekable();
    let mut state = ScanState::Normal;

    while let Some(c) = chars.next() {
        match state {
            ScanState::Normal if c == '/' && chars.peek() == Some(&'/') => {
                chars.next();
                state = ScanState::LineComment;
            }
            ScanState::Normal if c == '/' && chars.peek() == Some(&'*') => {
                chars.next();
                state = ScanState::BlockComment;
            }
            ScanState::LineComment => {
                if c == '\n' {
                    out.push(c);
                    state = ScanState::Normal;
                }
            }
            ScanState::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    state = ScanState::Normal;
                }
            }
            _ => {
                out.push(c);
                state = string_step(state, c);
            }
        }
    }
    out
}

fn remove_trailing_commas(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut state = ScanState::Normal;

    for (i, &c) in chars.iter().enumerate() {
        if state == ScanState::Normal && c == ',' {
            let next = chars[i + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some(&']') | Some(&'}')) {
                continue;
            }
        }
        out.push(c);
        state = string_step(state, c);
    }
    out
}

fn escape_control_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    let mut state = ScanState::Normal;

    for c in text.chars() {
        if state == ScanState::InString && (c as u32) < 0x20 {
            match c {
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                '\u{08}' => out.push_str("\\b"),
                '\u{0c}' => out.push_str("\\f"),
                other => out.push_str(&format!("\\u{:04x}", other as u32)),
            }
            continue;
        }
        out.push(c);
        state = string_step(state, c);
    }
    out
}

fn decode_error(text: &str, error: &serde_json::Error) -> ParseError {
    let offset = offset_of(text, error.line(), error.column());
    ParseError {
        message: error.to_string(),
        context: window(text, offset),
        line: error.line(),
        column: error.column(),
    }
}

/// Byte offset of a 1-based line/column position, clamped to the text
fn offset_of(text: &str, line: usize, column: usize) -> usize {
    let line_start: usize = text
        .split_inclusive('\n')
        .take(line.saturating_sub(1))
        .map(str::len)
        .sum();
    let mut offset = (line_start + column.saturating_sub(1)).min(text.len());
    while !text.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Up to `CONTEXT_CHARS` characters centred on `offset`
fn window(text: &str, offset: usize) -> String {
    let half = CONTEXT_CHARS / 2;
    let before: Vec<char> = text[..offset].chars().rev().take(half).collect();
    let after = text[offset..].chars().take(CONTEXT_CHARS - before.len());
    before.into_iter().rev().chain(after).collect()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
