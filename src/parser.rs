//! Input Parser
//!
//! Turns one raw input string into an [`ActivityRecord`]. Structured
//! objects are tried first, flat rows second; the order must not change.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ParseError;
use crate::record::ActivityRecord;

const BOM: char = '\u{feff}';
const FIELD_SEPARATOR: char = ',';
const QUOTE: char = '"';

/// Key aliases: `(field, fallback key used when the field is absent)`
const FIELD_ALIASES: &[(&str, &str)] = &[("threat_label", "label"), ("request_path", "file_name")];

/// Input format that produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Object,
    Row,
}

/// Parse a raw record, reporting which format matched
pub fn parse_with_format(raw: &str) -> Result<(ActivityRecord, InputFormat), ParseError> {
    let input = raw.strip_prefix(BOM).unwrap_or(raw);

    if let Some(record) = parse_object(input) {
        debug!(format = "object", "Parsed activity input");
        return Ok((record, InputFormat::Object));
    }

    if let Some(record) = parse_row(input) {
        debug!(format = "row", "Parsed activity input");
        return Ok((record, InputFormat::Row));
    }

    debug!(input_len = raw.len(), "Activity input matched no format");
    Err(ParseError::new())
}

/// Parse a raw record
pub fn parse(raw: &str) -> Result<ActivityRecord, ParseError> {
    parse_with_format(raw).map(|(record, _)| record)
}

/// Parse a single JSON object. Returns `None` for anything that is not
/// syntactically a JSON object.
pub fn parse_object(input: &str) -> Option<ActivityRecord> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let object = match serde_json::from_str::<Value>(trimmed).ok()? {
        Value::Object(object) => object,
        _ => return None,
    };

    let fields = crate::record::FIELD_ORDER.map(|field| lookup(&object, field));
    Some(ActivityRecord::from_fields(fields))
}

fn lookup(object: &Map<String, Value>, field: &str) -> String {
    if let Some(value) = object.get(field) {
        return coerce(value);
    }

    FIELD_ALIASES
        .iter()
        .find(|(name, _)| *name == field)
        .and_then(|(_, alias)| object.get(*alias))
        .map(coerce)
        .unwrap_or_default()
}

/// String form of a JSON value. `null` becomes the empty string.
fn coerce(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Parse a flat row of exactly ten fields
pub fn parse_row(input: &str) -> Option<ActivityRecord> {
    let normalized = normalize_line_endings(input);
    let line = normalized.trim();
    if line.is_empty() {
        return None;
    }

    let fields: [String; 10] = split_row(line)?.try_into().ok()?;
    Some(ActivityRecord::from_fields(fields))
}

/// CRLF and bare CR become LF
pub fn normalize_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    FieldStart,
    Unquoted,
    Quoted,
    QuoteInQuoted,
}

/// Quote-aware split of one row into trimmed fields.
///
/// A quoted field may hold separators and line breaks; `""` inside it is a
/// literal quote. Returns `None` on an unterminated quote or when anything
/// but whitespace follows the first row.
pub fn split_row(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut state = SplitState::FieldStart;

    for (idx, c) in line.char_indices() {
        match state {
            SplitState::FieldStart => match c {
                QUOTE => state = SplitState::Quoted,
                FIELD_SEPARATOR => fields.push(take_field(&mut current)),
                '\n' => return finish_row(fields, current, &line[idx..]),
                c if c.is_whitespace() => {}
                c => {
                    current.push(c);
                    state = SplitState::Unquoted;
                }
            },
            SplitState::Unquoted => match c {
                FIELD_SEPARATOR => {
                    fields.push(take_field(&mut current));
                    state = SplitState::FieldStart;
                }
                '\n' => return finish_row(fields, current, &line[idx..]),
                c => current.push(c),
            },
            SplitState::Quoted => match c {
                QUOTE => state = SplitState::QuoteInQuoted,
                c => current.push(c),
            },
            SplitState::QuoteInQuoted => match c {
                QUOTE => {
                    current.push(QUOTE);
                    state = SplitState::Quoted;
                }
                FIELD_SEPARATOR => {
                    fields.push(take_field(&mut current));
                    state = SplitState::FieldStart;
                }
                '\n' => return finish_row(fields, current, &line[idx..]),
                c => {
                    current.push(c);
                    state = SplitState::Unquoted;
                }
            },
        }
    }

    if state == SplitState::Quoted {
        return None;
    }

    fields.push(take_field(&mut current));
    Some(fields)
}

fn take_field(current: &mut String) -> String {
    let field = current.trim().to_string();
    current.clear();
    field
}

fn finish_row(mut fields: Vec<String>, mut current: String, rest: &str) -> Option<Vec<String>> {
    if !rest.trim().is_empty() {
        return None;
    }
    fields.push(take_field(&mut current));
    Some(fields)
}
