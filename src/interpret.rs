//! Best-effort interpretation of raw model output.
//!
//! [`interpret`] looks for a bracketed key/value group in the model's
//! free-text response and produces a [`StructuredResult`]. It is deliberately
//! lenient: unparseable or partially structured output is not an error, it
//! degrades to carrying the whole raw text as a fallback. A request must
//! never fail merely because a non-deterministic text model strayed from the
//! expected shape.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

/// Fallback text used when the model returned nothing usable at all
/// (empty body, or only a reasoning block). Keeps the result non-empty.
pub const EMPTY_RESPONSE: &str = "(empty response)";

/// A single extracted field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A scalar value, stringified.
    Text(String),
    /// A list of stringified values.
    List(Vec<String>),
}

impl FieldValue {
    /// The scalar text, if this is a `Text` value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    /// The items, if this is a `List` value.
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            FieldValue::Text(_) => None,
            FieldValue::List(items) => Some(items),
        }
    }
}

/// The normalized output returned to callers.
///
/// Carries either a non-empty field mapping (structured extraction
/// succeeded) or a non-empty raw-text fallback (it did not), never both
/// empty. No server-side persistence; the lifetime is one request cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredResult {
    /// The mode that produced this result.
    pub mode: String,

    /// Extracted fields, empty when extraction degraded.
    pub fields: BTreeMap<String, FieldValue>,

    /// The whole raw text, present only when extraction degraded.
    #[serde(rename = "result", skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
}

impl StructuredResult {
    /// A result with extracted fields and no fallback.
    pub fn structured(mode: impl Into<String>, fields: BTreeMap<String, FieldValue>) -> Self {
        Self {
            mode: mode.into(),
            fields,
            fallback: None,
        }
    }

    /// A degraded result carrying the raw text under the single fallback slot.
    pub fn degraded(mode: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let text = if text.is_empty() {
            EMPTY_RESPONSE.to_string()
        } else {
            text
        };
        Self {
            mode: mode.into(),
            fields: BTreeMap::new(),
            fallback: Some(text),
        }
    }

    /// Whether structured extraction succeeded.
    pub fn is_structured(&self) -> bool {
        !self.fields.is_empty()
    }

    /// Look up an extracted field by name.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// The fallback text, if extraction degraded.
    pub fn fallback_text(&self) -> Option<&str> {
        self.fallback.as_deref()
    }
}

/// Interpret raw model output for a mode. Never fails.
///
/// Strategy, in order:
/// 1. strip `<think>`/`<thinking>` blocks and trim
/// 2. parse the whole text as a JSON object
/// 3. extract a fenced ```` ```json ```` (or bare) code block and parse that
/// 4. bracket-match an embedded `{...}` group, preferring the last one that
///    parses
///
/// A parsed object becomes the field mapping. Anything else (arrays, bare
/// scalars, malformed brackets, plain prose) degrades to the whole cleaned
/// text as the fallback value.
pub fn interpret(mode: &str, raw_text: &str) -> StructuredResult {
    let cleaned = strip_think_tags(raw_text);
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return StructuredResult::degraded(mode, "");
    }

    if let Some(object) = locate_object(cleaned) {
        let fields = fields_from_object(&object);
        if !fields.is_empty() {
            return StructuredResult::structured(mode, fields);
        }
    }

    StructuredResult::degraded(mode, cleaned)
}

/// Find a JSON object in the text: direct parse, then fenced block, then
/// embedded bracket match.
fn locate_object(text: &str) -> Option<serde_json::Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }

    if let Some(block) = extract_fenced_block(text) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(block) {
            return Some(map);
        }
    }

    if let Some(candidate) = find_embedded_object(text) {
        if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(candidate) {
            return Some(map);
        }
    }

    None
}

/// Strip all `<think>...</think>` and `<thinking>...</thinking>` blocks.
///
/// Handles complete blocks, unterminated blocks (stripped to end of text),
/// and multiple sequential blocks.
pub fn strip_think_tags(text: &str) -> String {
    let mut result = strip_tag_variant(text, "<think>", "</think>");
    result = strip_tag_variant(&result, "<thinking>", "</thinking>");
    result
}

fn strip_tag_variant(text: &str, open: &str, close: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find(open) {
        if let Some(end_offset) = result[start..].find(close) {
            let end = start + end_offset + close.len();
            result = format!("{}{}", &result[..start], &result[end..]);
        } else {
            result = result[..start].to_string();
            break;
        }
    }
    result
}

/// Extract the content of the first markdown code fence.
///
/// Recognizes ```` ```json ````, ```` ```JSON ````, and bare ```` ``` ````
/// fences.
fn extract_fenced_block(text: &str) -> Option<&str> {
    for marker in ["```json", "```JSON", "```"] {
        if let Some(start) = text.find(marker) {
            let content_start = start + marker.len();
            if let Some(end) = text[content_start..].find("```") {
                return Some(text[content_start..content_start + end].trim());
            }
        }
    }
    None
}

/// Bracket-match `{...}` groups embedded in prose, preferring the last
/// balanced group (later text is more likely to be the model's answer).
///
/// String-literal aware: braces inside quoted strings do not affect nesting.
fn find_embedded_object(text: &str) -> Option<&str> {
    let mut best: Option<&str> = None;
    let mut scan_from = 0;

    while let Some(offset) = text[scan_from..].find('{') {
        let start = scan_from + offset;
        let mut depth = 0i32;
        let mut in_string = false;
        let mut escape_next = false;
        let mut found_end = None;

        for (i, ch) in text[start..].char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }
            match ch {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        found_end = Some(start + i);
                        break;
                    }
                }
                _ => {}
            }
        }

        match found_end {
            Some(end) => {
                best = Some(&text[start..=end]);
                scan_from = end + 1;
            }
            None => break,
        }
    }

    best
}

/// Convert a parsed JSON object into the field mapping.
///
/// Strings stay as-is, arrays become string lists, scalars are stringified,
/// nested objects are re-serialized compactly. Null entries are dropped.
fn fields_from_object(map: &serde_json::Map<String, Value>) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                fields.insert(
                    key.clone(),
                    FieldValue::List(items.iter().map(value_to_text).collect()),
                );
            }
            other => {
                fields.insert(key.clone(), FieldValue::Text(value_to_text(other)));
            }
        }
    }
    fields
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        other => other.to_string(),
    }
}
