// ragsan-core/src/chunk.rs
//! Input records and their normalization.
//!
//! One JSONL line becomes one [`Chunk`]. Field coercion is lenient: missing
//! fields get defaults and non-string scalars are rendered as their JSON text.
//! Only a line that is not a JSON object at all is rejected.

use serde_json::{Map, Value};

use crate::errors::RagsanError;

/// One retrievable unit of text submitted for sanitization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    pub chunk_id: String,
    pub text: String,
    pub source: Option<String>,
    pub citations: Vec<String>,
}

impl Chunk {
    pub fn new(chunk_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chunk_id: chunk_id.into(),
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_citations<I, S>(mut self, citations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.citations = citations.into_iter().map(Into::into).collect();
        self
    }
}

/// Parses one input line into a [`Chunk`].
///
/// * `id` and `text` default to `""`; `null` counts as absent.
/// * `source` is kept when it is a string, stringified when it is another scalar,
///   and `None` when absent or `null`.
/// * `citations` must be an array to count; `null` elements are dropped and the rest
///   are stringified in order.
pub fn parse_chunk(line: &str) -> Result<Chunk, RagsanError> {
    let payload: Value = serde_json::from_str(line)
        .map_err(|e| RagsanError::Parse(format!("not valid JSON: {}", e)))?;

    let Value::Object(obj) = payload else {
        return Err(RagsanError::Parse(format!(
            "expected a JSON object, got {}",
            kind_of(&payload)
        )));
    };

    Ok(Chunk {
        chunk_id: string_field(&obj, "id"),
        text: string_field(&obj, "text"),
        source: match obj.get("source") {
            None | Some(Value::Null) => None,
            Some(value) => Some(stringify(value)),
        },
        citations: match obj.get("citations") {
            Some(Value::Array(items)) => items
                .iter()
                .filter(|item| !item.is_null())
                .map(stringify)
                .collect(),
            _ => Vec::new(),
        },
    })
}

// Null reads as absent and scalars keep their JSON spelling (`true`, not `True`),
// so a record survives a round trip through any JSON tool unchanged.
fn string_field(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(value) => stringify(value),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
