// ragsan-core/src/record.rs
//! The sanitized output record and its wire encoding.
//!
//! Records are written one per line. The encoding escapes every non-ASCII
//! character as `\uXXXX` (surrogate pairs above the BMP) and separates items
//! with `", "` and keys from values with `": "`, so output is byte-identical
//! to what existing consumers of the format already store.

use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::ser::{Formatter, Serializer};
use std::io;

use crate::errors::RagsanError;
use crate::scoring::Flag;

lazy_static! {
    /// Whether matched line content may appear verbatim in debug logs.
    static ref PII_DEBUG_ALLOWED: bool = {
        std::env::var("RAGSAN_ALLOW_DEBUG_PII")
            .map(|s| s.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    };
}

/// The only kind of redaction the classifier produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionKind {
    InstructionLike,
}

/// One removed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redaction {
    /// 1-based line number in the original text.
    pub line_number: usize,
    #[serde(rename = "type")]
    pub kind: RedactionKind,
    /// Source strings of every instruction pattern that matched, in pack order.
    pub matched_patterns: Vec<String>,
}

impl Redaction {
    pub fn instruction_like(line_number: usize, matched_patterns: Vec<String>) -> Self {
        Self {
            line_number,
            kind: RedactionKind::InstructionLike,
            matched_patterns,
        }
    }
}

/// A sanitized, annotated chunk ready to be written out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanitizedChunk {
    #[serde(rename = "id")]
    pub chunk_id: String,
    pub sanitized_text: String,
    pub risk_score: f64,
    pub flags: Vec<Flag>,
    pub source: Option<String>,
    pub citations: Vec<String>,
    pub citation_ok: bool,
    pub redactions: Vec<Redaction>,
}

impl SanitizedChunk {
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn is_flagged(&self) -> bool {
        !self.flags.is_empty()
    }

    /// Encodes the record as a single ASCII-only JSON line (without trailing newline).
    pub fn to_json(&self) -> Result<String, RagsanError> {
        let mut out = Vec::with_capacity(256);
        let mut serializer = Serializer::with_formatter(&mut out, CompatFormatter);
        self.serialize(&mut serializer)
            .map_err(|e| RagsanError::Serialization(e.to_string()))?;
        String::from_utf8(out).map_err(|e| RagsanError::Serialization(e.to_string()))
    }
}

/// JSON formatter producing ASCII-only output with spaced separators.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompatFormatter;

impl Formatter for CompatFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut ascii_start = 0;
        for (idx, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[ascii_start..idx].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            ascii_start = idx + ch.len_utf8();
        }
        writer.write_all(fragment[ascii_start..].as_bytes())
    }
}

pub fn redact_sensitive(s: &str) -> String {
    const MAX_LEN: usize = 8;
    if s.len() <= MAX_LEN {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED: {} chars]", s.len())
    }
}

fn get_loggable_content(line: &str) -> String {
    if *PII_DEBUG_ALLOWED {
        line.to_string()
    } else {
        redact_sensitive(line)
    }
}

pub fn log_redaction_debug(line_number: usize, line: &str, matched_patterns: &[String]) {
    debug!(
        "Redacting line {}: '{}' matched {:?}",
        line_number,
        get_loggable_content(line),
        matched_patterns
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SanitizedChunk {
        SanitizedChunk {
            chunk_id: "c1".to_string(),
            sanitized_text: "Keep this".to_string(),
            risk_score: 0.5,
            flags: vec![Flag::InstructionLike],
            source: None,
            citations: vec!["doc#1".to_string()],
            citation_ok: true,
            redactions: vec![Redaction::instruction_like(
                1,
                vec!["ignore (all|previous) (instructions|messages)".to_string()],
            )],
        }
    }

    #[test]
    fn test_record_encoding_layout() {
        let expected = concat!(
            r#"{"id": "c1", "sanitized_text": "Keep this", "risk_score": 0.5, "#,
            r#""flags": ["instruction_like"], "source": null, "citations": ["doc#1"], "#,
            r#""citation_ok": true, "redactions": [{"line_number": 1, "type": "instruction_like", "#,
            r#""matched_patterns": ["ignore (all|previous) (instructions|messages)"]}]}"#
        );
        assert_eq!(record().to_json().unwrap(), expected);
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let mut rec = record();
        rec.sanitized_text = "café \u{1F600}\n\"q\"".to_string();
        let json = rec.to_json().unwrap();
        assert!(json.is_ascii());
        assert!(json.contains(r#""caf\u00e9 \ud83d\ude00\n\"q\"""#));

        let decoded: SanitizedChunk = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.sanitized_text, rec.sanitized_text);
    }

    #[test]
    fn test_whole_scores_keep_decimal_point() {
        let mut rec = record();
        rec.risk_score = 1.0;
        assert!(rec.to_json().unwrap().contains(r#""risk_score": 1.0,"#));
        rec.risk_score = 0.0;
        assert!(rec.to_json().unwrap().contains(r#""risk_score": 0.0,"#));
    }

    #[test]
    fn test_redact_sensitive() {
        assert_eq!(redact_sensitive("abc"), "[REDACTED]");
        assert_eq!(redact_sensitive("123456789"), "[REDACTED: 9 chars]");
    }
}
