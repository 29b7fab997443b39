// ragsan-core/src/engine.rs
//! The chunk sanitizer: runs the line classifier, the secret scan, the
//! citation check and the risk scorer over one chunk.
//!
//! A [`ChunkSanitizer`] binds a shared, read-only [`RulePack`] to a set of
//! [`SanitizeOptions`]. It holds no mutable state, so one instance can be
//! shared across threads and used for any number of chunks.
//!
//! License: MIT OR APACHE 2.0

use log::debug;
use std::sync::Arc;

use crate::chunk::Chunk;
use crate::record::SanitizedChunk;
use crate::sanitizers::classifier::{classify_lines, contains_secret};
use crate::sanitizers::compiler::RulePack;
use crate::scoring::{risk_score, Flag};

/// Per-run switches for the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizeOptions {
    /// Flag chunks without citations and report `citation_ok = false` for them.
    pub require_citations: bool,
    /// Exempt fenced code blocks from instruction detection.
    pub markdown_aware: bool,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            require_citations: true,
            markdown_aware: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChunkSanitizer {
    pack: Arc<RulePack>,
    options: SanitizeOptions,
}

impl ChunkSanitizer {
    /// A sanitizer over the built-in rule pack.
    pub fn new(options: SanitizeOptions) -> Self {
        Self::with_pack(RulePack::default_pack(), options)
    }

    pub fn with_pack(pack: Arc<RulePack>, options: SanitizeOptions) -> Self {
        Self { pack, options }
    }

    pub fn pack(&self) -> &RulePack {
        &self.pack
    }

    pub fn options(&self) -> &SanitizeOptions {
        &self.options
    }

    pub fn sanitize(&self, chunk: &Chunk) -> SanitizedChunk {
        sanitize_with_pack(chunk, &self.pack, &self.options)
    }
}

/// Sanitizes one chunk against `pack`. Never fails: every input has a defined output.
pub(crate) fn sanitize_with_pack(chunk: &Chunk, pack: &RulePack, options: &SanitizeOptions) -> SanitizedChunk {
    let classification = classify_lines(&chunk.text, pack, options.markdown_aware);

    let mut flags = Vec::with_capacity(Flag::ALL.len());
    if classification.instruction_like {
        flags.push(Flag::InstructionLike);
    }
    if classification.tool_instruction {
        flags.push(Flag::ToolInstruction);
    }
    if contains_secret(&chunk.text, pack) {
        flags.push(Flag::SecretLike);
    }

    let citations_present = !chunk.citations.is_empty();
    let citation_ok = citations_present || !options.require_citations;
    if !citation_ok {
        flags.push(Flag::MissingCitation);
    }

    let risk_score = risk_score(flags.iter().map(Flag::as_str), pack.weights());

    debug!(
        "Chunk '{}': {} redaction(s), flags {:?}, risk {}",
        chunk.chunk_id,
        classification.redactions.len(),
        flags,
        risk_score
    );

    SanitizedChunk {
        chunk_id: chunk.chunk_id.clone(),
        sanitized_text: classification.sanitized_text(),
        risk_score,
        flags,
        source: chunk.source.clone(),
        citations: chunk.citations.clone(),
        citation_ok,
        redactions: classification.redactions,
    }
}
