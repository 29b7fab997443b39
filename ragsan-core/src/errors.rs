//! errors.rs - Custom error types for the ragsan-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//! Configuration problems and malformed input lines are kept apart so callers
//! can decide which ones abort a run.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `ragsan-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RagsanError {
    #[error("Invalid rule configuration: {0}")]
    Config(String),

    #[error("Failed to compile pattern '{0}': {1}")]
    RuleCompilation(String, regex::Error),

    #[error("Pattern '{0}': length ({1}) exceeds maximum allowed ({2})")]
    PatternLengthExceeded(String, usize, usize),

    #[error("Invalid input record: {0}")]
    Parse(String),

    #[error("Unknown flag '{0}' (expected one of: instruction_like, tool_instruction, secret_like, missing_citation)")]
    UnknownFlag(String),

    #[error("Failed to serialize record: {0}")]
    Serialization(String),

    #[error("An unexpected I/O error occurred: {0}")]
    Io(#[from] std::io::Error),
}

impl RagsanError {
    /// True for every variant that describes a broken rule pack.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            RagsanError::Config(_)
                | RagsanError::RuleCompilation(..)
                | RagsanError::PatternLengthExceeded(..)
        )
    }

    /// True when an input line could not be turned into a chunk.
    pub fn is_parse(&self) -> bool {
        matches!(self, RagsanError::Parse(_))
    }
}
