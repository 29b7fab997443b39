//! scoring.rs - Chunk-level flags and the risk score derived from them.
//!
//! License: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::errors::RagsanError;

/// A chunk-level finding. Serialized as its snake_case name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    /// At least one line matched an instruction pattern and was removed.
    InstructionLike,
    /// A removed instruction line also mentioned a tool or function.
    ToolInstruction,
    /// A secret pattern matched somewhere in the raw text.
    SecretLike,
    /// Citations were required but none were supplied.
    MissingCitation,
}

impl Flag {
    pub const ALL: [Flag; 4] = [
        Flag::InstructionLike,
        Flag::ToolInstruction,
        Flag::SecretLike,
        Flag::MissingCitation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::InstructionLike => "instruction_like",
            Flag::ToolInstruction => "tool_instruction",
            Flag::SecretLike => "secret_like",
            Flag::MissingCitation => "missing_citation",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Flag {
    type Err = RagsanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Flag::ALL
            .into_iter()
            .find(|flag| flag.as_str() == s)
            .ok_or_else(|| RagsanError::UnknownFlag(s.to_string()))
    }
}

/// Sums the weight of each distinct flag name and clamps the total to `[0, 1]`.
///
/// Names missing from `weights` contribute nothing. Repeated names count once.
/// Summation follows first-seen order so identical flag lists always yield
/// bit-identical scores.
pub fn risk_score<'a, I>(flags: I, weights: &BTreeMap<String, f64>) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen = HashSet::new();
    let mut score: f64 = 0.0;
    for flag in flags {
        if seen.insert(flag) {
            score += weights.get(flag).copied().unwrap_or(0.0);
        }
    }
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_weights() -> BTreeMap<String, f64> {
        [
            ("instruction_like", 0.5),
            ("tool_instruction", 0.2),
            ("secret_like", 0.2),
            ("missing_citation", 0.2),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    #[test]
    fn test_empty_flags_score_zero() {
        assert_eq!(risk_score(std::iter::empty(), &default_weights()), 0.0);
    }

    #[test]
    fn test_score_is_clamped() {
        let flags = ["instruction_like", "tool_instruction", "secret_like", "missing_citation"];
        assert_eq!(risk_score(flags, &default_weights()), 1.0);
    }

    #[test]
    fn test_duplicates_count_once() {
        let score = risk_score(["secret_like", "secret_like"], &default_weights());
        assert_eq!(score, 0.2);
    }

    #[test]
    fn test_unknown_flags_contribute_nothing() {
        let score = risk_score(["made_up", "instruction_like"], &default_weights());
        assert_eq!(score, 0.5);
        assert_eq!(risk_score(["instruction_like"], &BTreeMap::new()), 0.0);
    }

    #[test]
    fn test_order_independent() {
        let weights = default_weights();
        let a = risk_score(["instruction_like", "missing_citation"], &weights);
        let b = risk_score(["missing_citation", "instruction_like"], &weights);
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_flag_names_round_trip() {
        for flag in Flag::ALL {
            assert_eq!(flag.as_str().parse::<Flag>().unwrap(), flag);
        }
        assert!("toolish".parse::<Flag>().is_err());
    }
}
