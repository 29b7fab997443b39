//! Configuration management for `ragsan-core`.
//!
//! This module defines the data form of a rule pack: the pattern-string lists and the
//! flag weight mapping, before any regex is compiled. It handles loading JSON or YAML
//! rule files, validating their shape, merging a partial user configuration over the
//! embedded defaults, and rendering the defaults back to canonical JSON.
//!
//! License: MIT OR Apache-2.0

use log::{debug, info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::str::FromStr;

use crate::errors::RagsanError;
use crate::scoring::Flag;

/// Maximum allowed length for a regex pattern string.
pub const MAX_PATTERN_LENGTH: usize = 500;

const DEFAULT_RULES_JSON: &str = include_str!("../config/default_rules.json");

static DEFAULT_RULE_SET: Lazy<RuleSet> = Lazy::new(|| {
    RuleConfig::load_default_rules()
        .map(|config| RuleSet {
            instruction_patterns: config.instruction_patterns.unwrap_or_default(),
            secret_patterns: config.secret_patterns.unwrap_or_default(),
            weights: config.weights.unwrap_or_default(),
        })
        .expect("embedded default_rules.json must be a valid rule configuration")
});

/// A partial rule configuration as written by a user.
///
/// Every field is optional; an absent field falls back to the default for that field
/// alone. `Some(vec![])` is not absent: it disables the detector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<BTreeMap<String, f64>>,
}

/// A complete rule configuration with every field resolved.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RuleSet {
    pub instruction_patterns: Vec<String>,
    pub secret_patterns: Vec<String>,
    pub weights: BTreeMap<String, f64>,
}

impl Hash for RuleSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.instruction_patterns.hash(state);
        self.secret_patterns.hash(state);
        for (flag, weight) in &self.weights {
            flag.hash(state);
            weight.to_bits().hash(state);
        }
    }
}

impl RuleConfig {
    /// Loads a rule configuration from a JSON file, or a YAML file when the extension
    /// is `.yaml` / `.yml`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, RagsanError> {
        let path = path.as_ref();
        info!("Loading rule configuration from: {}", path.display());
        let text = std::fs::read_to_string(path)?;

        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        let value: Value = if is_yaml {
            serde_yml::from_str(&text).map_err(|e| {
                RagsanError::Config(format!("Failed to parse YAML rule file {}: {}", path.display(), e))
            })?
        } else {
            serde_json::from_str(&text).map_err(|e| {
                RagsanError::Config(format!("Failed to parse JSON rule file {}: {}", path.display(), e))
            })?
        };

        let config = Self::from_value(&value)?;
        info!("Loaded rule configuration from {}.", path.display());
        Ok(config)
    }

    /// Loads the embedded default configuration.
    pub fn load_default_rules() -> Result<Self, RagsanError> {
        debug!("Loading default rules from embedded string...");
        let value: Value = serde_json::from_str(DEFAULT_RULES_JSON)
            .map_err(|e| RagsanError::Config(format!("Failed to parse default rules: {}", e)))?;
        Self::from_value(&value)
    }

    /// Validates an in-memory configuration object.
    ///
    /// Unknown top-level keys are ignored. A `null` field counts as absent.
    pub fn from_value(value: &Value) -> Result<Self, RagsanError> {
        let obj = value.as_object().ok_or_else(|| {
            RagsanError::Config(format!("rule configuration must be a JSON object, got {}", type_name(value)))
        })?;

        let config = Self {
            instruction_patterns: pattern_list(obj, "instruction_patterns")?,
            secret_patterns: pattern_list(obj, "secret_patterns")?,
            weights: weight_map(obj)?,
        };

        if let Some(weights) = &config.weights {
            for flag in weights.keys() {
                if Flag::from_str(flag).is_err() {
                    warn!("Weight '{}' does not correspond to any flag the sanitizer emits.", flag);
                }
            }
        }

        Ok(config)
    }

    /// Fills every absent field from the defaults.
    pub fn resolve(self) -> RuleSet {
        let defaults = default_rule_set();
        RuleSet {
            instruction_patterns: self
                .instruction_patterns
                .unwrap_or_else(|| defaults.instruction_patterns.clone()),
            secret_patterns: self
                .secret_patterns
                .unwrap_or_else(|| defaults.secret_patterns.clone()),
            weights: self.weights.unwrap_or_else(|| defaults.weights.clone()),
        }
    }
}

impl RuleSet {
    /// Returns a copy with both pattern lists sorted. Weight keys are already ordered.
    pub fn canonical(&self) -> RuleSet {
        let mut canonical = self.clone();
        canonical.instruction_patterns.sort();
        canonical.secret_patterns.sort();
        canonical
    }

    /// Renders the canonical form as pretty-printed JSON.
    pub fn to_canonical_json(&self) -> Result<String, RagsanError> {
        serde_json::to_string_pretty(&self.canonical())
            .map_err(|e| RagsanError::Serialization(e.to_string()))
    }
}

impl From<RuleSet> for RuleConfig {
    fn from(rules: RuleSet) -> Self {
        Self {
            instruction_patterns: Some(rules.instruction_patterns),
            secret_patterns: Some(rules.secret_patterns),
            weights: Some(rules.weights),
        }
    }
}

/// The embedded default rules, in definition order.
pub fn default_rule_set() -> &'static RuleSet {
    &DEFAULT_RULE_SET
}

/// Renders the built-in rule pack in canonical configuration form.
pub fn dump_default_rules_json() -> Result<String, RagsanError> {
    default_rule_set().to_canonical_json()
}

fn pattern_list(obj: &Map<String, Value>, field: &str) -> Result<Option<Vec<String>>, RagsanError> {
    let items = match obj.get(field) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(RagsanError::Config(format!(
                "'{}' must be an array of strings, got {}",
                field,
                type_name(other)
            )))
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::String(s) => Ok(s.clone()),
            other => Err(RagsanError::Config(format!(
                "'{}[{}]' must be a string, got {}",
                field,
                idx,
                type_name(other)
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

fn weight_map(obj: &Map<String, Value>) -> Result<Option<BTreeMap<String, f64>>, RagsanError> {
    let entries = match obj.get("weights") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Object(entries)) => entries,
        Some(other) => {
            return Err(RagsanError::Config(format!(
                "'weights' must be an object mapping flag names to numbers, got {}",
                type_name(other)
            )))
        }
    };

    let mut weights = BTreeMap::new();
    for (flag, value) in entries {
        let weight = value.as_f64().ok_or_else(|| {
            RagsanError::Config(format!("weight '{}' must be a number, got {}", flag, type_name(value)))
        })?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(RagsanError::Config(format!(
                "weight '{}' must be a non-negative finite number, got {}",
                flag, weight
            )));
        }
        weights.insert(flag.clone(), weight);
    }
    Ok(Some(weights))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_rule_set_contents() {
        let defaults = default_rule_set();
        assert_eq!(defaults.instruction_patterns.len(), 7);
        assert_eq!(defaults.instruction_patterns[0], "ignore (all|previous) (instructions|messages)");
        assert_eq!(defaults.secret_patterns, vec!["api key", "password", "secret", "token"]);
        assert_eq!(defaults.weights.get("instruction_like"), Some(&0.5));
        assert_eq!(defaults.weights.get("missing_citation"), Some(&0.2));
    }

    #[test]
    fn test_partial_config_falls_back_per_field() {
        let config = RuleConfig::from_value(&json!({ "secret_patterns": [] })).unwrap();
        let resolved = config.resolve();
        assert!(resolved.secret_patterns.is_empty());
        assert_eq!(resolved.instruction_patterns, default_rule_set().instruction_patterns);
        assert_eq!(resolved.weights, default_rule_set().weights);
    }

    #[test]
    fn test_rejects_wrong_shapes() {
        let cases = [
            json!([]),
            json!({ "instruction_patterns": "ignore" }),
            json!({ "secret_patterns": ["ok", 3] }),
            json!({ "weights": [0.5] }),
            json!({ "weights": { "instruction_like": "high" } }),
            json!({ "weights": { "instruction_like": -0.1 } }),
        ];
        for case in cases {
            let err = RuleConfig::from_value(&case).unwrap_err();
            assert!(err.is_config(), "expected config error for {}", case);
        }
    }

    #[test]
    fn test_integer_weights_become_floats() {
        let config = RuleConfig::from_value(&json!({ "weights": { "secret_like": 1 } })).unwrap();
        assert_eq!(config.weights.unwrap().get("secret_like"), Some(&1.0));
    }

    #[test]
    fn test_dump_is_sorted() {
        let dumped: Value = serde_json::from_str(&dump_default_rules_json().unwrap()).unwrap();
        let patterns: Vec<&str> = dumped["instruction_patterns"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        let mut sorted = patterns.clone();
        sorted.sort();
        assert_eq!(patterns, sorted);
        assert_eq!(patterns[0], "act as");
    }
}
