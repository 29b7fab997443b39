//! Colors used for ragsan's stderr diagnostics and the run summary.
//!
//! Every logical output element maps to one 16-color ANSI foreground. Risk
//! values pick their color from the score band they fall into.

use owo_colors::AnsiColors;
use std::collections::HashMap;

/// Type alias for the theme map, providing a consistent type definition.
pub type ThemeMap = HashMap<ThemeEntry, AnsiColors>;

/// The different logical parts of the output that can be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeEntry {
    /// Summary header line.
    Header,
    /// Informational messages.
    Info,
    /// Warnings (skipped lines, gate trips).
    Warn,
    /// Error messages.
    Error,
    /// Labels in the run summary.
    SummaryLabel,
    /// Counts in the run summary.
    SummaryValue,
    /// Risk at or above 0.7.
    RiskHigh,
    /// Risk at or above 0.3.
    RiskModerate,
    /// Anything lower.
    RiskLow,
}

const RISK_HIGH: f64 = 0.7;
const RISK_MODERATE: f64 = 0.3;

/// Returns the default theme.
pub fn default_theme_map() -> ThemeMap {
    HashMap::from([
        (ThemeEntry::Header, AnsiColors::BrightWhite),
        (ThemeEntry::Info, AnsiColors::Cyan),
        (ThemeEntry::Warn, AnsiColors::Yellow),
        (ThemeEntry::Error, AnsiColors::Red),
        (ThemeEntry::SummaryLabel, AnsiColors::White),
        (ThemeEntry::SummaryValue, AnsiColors::BrightCyan),
        (ThemeEntry::RiskHigh, AnsiColors::BrightRed),
        (ThemeEntry::RiskModerate, AnsiColors::Yellow),
        (ThemeEntry::RiskLow, AnsiColors::Green),
    ])
}

/// Picks the theme entry for a risk score.
pub fn risk_entry(score: f64) -> ThemeEntry {
    if score >= RISK_HIGH {
        ThemeEntry::RiskHigh
    } else if score >= RISK_MODERATE {
        ThemeEntry::RiskModerate
    } else {
        ThemeEntry::RiskLow
    }
}

/// Looks up a color, falling back to white for entries missing from a custom map.
pub fn color_for(theme: &ThemeMap, entry: ThemeEntry) -> AnsiColors {
    theme.get(&entry).copied().unwrap_or(AnsiColors::White)
}
