//! Prints the end-of-run statistics block.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use super::theme::{color_for, risk_entry, ThemeEntry, ThemeMap};
use crate::commands::run::RunSummary;

fn write_row<W: Write>(
    writer: &mut W,
    label: &str,
    value: &str,
    value_entry: ThemeEntry,
    theme: &ThemeMap,
    enable_colors: bool,
) -> io::Result<()> {
    let label = format!("  {:<16}", label);
    if enable_colors {
        writeln!(
            writer,
            "{}{}",
            label.color(color_for(theme, ThemeEntry::SummaryLabel)),
            value.color(color_for(theme, value_entry))
        )
    } else {
        writeln!(writer, "{}{}", label, value)
    }
}

/// Writes the summary block. The gate row only appears when a gate was configured.
pub fn print_summary<W: Write>(
    summary: &RunSummary,
    gate_enabled: bool,
    writer: &mut W,
    theme: &ThemeMap,
    enable_colors: bool,
) -> io::Result<()> {
    let header = "Sanitization Summary:";
    if enable_colors {
        writeln!(writer, "{}", header.color(color_for(theme, ThemeEntry::Header)))?;
    } else {
        writeln!(writer, "{}", header)?;
    }

    let value = ThemeEntry::SummaryValue;
    write_row(writer, "processed", &summary.processed.to_string(), value, theme, enable_colors)?;
    write_row(writer, "flagged", &summary.flagged.to_string(), value, theme, enable_colors)?;
    write_row(writer, "skipped", &summary.skipped.to_string(), value, theme, enable_colors)?;
    write_row(writer, "redactions", &summary.redactions.to_string(), value, theme, enable_colors)?;
    write_row(
        writer,
        "max risk score",
        &format!("{:.2}", summary.max_risk_score),
        risk_entry(summary.max_risk_score),
        theme,
        enable_colors,
    )?;
    if gate_enabled {
        let entry = if summary.gate_tripped > 0 { ThemeEntry::Error } else { value };
        write_row(writer, "gate tripped", &summary.gate_tripped.to_string(), entry, theme, enable_colors)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::theme::default_theme_map;

    fn render(summary: &RunSummary, gate_enabled: bool) -> String {
        let mut buf = Vec::new();
        print_summary(summary, gate_enabled, &mut buf, &default_theme_map(), false).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn plain_summary_lists_every_counter() {
        let summary = RunSummary {
            processed: 3,
            flagged: 2,
            skipped: 1,
            redactions: 4,
            max_risk_score: 0.7,
            gate_tripped: 0,
        };
        let out = render(&summary, false);
        assert!(out.starts_with("Sanitization Summary:\n"));
        assert!(out.contains("processed       3"));
        assert!(out.contains("max risk score  0.70"));
        assert!(!out.contains("gate tripped"));
    }

    #[test]
    fn gate_row_shown_when_enabled() {
        let summary = RunSummary { gate_tripped: 2, ..RunSummary::default() };
        assert!(render(&summary, true).contains("gate tripped    2"));
    }
}
