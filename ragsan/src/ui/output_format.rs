//! Formatting for the short status lines ragsan writes to stderr.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use super::theme::{color_for, ThemeEntry, ThemeMap};

fn print_message<W: Write>(
    writer: &mut W,
    prefix: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    enable_colors: bool,
) -> io::Result<()> {
    if enable_colors {
        let line = format!("{} {}", prefix, msg);
        writeln!(writer, "{}", line.color(color_for(theme, entry)))
    } else {
        writeln!(writer, "{} {}", prefix, msg)
    }
}

/// Prints an informational message.
pub fn print_info_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, enable_colors: bool) -> io::Result<()> {
    print_message(writer, "[ragsan]", msg, ThemeEntry::Info, theme, enable_colors)
}

/// Prints a warning.
pub fn print_warn_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, enable_colors: bool) -> io::Result<()> {
    print_message(writer, "[ragsan] warning:", msg, ThemeEntry::Warn, theme, enable_colors)
}

/// Prints an error.
pub fn print_error_message<W: Write>(writer: &mut W, msg: &str, theme: &ThemeMap, enable_colors: bool) -> io::Result<()> {
    print_message(writer, "[ragsan] error:", msg, ThemeEntry::Error, theme, enable_colors)
}
