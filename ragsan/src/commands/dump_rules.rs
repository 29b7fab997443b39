//! The `dump-rules` command: prints the built-in rule pack in canonical form.

use anyhow::{Context, Result};
use std::io::{self, Write};

use ragsan_core::dump_default_rules_json;

use crate::cli::DumpRulesCommand;
use crate::commands::info_msg;
use crate::commands::run::create_output_file;
use crate::ui::theme::ThemeMap;

pub fn dump_rules_command(opts: &DumpRulesCommand, quiet: bool, theme_map: &ThemeMap) -> Result<()> {
    let rendered = dump_default_rules_json().context("Failed to render the default rules")?;

    match &opts.output {
        Some(path) => {
            let mut file = create_output_file(path)?;
            writeln!(file, "{}", rendered)
                .with_context(|| format!("Failed to write rules to {}", path.display()))?;
            if !quiet {
                info_msg(format!("Wrote default rules to {}", path.display()), theme_map);
            }
        }
        None => {
            let mut stdout = io::stdout().lock();
            writeln!(stdout, "{}", rendered).context("Failed to write rules to stdout")?;
        }
    }
    Ok(())
}
