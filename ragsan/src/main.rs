// ragsan/src/main.rs
//! ragsan entry point.
//!
//! Parses arguments, installs the logger, dispatches the subcommand and maps
//! the outcome to the process exit code.

use clap::Parser;
use std::process::ExitCode;

use ragsan::cli::{Cli, Commands, EXIT_FAILURE, EXIT_INVALID_INPUT, EXIT_RISK_GATE};
use ragsan::commands::dump_rules::dump_rules_command;
use ragsan::commands::run::{is_invalid_input, run_command};
use ragsan::commands::{error_msg, warn_msg};
use ragsan::logger;
use ragsan::ui::theme::default_theme_map;

fn main() -> ExitCode {
    let args = Cli::parse();
    logger::init_logger(logger::level_for(args.quiet, args.debug));
    let theme_map = default_theme_map();

    let result = match &args.command {
        Commands::Run(opts) => run_command(opts, args.quiet, &theme_map).map(|summary| {
            if summary.gate_tripped > 0 {
                if !args.quiet {
                    warn_msg(
                        format!("{} chunk(s) tripped the risk gate.", summary.gate_tripped),
                        &theme_map,
                    );
                }
                ExitCode::from(EXIT_RISK_GATE)
            } else {
                ExitCode::SUCCESS
            }
        }),
        Commands::DumpRules(opts) => dump_rules_command(opts, args.quiet, &theme_map).map(|_| ExitCode::SUCCESS),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            error_msg(format!("{:#}", err), &theme_map);
            if is_invalid_input(&err) {
                ExitCode::from(EXIT_INVALID_INPUT)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}
