// ragsan/src/cli.rs
//! This file defines the command-line interface (CLI) for the ragsan application,
//! including all available commands, their arguments and the exit codes the binary uses.
//! License: MIT OR Apache-2.0

use clap::{Parser, Subcommand};
use ragsan_core::Flag;
use std::path::PathBuf;

/// Exit code for configuration, I/O and other structural failures.
pub const EXIT_FAILURE: u8 = 1;
/// Exit code when at least one chunk tripped the risk gate.
pub const EXIT_RISK_GATE: u8 = 3;
/// Exit code when a malformed input line aborted the run.
pub const EXIT_INVALID_INPUT: u8 = 4;

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(
    name = "ragsan",
    author = "Obscura Team (Relay)",
    version = env!("CARGO_PKG_VERSION"),
    about = "Sanitize and score JSONL chunks destined for RAG pipelines",
    long_about = "ragsan reads line-delimited JSON chunks, removes prompt-injection-like lines, flags tool-invocation attempts, secret-like terms and missing citations, and writes one annotated record with a risk score per input line.",
    arg_required_else_help = true,
)]
pub struct Cli {
    /// Suppress informational messages and the run summary.
    #[arg(long, short = 'q', global = true, help = "Suppress all informational messages and the run summary.")]
    pub quiet: bool,

    /// Enable debug logging (overrides RUST_LOG).
    #[arg(long, short = 'd', global = true, conflicts_with = "quiet", help = "Enable debug logging.")]
    pub debug: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `ragsan` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sanitizes a JSONL file or stdin, one output record per input record.
    #[command(about = "Sanitizes a JSONL file or stdin, one output record per input record.")]
    Run(RunCommand),

    /// Prints the built-in rule pack in canonical form.
    #[command(name = "dump-rules", about = "Prints the built-in rule pack as canonical JSON.")]
    DumpRules(DumpRulesCommand),
}

/// Arguments for the `run` command.
#[derive(Parser, Debug, Clone)]
pub struct RunCommand {
    /// Path to an input JSONL file (reads from stdin if not provided).
    #[arg(long = "in", short = 'i', value_name = "FILE", value_parser = existing_file, help = "Read JSONL input from a file instead of stdin.")]
    pub input: Option<PathBuf>,

    /// Write sanitized records to this file instead of stdout.
    #[arg(long = "out", short = 'o', value_name = "FILE", help = "Write JSONL output to a file instead of stdout.")]
    pub output: Option<PathBuf>,

    /// Path to a rule configuration file (JSON, or YAML by extension).
    #[arg(long = "rules", short = 'r', value_name = "FILE", env = "RAGSAN_RULES", help = "Rule configuration file merged over the built-in rules.")]
    pub rules: Option<PathBuf>,

    /// Do not flag chunks that carry no citations.
    #[arg(long = "allow-missing-citations", help = "Do not fail citation checks when citations are missing.")]
    pub allow_missing_citations: bool,

    /// Exempt fenced code blocks from instruction detection.
    #[arg(long = "markdown-aware", help = "Keep fenced code blocks verbatim and skip instruction detection inside them.")]
    pub markdown_aware: bool,

    /// Exit with a distinct code if any chunk's risk score reaches this value.
    #[arg(long = "fail-on-score", value_name = "SCORE", value_parser = parse_score, help = "Exit with code 3 if any chunk's risk score is >= SCORE (0.0 to 1.0).")]
    pub fail_on_score: Option<f64>,

    /// Exit with a distinct code if any chunk carries one of these flags.
    #[arg(long = "fail-on-flag", value_name = "FLAG", value_delimiter = ',', help = "Exit with code 3 if any chunk carries one of these flags (comma-separated).")]
    pub fail_on_flag: Vec<Flag>,

    /// Skip malformed input lines with a warning instead of aborting.
    #[arg(long = "skip-invalid", help = "Skip malformed input lines with a warning instead of aborting the run.")]
    pub skip_invalid: bool,

    /// Also write the run summary as JSON to this file.
    #[arg(long = "summary-json", value_name = "FILE", help = "Write the run statistics as JSON to a file.")]
    pub summary_json: Option<PathBuf>,
}

/// Arguments for the `dump-rules` command.
#[derive(Parser, Debug, Clone)]
pub struct DumpRulesCommand {
    /// Write the rules to this file instead of stdout.
    #[arg(long = "out", short = 'o', value_name = "FILE", help = "Write the rules to a file instead of stdout.")]
    pub output: Option<PathBuf>,
}

fn existing_file(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("input file '{}' does not exist", raw))
    }
}

fn parse_score(raw: &str) -> Result<f64, String> {
    let score: f64 = raw
        .parse()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if (0.0..=1.0).contains(&score) {
        Ok(score)
    } else {
        Err(format!("score must be between 0.0 and 1.0, got {}", score))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "ragsan", "run", "--fail-on-flag", "secret_like,tool_instruction",
            "--fail-on-score", "0.7", "--markdown-aware",
        ])
        .unwrap();
        let Commands::Run(run) = cli.command else { panic!("expected run") };
        assert_eq!(run.fail_on_flag, vec![Flag::SecretLike, Flag::ToolInstruction]);
        assert_eq!(run.fail_on_score, Some(0.7));
        assert!(run.markdown_aware);
        assert!(!run.allow_missing_citations);
    }

    #[test]
    fn test_rejects_bad_gate_values() {
        assert!(Cli::try_parse_from(["ragsan", "run", "--fail-on-score", "1.5"]).is_err());
        assert!(Cli::try_parse_from(["ragsan", "run", "--fail-on-flag", "bogus"]).is_err());
        assert!(Cli::try_parse_from(["ragsan", "run", "--in", "/no/such/input.jsonl"]).is_err());
    }
}
