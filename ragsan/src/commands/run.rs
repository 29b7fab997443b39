//! The `run` command: sanitizes a JSONL stream, one output record per input record.

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ragsan_core::{
    load_rule_pack, parse_chunk, ChunkSanitizer, Flag, RagsanError, RulePack, SanitizeOptions,
    SanitizedChunk,
};

use crate::cli::RunCommand;
use crate::commands::info_msg;
use crate::ui::run_summary;
use crate::ui::theme::ThemeMap;
use is_terminal::IsTerminal;

/// Counters collected over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Records sanitized and written.
    pub processed: usize,
    /// Records that carry at least one flag.
    pub flagged: usize,
    /// Malformed lines skipped under `--skip-invalid`.
    pub skipped: usize,
    /// Instruction lines removed across all records.
    pub redactions: usize,
    /// Highest risk score seen, 0.0 for an empty run.
    pub max_risk_score: f64,
    /// Records that tripped the risk gate.
    pub gate_tripped: usize,
}

impl RunSummary {
    fn record(&mut self, chunk: &SanitizedChunk, tripped: bool) {
        self.processed += 1;
        if chunk.is_flagged() {
            self.flagged += 1;
        }
        self.redactions += chunk.redactions.len();
        if chunk.risk_score > self.max_risk_score {
            self.max_risk_score = chunk.risk_score;
        }
        if tripped {
            self.gate_tripped += 1;
        }
    }
}

/// Decides whether a sanitized record should fail the run.
#[derive(Debug, Clone, Default)]
pub struct RiskGate {
    pub min_score: Option<f64>,
    pub flags: Vec<Flag>,
}

impl RiskGate {
    pub fn is_enabled(&self) -> bool {
        self.min_score.is_some() || !self.flags.is_empty()
    }

    pub fn trips(&self, chunk: &SanitizedChunk) -> bool {
        let over_score = self.min_score.is_some_and(|min| chunk.risk_score >= min);
        over_score || self.flags.iter().any(|flag| chunk.has_flag(*flag))
    }
}

/// Sanitizes every record read from `reader` and writes one line per record to `writer`.
///
/// Blank lines are ignored. A malformed line is skipped with a warning when
/// `skip_invalid` is set; otherwise processing stops with an error whose chain
/// carries the underlying [`RagsanError::Parse`].
pub fn process_stream<R: BufRead, W: Write>(
    mut reader: R,
    writer: &mut W,
    sanitizer: &ChunkSanitizer,
    gate: &RiskGate,
    skip_invalid: bool,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut buf = Vec::new();
    let mut line_number = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read input line {}", line_number + 1))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        let parsed = match std::str::from_utf8(&buf) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                parse_chunk(trimmed)
            }
            Err(e) => Err(RagsanError::Parse(format!("line is not valid UTF-8: {}", e))),
        };

        let chunk = match parsed {
            Ok(chunk) => chunk,
            Err(e) if skip_invalid => {
                warn!("Skipping malformed line {}: {}", line_number, e);
                summary.skipped += 1;
                continue;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Malformed input on line {}", line_number));
            }
        };

        let sanitized = sanitizer.sanitize(&chunk);
        let tripped = gate.trips(&sanitized);
        debug!(
            "Chunk '{}' scored {} with flags {:?}{}",
            sanitized.chunk_id,
            sanitized.risk_score,
            sanitized.flags,
            if tripped { " (gate tripped)" } else { "" }
        );

        writeln!(writer, "{}", sanitized.to_json()?)
            .with_context(|| format!("Failed to write record for input line {}", line_number))?;
        summary.record(&sanitized, tripped);
    }

    writer.flush().context("Failed to flush output")?;
    Ok(summary)
}

/// Returns true when an error chain ends in a malformed input line.
pub fn is_invalid_input(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<RagsanError>()
            .is_some_and(RagsanError::is_parse)
    })
}

fn build_sanitizer(opts: &RunCommand) -> Result<ChunkSanitizer> {
    let pack = match &opts.rules {
        Some(path) => {
            load_rule_pack(path)
                .with_context(|| format!("Invalid rule configuration in {}", path.display()))?
        }
        None => RulePack::default_pack(),
    };
    let options = SanitizeOptions {
        require_citations: !opts.allow_missing_citations,
        markdown_aware: opts.markdown_aware,
    };
    Ok(ChunkSanitizer::with_pack(pack, options))
}

pub(crate) fn create_output_file(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    File::create(path).with_context(|| format!("Failed to create output file: {}", path.display()))
}

/// Runs the command end to end and returns the collected summary.
///
/// Rules are loaded before any input is read, so a bad configuration never
/// produces partial output.
pub fn run_command(opts: &RunCommand, quiet: bool, theme_map: &ThemeMap) -> Result<RunSummary> {
    let sanitizer = build_sanitizer(opts)?;
    let gate = RiskGate {
        min_score: opts.fail_on_score,
        flags: opts.fail_on_flag.clone(),
    };

    let reader: Box<dyn BufRead> = match &opts.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Failed to open input file: {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let summary = match &opts.output {
        Some(path) => {
            let mut writer = BufWriter::new(create_output_file(path)?);
            let summary = process_stream(reader, &mut writer, &sanitizer, &gate, opts.skip_invalid)?;
            if !quiet {
                info_msg(format!("Wrote sanitized output to {}", path.display()), theme_map);
            }
            summary
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            process_stream(reader, &mut writer, &sanitizer, &gate, opts.skip_invalid)?
        }
    };

    if let Some(path) = &opts.summary_json {
        let mut file = create_output_file(path)?;
        serde_json::to_writer_pretty(&mut file, &summary)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
        writeln!(file)?;
    }

    if !quiet {
        let stderr = io::stderr();
        let supports_color = stderr.is_terminal();
        run_summary::print_summary(&summary, gate.is_enabled(), &mut stderr.lock(), theme_map, supports_color)
            .context("Failed to print run summary")?;
    }

    Ok(summary)
}
