//! fence.rs - Markdown fenced-code-block tracking.
//!
//! A fence delimiter is a line whose first non-whitespace content is a run of
//! three or more identical backticks or tildes. Anything may follow the run
//! (an info string such as `python`). A block opened by a run of `n` markers is
//! only closed by a run of the same marker at least `n` long.

/// Minimum run length that makes a line a fence delimiter.
pub const MIN_FENCE_LEN: usize = 3;

/// Where the scanner currently is with respect to fenced code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FenceState {
    #[default]
    Unfenced,
    Fenced { marker: char, len: usize },
}

/// How a single line relates to fenced code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRole {
    /// Ordinary text, subject to detection.
    Prose,
    /// A line that opens or closes a fence.
    Delimiter,
    /// A line inside a fenced block.
    Fenced,
}

impl LineRole {
    /// Delimiters and fenced content are never inspected for instructions.
    pub fn is_exempt(self) -> bool {
        !matches!(self, LineRole::Prose)
    }
}

impl FenceState {
    /// Consumes one line, updating the state, and reports the line's role.
    pub fn advance(&mut self, line: &str) -> LineRole {
        let run = fence_run(line);
        match (*self, run) {
            (FenceState::Unfenced, Some((marker, len))) => {
                *self = FenceState::Fenced { marker, len };
                LineRole::Delimiter
            }
            (FenceState::Unfenced, None) => LineRole::Prose,
            (FenceState::Fenced { marker, len }, Some((m, l))) if m == marker && l >= len => {
                *self = FenceState::Unfenced;
                LineRole::Delimiter
            }
            (FenceState::Fenced { .. }, _) => LineRole::Fenced,
        }
    }

    pub fn is_fenced(&self) -> bool {
        matches!(self, FenceState::Fenced { .. })
    }
}

/// Returns the marker character and run length when `line` is a fence delimiter.
pub fn fence_run(line: &str) -> Option<(char, usize)> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = trimmed.chars().take_while(|c| *c == marker).count();
    (len >= MIN_FENCE_LEN).then_some((marker, len))
}
