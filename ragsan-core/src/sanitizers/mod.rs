//! Rule compilation and the line-level sanitization machinery.
//!
//! `compiler` turns rule configurations into immutable `RulePack`s, `fence`
//! tracks markdown code fences, and `classifier` walks a chunk's lines and
//! decides which ones are kept, which are redacted, and which flags fire.

pub mod classifier;
pub mod compiler;
pub mod fence;
