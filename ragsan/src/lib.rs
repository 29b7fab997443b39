// ragsan/src/lib.rs
//! # ragsan CLI Application
//!
//! Command-line front end for `ragsan-core`: reads JSONL chunks from a file or
//! stdin, writes sanitized records, reports run statistics and turns risk
//! findings into exit codes.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
