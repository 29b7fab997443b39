// ragsan/src/logger.rs
//! Logger setup for the ragsan binary.
//!
//! Installs `env_logger` on stderr. `RUST_LOG` is honored unless an explicit
//! level is passed in; the fallback filter is `warn`.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initializes the global logger. Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    builder.format_timestamp(None).format_target(false);
    if let Some(level) = level {
        builder.filter_level(level);
    }
    // A second init (tests, embedding) leaves the first logger in place.
    let _ = builder.try_init();
}

/// Picks the level override for the global `--quiet`/`--debug` flags.
pub fn level_for(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if debug {
        Some(LevelFilter::Debug)
    } else if quiet {
        Some(LevelFilter::Error)
    } else {
        None
    }
}
