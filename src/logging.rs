//! Logger initialization.
//!
//! Diagnostics go to stderr through `env_logger`; the report itself is written
//! to stdout. When `RUST_LOG` is set its directives are kept as written.
//! `--verbose` always turns on the debug trace for this crate, on top of
//! whatever `RUST_LOG` says about other targets.

use log::LevelFilter;
use std::env;
use std::io::Write;

const CRATE_TARGET: &str = "sslcheck";

/// Level forced onto this crate's target, if any.
///
/// `None` means `RUST_LOG` decides.
pub fn crate_level(verbose: bool, rust_log: Option<&str>) -> Option<LevelFilter> {
    if verbose {
        Some(LevelFilter::Debug)
    } else if rust_log.map_or(true, |value| value.trim().is_empty()) {
        Some(LevelFilter::Warn)
    } else {
        None
    }
}

/// Initializes the global logger.
///
/// Uses `try_init` so a second call (as happens in tests) is harmless.
pub fn init_logger(verbose: bool) {
    let rust_log = env::var("RUST_LOG").ok();

    let mut builder = env_logger::Builder::from_default_env();
    if rust_log.as_deref().map_or(true, |value| value.trim().is_empty()) {
        builder.filter_level(LevelFilter::Warn);
    }
    if let Some(level) = crate_level(verbose, rust_log.as_deref()) {
        builder.filter_module(CRATE_TARGET, level);
    }
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        )
    });

    let _ = builder.try_init();
}
