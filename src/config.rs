//! Runtime configuration for a single check.
//!
//! Values are layered with a clear precedence:
//!
//! 1. Default values (lowest priority)
//! 2. Command-line arguments (highest priority)
//!
//! The tool reads no configuration files; everything arrives on the command
//! line and is threaded explicitly through the pipeline.

use std::time::Duration;
use strum_macros::{Display, EnumString};

/// Bound on name resolution, TCP connect and the TLS handshake.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Certificates expiring in fewer days than this raise a warning.
pub const DEFAULT_WARNING_DAYS: i64 = 31;

/// Report format written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Configuration for one invocation.
///
/// All fields are optional to support merging; use the accessors to read the
/// effective value with defaults applied.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Lookup, connect and handshake timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Warning threshold in days
    pub warning_days: Option<i64>,
    /// Verify the peer chain during the handshake
    pub verify: Option<bool>,
    /// Report format
    pub output: Option<OutputFormat>,
    /// Emit a diagnostic trace
    pub verbose: Option<bool>,
}

impl Config {
    /// Configuration with every field set to its default.
    ///
    /// - `timeout_secs`: 60
    /// - `warning_days`: 31
    /// - `verify`: true
    /// - `output`: text
    /// - `verbose`: false
    pub fn defaults() -> Self {
        Config {
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            warning_days: Some(DEFAULT_WARNING_DAYS),
            verify: Some(true),
            output: Some(OutputFormat::Text),
            verbose: Some(false),
        }
    }

    /// Merges this configuration with another, prioritizing the other's values.
    pub fn merge_with(mut self, other: Config) -> Self {
        if other.timeout_secs.is_some() {
            self.timeout_secs = other.timeout_secs;
        }
        if other.warning_days.is_some() {
            self.warning_days = other.warning_days;
        }
        if other.verify.is_some() {
            self.verify = other.verify;
        }
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        self
    }

    /// Builds a partial configuration from command-line flags.
    ///
    /// Boolean switches only override when they are set, so an absent flag
    /// leaves the lower layer untouched.
    pub fn from_cli_args(json: bool, insecure: bool, verbose: bool) -> Self {
        Config {
            timeout_secs: None,
            warning_days: None,
            verify: if insecure { Some(false) } else { None },
            output: if json { Some(OutputFormat::Json) } else { None },
            verbose: if verbose { Some(true) } else { None },
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn warning_days(&self) -> i64 {
        self.warning_days.unwrap_or(DEFAULT_WARNING_DAYS)
    }

    pub fn verify(&self) -> bool {
        self.verify.unwrap_or(true)
    }

    pub fn output(&self) -> OutputFormat {
        self.output.unwrap_or(OutputFormat::Text)
    }

    pub fn verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }
}
