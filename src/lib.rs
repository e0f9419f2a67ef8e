//! Checks the certificate chain served by a TLS endpoint.
//!
//! A check runs three stages in order, once per invocation:
//!
//! 1. [`endpoint::resolve`] turns the user's domain/IP/port input into a
//!    dialable address plus the SNI name.
//! 2. [`connector::connect`] dials it and performs the TLS handshake.
//! 3. [`evaluate::evaluate`] inspects the leaf and its issuer and derives the
//!    expiry verdict and exit status.
//!
//! ```no_run
//! use chrono::Utc;
//! use sslcheck::{check, Config, RawInput};
//!
//! let raw = RawInput {
//!     domain: Some("https://example.com".to_string()),
//!     ..RawInput::default()
//! };
//! let report = check(&raw, &Config::defaults(), Utc::now())?;
//! if report.leaf.verdict.warning {
//!     // renew soon
//! }
//! # Ok::<(), sslcheck::SslCheckError>(())
//! ```

use chrono::{DateTime, Utc};

pub mod certificate;
pub mod config;
pub mod connector;
pub mod endpoint;
pub mod error;
pub mod evaluate;
pub mod logging;
pub mod report;

pub use certificate::{CertificateRecord, Subject, TlsVersion};
pub use config::{Config, OutputFormat};
pub use connector::{connect, TlsSession};
pub use endpoint::{resolve, Endpoint, RawInput};
pub use error::SslCheckError;
pub use evaluate::{evaluate, ExpiryVerdict, Report};

/// Runs resolve, connect and evaluate for one endpoint.
///
/// The session is closed before this returns, whatever the outcome.
pub fn check(
    raw: &RawInput,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Report, SslCheckError> {
    let endpoint = resolve(raw, config.timeout())?;
    check_endpoint(&endpoint, config, now)
}

/// Connects to an already resolved endpoint and evaluates its chain.
pub fn check_endpoint(
    endpoint: &Endpoint,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Report, SslCheckError> {
    let session = connect(endpoint, config)?;
    let chain = session.chain()?;

    let mut report = evaluate(
        &chain,
        Some(session.version_label()),
        now,
        config.warning_days(),
    )?;
    report.remote_addr = Some(session.remote_addr().to_string());
    report.cipher = session.cipher();
    report.verified = config.verify();
    Ok(report)
}
