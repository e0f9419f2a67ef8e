//! Expiry evaluation of a peer certificate chain.
//!
//! The leaf's `notAfter` is compared with the current time in whole days
//! (integer truncation toward negative infinity, no calendar rounding).
//! A certificate expiring in fewer than the warning threshold of days, or
//! already expired, yields exit status 1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::certificate::{CertificateRecord, Subject};
use crate::error::SslCheckError;

const SECONDS_PER_DAY: i64 = 86_400;

/// Expiry verdict derived from the leaf certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryVerdict {
    /// Whole days until expiry; negative once expired
    pub days_remaining: i64,
    pub expired: bool,
    /// Always set when `expired` is set
    pub warning: bool,
    pub exit_code: i32,
}

impl ExpiryVerdict {
    pub fn new(not_after: DateTime<Utc>, now: DateTime<Utc>, warning_days: i64) -> Self {
        let seconds_left = not_after.timestamp() - now.timestamp();
        let days_remaining = seconds_left.div_euclid(SECONDS_PER_DAY);
        let expired = days_remaining < 0;
        let warning = days_remaining < warning_days;

        ExpiryVerdict {
            days_remaining,
            expired,
            warning,
            exit_code: if expired || warning { 1 } else { 0 },
        }
    }
}

/// What is reported about the leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafReport {
    /// Negotiated protocol label, when known
    pub protocol: Option<String>,
    pub subject: Subject,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub verdict: ExpiryVerdict,
    /// SAN DNS names, or the common name alone when the certificate has none
    pub dns_names: Vec<String>,
}

/// What is reported about the issuer: identity only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerReport {
    pub common_name: String,
    pub organizational_unit: Vec<String>,
    pub organization: Vec<String>,
}

/// The evaluated chain of one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Remote socket address the session was established with
    pub remote_addr: Option<String>,
    /// Negotiated cipher suite name
    pub cipher: Option<String>,
    /// False when the chain was accepted without verification
    pub verified: bool,
    pub leaf: LeafReport,
    pub issuer: Option<IssuerReport>,
}

impl Report {
    pub fn exit_code(&self) -> i32 {
        self.leaf.verdict.exit_code
    }
}

/// Evaluates a chain (leaf first) against `now`.
///
/// Positions past the issuer are ignored. An empty chain is an error.
pub fn evaluate(
    chain: &[CertificateRecord],
    protocol: Option<String>,
    now: DateTime<Utc>,
    warning_days: i64,
) -> Result<Report, SslCheckError> {
    let leaf = chain.first().ok_or_else(|| SslCheckError::CertificateError {
        reason: "the server presented no certificates".to_string(),
    })?;

    let dns_names = if leaf.dns_names.is_empty() {
        vec![leaf.subject.common_name.clone()]
    } else {
        leaf.dns_names.clone()
    };

    let issuer = chain.get(1).map(|cert| IssuerReport {
        common_name: cert.subject.common_name.clone(),
        organizational_unit: cert.subject.organizational_unit.clone(),
        organization: cert.subject.organization.clone(),
    });

    Ok(Report {
        remote_addr: None,
        cipher: None,
        verified: true,
        leaf: LeafReport {
            protocol,
            subject: leaf.subject.clone(),
            not_before: leaf.not_before,
            not_after: leaf.not_after,
            verdict: ExpiryVerdict::new(leaf.not_after, now, warning_days),
            dns_names,
        },
        issuer,
    })
}
