//! Console rendering of an evaluated chain.
//!
//! The text layout is fixed: connection line, check line, the server key
//! block, then the issuer block. Failures get their own one or two line
//! notices from [`write_error`].

use std::io::{self, Write};

use crate::error::SslCheckError;
use crate::evaluate::Report;

/// Writes the human readable report.
pub fn write_text<W: Write>(report: &Report, out: &mut W) -> io::Result<()> {
    if let Some(remote) = &report.remote_addr {
        writeln!(out, "Client connected to: {}", remote)?;
    }
    if report.verified {
        writeln!(out, "Cert Checks OK")?;
    } else {
        writeln!(out, "Cert Checks skipped (verification disabled)")?;
    }

    let leaf = &report.leaf;
    writeln!(out, "Server key information:")?;
    if let Some(protocol) = &leaf.protocol {
        writeln!(out, "\tVersion: {}", protocol)?;
    }
    if let Some(cipher) = &report.cipher {
        writeln!(out, "\tCipher: {}", cipher)?;
    }
    writeln!(out, "\tCN:\t {}", leaf.subject.common_name)?;
    writeln!(out, "\tOU:\t {}", join(&leaf.subject.organizational_unit))?;
    writeln!(out, "\tOrg:\t {}", join(&leaf.subject.organization))?;
    writeln!(out, "\tCity:\t {}", join(&leaf.subject.locality))?;
    writeln!(out, "\tState:\t {}", join(&leaf.subject.province))?;
    writeln!(out, "\tCountry: {}", join(&leaf.subject.country))?;
    writeln!(out, "SSL Certificate Valid:")?;
    writeln!(out, "\tFrom:\t {}", leaf.not_before)?;
    writeln!(out, "\tTo:\t {}", leaf.not_after)?;

    let verdict = &leaf.verdict;
    if verdict.expired {
        writeln!(out, "\tWARNING:\t Cert has expired.")?;
    }
    if verdict.warning {
        writeln!(
            out,
            "\tWARNING:\t Cert Expires in {} days",
            verdict.days_remaining
        )?;
    } else {
        writeln!(out, "\tOK: \tCert Expires in {} days", verdict.days_remaining)?;
    }

    writeln!(out, "Valid Certificate DNS:")?;
    for name in &leaf.dns_names {
        writeln!(out, "\t{}", name)?;
    }

    if let Some(issuer) = &report.issuer {
        writeln!(out, "Issued by:")?;
        writeln!(out, "\t{}", issuer.common_name)?;
        writeln!(out, "\t{}", join(&issuer.organizational_unit))?;
        writeln!(out, "\t{}", join(&issuer.organization))?;
    }
    Ok(())
}

/// Writes the report as pretty printed JSON.
pub fn write_json<W: Write>(report: &Report, out: &mut W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)
}

/// Writes the console notice for a failed check.
///
/// `domain` is the name the user asked about; it is echoed next to the
/// address that was dialed.
pub fn write_error<W: Write>(err: &SslCheckError, domain: &str, out: &mut W) -> io::Result<()> {
    match err {
        SslCheckError::DnsResolution { .. } => {
            writeln!(out, "{}", err)?;
            writeln!(
                out,
                "Domain name lookups are not performed when the user provides the ip address."
            )
        }
        SslCheckError::ConnectionFailed { address, .. } => {
            writeln!(out, "Could not connect to {} - {}", address, domain)
        }
        SslCheckError::HandshakeFailed {
            address,
            remote_addr,
            ..
        } => {
            if let Some(remote) = remote_addr {
                writeln!(out, "Client connected to: {}", remote)?;
            }
            writeln!(out, "Cert Failed for {} - {}", address, domain)
        }
        other => writeln!(out, "{}", other),
    }
}

fn join(values: &[String]) -> String {
    values.join(" ")
}
