//! Certificate records extracted from a peer chain.
//!
//! Only the first two positions of a chain are ever looked at: the leaf
//! (position 0) and its direct issuer (position 1). Extra intermediates are
//! skipped without error.

use chrono::{DateTime, Utc};
use openssl::asn1::{Asn1Time, Asn1TimeRef};
use openssl::nid::Nid;
use openssl::ssl::SslVersion;
use openssl::stack::StackRef;
use openssl::x509::{X509NameRef, X509Ref, X509};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::error::SslCheckError;

/// Number of chain positions that are reported.
pub const REPORTED_POSITIONS: usize = 2;

/// Negotiated protocol version, labelled the way operators read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
pub enum TlsVersion {
    #[strum(serialize = "SSL v3")]
    Ssl3,
    #[strum(serialize = "TLS v1.0")]
    Tls10,
    #[strum(serialize = "TLS v1.1")]
    Tls11,
    #[strum(serialize = "TLS v1.2")]
    Tls12,
    #[strum(serialize = "TLS v1.3")]
    Tls13,
}

impl TlsVersion {
    /// Maps the legacy numeric codes 0..=3 (SSLv3 through TLS 1.2).
    ///
    /// TLS 1.3 never had a code in that scheme; use [`TlsVersion::from_ssl`].
    pub fn from_code(code: u8) -> Option<TlsVersion> {
        match code {
            0 => Some(TlsVersion::Ssl3),
            1 => Some(TlsVersion::Tls10),
            2 => Some(TlsVersion::Tls11),
            3 => Some(TlsVersion::Tls12),
            _ => None,
        }
    }

    pub fn from_ssl(version: SslVersion) -> Option<TlsVersion> {
        if version == SslVersion::SSL3 {
            Some(TlsVersion::Ssl3)
        } else if version == SslVersion::TLS1 {
            Some(TlsVersion::Tls10)
        } else if version == SslVersion::TLS1_1 {
            Some(TlsVersion::Tls11)
        } else if version == SslVersion::TLS1_2 {
            Some(TlsVersion::Tls12)
        } else if version == SslVersion::TLS1_3 {
            Some(TlsVersion::Tls13)
        } else {
            None
        }
    }
}

/// Distinguished name fields of a certificate subject.
///
/// Every attribute except the common name may legally repeat, so they are
/// kept as ordered lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub common_name: String,
    pub organizational_unit: Vec<String>,
    pub organization: Vec<String>,
    pub locality: Vec<String>,
    pub province: Vec<String>,
    pub country: Vec<String>,
}

impl Subject {
    fn from_name(name: &X509NameRef) -> Subject {
        Subject {
            common_name: name_entries(name, Nid::COMMONNAME)
                .into_iter()
                .next()
                .unwrap_or_default(),
            organizational_unit: name_entries(name, Nid::ORGANIZATIONALUNITNAME),
            organization: name_entries(name, Nid::ORGANIZATIONNAME),
            locality: name_entries(name, Nid::LOCALITYNAME),
            province: name_entries(name, Nid::STATEORPROVINCENAME),
            country: name_entries(name, Nid::COUNTRYNAME),
        }
    }
}

/// One certificate of the peer chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    /// 0 for the leaf, 1 for its issuer
    pub position: usize,
    pub subject: Subject,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    /// DNS subject alternative names, in certificate order
    pub dns_names: Vec<String>,
}

impl CertificateRecord {
    pub fn from_x509(position: usize, cert: &X509Ref) -> Result<CertificateRecord, SslCheckError> {
        let dns_names = cert
            .subject_alt_names()
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| name.dnsname())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(CertificateRecord {
            position,
            subject: Subject::from_name(cert.subject_name()),
            not_before: asn1_to_datetime(cert.not_before())?,
            not_after: asn1_to_datetime(cert.not_after())?,
            dns_names,
        })
    }
}

/// Converts the reported prefix of a peer chain, leaf first.
pub fn records_from_chain(
    chain: &StackRef<X509>,
) -> Result<Vec<CertificateRecord>, SslCheckError> {
    chain
        .iter()
        .take(REPORTED_POSITIONS)
        .enumerate()
        .map(|(position, cert)| CertificateRecord::from_x509(position, cert))
        .collect()
}

fn name_entries(name: &X509NameRef, nid: Nid) -> Vec<String> {
    name.entries_by_nid(nid)
        .map(|entry| match entry.data().as_utf8() {
            Ok(value) => value.to_string(),
            Err(_) => String::from_utf8_lossy(entry.data().as_slice()).into_owned(),
        })
        .collect()
}

fn asn1_to_datetime(time: &Asn1TimeRef) -> Result<DateTime<Utc>, SslCheckError> {
    let epoch = Asn1Time::from_unix(0)?;
    let diff = epoch.diff(time)?;
    let secs = i64::from(diff.days) * 86_400 + i64::from(diff.secs);
    DateTime::from_timestamp(secs, 0).ok_or_else(|| SslCheckError::CertificateError {
        reason: format!("certificate time {} is out of range", time),
    })
}
