//! Error types for the endpoint check pipeline.
//!
//! Every stage (input, resolution, connect, handshake, evaluation) has its own
//! variant so callers can report the failure precisely. All of them are
//! terminal for an invocation and map to exit status 1.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Error type for a failed endpoint check.
#[derive(Debug)]
pub enum SslCheckError {
    /// Neither a domain nor an IP address was supplied
    InvalidInput {
        /// Which field/parameter was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },

    /// Name resolution failed for the given domain
    DnsResolution {
        /// The domain that failed to resolve
        domain: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TCP connection failed (or timed out) to the target address
    ConnectionFailed {
        /// The address (host:port) that connection failed to
        address: String,
        /// The underlying I/O error
        source: io::Error,
    },

    /// TLS handshake failed after the TCP connection was established
    HandshakeFailed {
        /// The address (host:port) that was dialed
        address: String,
        /// The remote address actually reached, if known
        remote_addr: Option<SocketAddr>,
        /// Details about why the handshake failed
        details: String,
    },

    /// The peer certificate chain could not be evaluated
    CertificateError {
        /// Description of what went wrong
        reason: String,
    },

    /// OpenSSL error occurred while configuring the session
    OpenSSLError {
        /// The underlying OpenSSL error
        details: String,
    },

    /// Generic I/O error
    IoError {
        /// The underlying I/O error
        source: io::Error,
    },
}

impl SslCheckError {
    /// Process exit status for this error. Every failure is reported as 1.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

impl fmt::Display for SslCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { field, reason } => {
                write!(f, "Invalid input for '{}': {}", field, reason)
            }
            Self::DnsResolution { domain, .. } => {
                write!(
                    f,
                    concat!(
                        "Could not resolve domain name, {}. ",
                        "Either supply a valid domain name ",
                        "or use the -i switch to supply the ip address."
                    ),
                    domain
                )
            }
            Self::ConnectionFailed { address, .. } => {
                write!(f, "Could not connect to {}", address)
            }
            Self::HandshakeFailed {
                address, details, ..
            } => {
                write!(f, "Cert Failed for {}: {}", address, details)
            }
            Self::CertificateError { reason } => {
                write!(f, "Certificate error: {}", reason)
            }
            Self::OpenSSLError { details } => {
                write!(f, "OpenSSL error: {}", details)
            }
            Self::IoError { source } => {
                write!(f, "I/O error: {}", source)
            }
        }
    }
}

impl std::error::Error for SslCheckError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DnsResolution { source, .. } => Some(source),
            Self::ConnectionFailed { source, .. } => Some(source),
            Self::IoError { source } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for SslCheckError {
    fn from(e: io::Error) -> Self {
        Self::IoError { source: e }
    }
}

impl From<openssl::error::ErrorStack> for SslCheckError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        Self::OpenSSLError {
            details: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_error_display() {
        let err = SslCheckError::InvalidInput {
            field: "domain".to_string(),
            reason: "no domain supplied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid input for 'domain': no domain supplied"
        );
    }

    #[test]
    fn test_resolution_error_mentions_ip_switch() {
        let err = SslCheckError::DnsResolution {
            domain: "nowhere.invalid".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such host"),
        };
        let msg = err.to_string();
        assert!(msg.contains("nowhere.invalid"));
        assert!(msg.contains("-i"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_every_error_exits_with_one() {
        let errors = vec![
            SslCheckError::CertificateError {
                reason: "empty chain".to_string(),
            },
            SslCheckError::HandshakeFailed {
                address: "10.0.0.1:443".to_string(),
                remote_addr: None,
                details: "certificate verify failed".to_string(),
            },
            io::Error::new(io::ErrorKind::TimedOut, "timed out").into(),
        ];
        for err in errors {
            assert_eq!(err.exit_code(), 1);
        }
    }
}
