//! TCP connect and TLS handshake.
//!
//! [`connect`] returns a [`TlsSession`] that owns both the socket and the TLS
//! state. Dropping the session sends close_notify and closes the socket, so
//! every exit path releases the connection.

use log::debug;
use openssl::ssl::{SslConnector, SslMethod, SslStream, SslVerifyMode};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};

use crate::certificate::{records_from_chain, CertificateRecord, TlsVersion};
use crate::config::Config;
use crate::endpoint::Endpoint;
use crate::error::SslCheckError;

/// An established TLS client session.
pub struct TlsSession {
    stream: SslStream<TcpStream>,
    remote_addr: SocketAddr,
}

impl TlsSession {
    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    pub fn version(&self) -> Option<TlsVersion> {
        self.stream.ssl().version2().and_then(TlsVersion::from_ssl)
    }

    /// Protocol label, falling back to OpenSSL's own name for versions
    /// without a label.
    pub fn version_label(&self) -> String {
        match self.version() {
            Some(version) => version.to_string(),
            None => self.stream.ssl().version_str().to_string(),
        }
    }

    pub fn cipher(&self) -> Option<String> {
        self.stream
            .ssl()
            .current_cipher()
            .map(|cipher| cipher.name().to_string())
    }

    /// The reported part of the peer chain, leaf first.
    pub fn chain(&self) -> Result<Vec<CertificateRecord>, SslCheckError> {
        let ssl = self.stream.ssl();
        if let Some(chain) = ssl.peer_cert_chain() {
            if !chain.is_empty() {
                return records_from_chain(chain);
            }
        }
        match ssl.peer_certificate() {
            Some(leaf) => Ok(vec![CertificateRecord::from_x509(0, &leaf)?]),
            None => Err(SslCheckError::CertificateError {
                reason: "Certificate not found".to_string(),
            }),
        }
    }
}

impl Drop for TlsSession {
    fn drop(&mut self) {
        if let Err(e) = self.stream.shutdown() {
            debug!("TLS shutdown with {} failed: {}", self.remote_addr, e);
        }
        debug!("Closed connection to {}", self.remote_addr);
    }
}

/// Dials `endpoint` and performs the TLS handshake with its SNI name.
///
/// Connect and handshake are each bounded by `config.timeout()`; nothing is
/// retried.
pub fn connect(endpoint: &Endpoint, config: &Config) -> Result<TlsSession, SslCheckError> {
    let address = endpoint.address();
    let timeout = config.timeout();

    let socket_addr = address
        .to_socket_addrs()
        .and_then(|mut addrs| {
            addrs.next().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no socket address")
            })
        })
        .map_err(|source| SslCheckError::ConnectionFailed {
            address: address.clone(),
            source,
        })?;

    debug!("Connecting to {} (timeout {:?})", socket_addr, timeout);
    let tcp_stream = TcpStream::connect_timeout(&socket_addr, timeout).map_err(|source| {
        SslCheckError::ConnectionFailed {
            address: address.clone(),
            source,
        }
    })?;
    tcp_stream.set_read_timeout(Some(timeout))?;
    tcp_stream.set_write_timeout(Some(timeout))?;
    let remote_addr = tcp_stream.peer_addr().unwrap_or(socket_addr);

    let mut builder = SslConnector::builder(SslMethod::tls())?;
    if !config.verify() {
        debug!("Peer verification disabled");
        builder.set_verify(SslVerifyMode::NONE);
    }
    let connector = builder.build();

    let mut configuration = connector.configure()?;
    if endpoint.sni.is_empty() {
        debug!("No domain supplied, handshaking without SNI");
        configuration = configuration
            .use_server_name_indication(false)
            .verify_hostname(false);
    }

    debug!("TLS handshake with SNI {:?}", endpoint.sni);
    let stream = configuration
        .connect(&endpoint.sni, tcp_stream)
        .map_err(|e| SslCheckError::HandshakeFailed {
            address: address.clone(),
            remote_addr: Some(remote_addr),
            details: e.to_string(),
        })?;

    Ok(TlsSession {
        stream,
        remote_addr,
    })
}
