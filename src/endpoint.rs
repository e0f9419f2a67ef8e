//! Endpoint resolution.
//!
//! Reconciles the address information a user can supply (an IP flag, a domain
//! flag or positional argument, a port flag, and `https://` / `:port`
//! annotations embedded in the domain) into a single dialable [`Endpoint`].
//!
//! Port precedence, highest first:
//!
//! 1. `-p/--port`
//! 2. a port embedded in `-i <ip>`
//! 3. a `:port` suffix on the domain
//! 4. the `https://` scheme (443)
//! 5. the default, 443

use log::debug;
use std::io;
use std::net::{IpAddr, Ipv6Addr, ToSocketAddrs};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crate::error::SslCheckError;

pub const DEFAULT_PORT: &str = "443";

const HTTPS_SCHEME: &str = "https://";

/// Address information as supplied by the caller, before normalization.
///
/// Empty strings are treated the same as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawInput {
    /// Explicit IP address, possibly with an embedded `:port`
    pub ip: Option<String>,
    /// Domain name, possibly prefixed with `https://` and suffixed with `:port`
    pub domain: Option<String>,
    /// Explicit port; always wins
    pub port: Option<String>,
}

/// A connectable host and port plus the name to present for SNI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Literal IP address or host name to dial
    pub host: String,
    /// Never empty once resolution has finished
    pub port: String,
    /// Domain presented as Server Name Indication; never the resolved IP
    pub sni: String,
}

impl Endpoint {
    /// The `host:port` string to dial. IPv6 literals are bracketed.
    pub fn address(&self) -> String {
        if is_ipv6_literal(&self.host) {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

/// Resolves `raw` into an [`Endpoint`] using the system resolver.
///
/// A lookup still pending after `timeout` fails as a resolution error.
pub fn resolve(raw: &RawInput, timeout: Duration) -> Result<Endpoint, SslCheckError> {
    resolve_with(raw, |domain| system_lookup(domain, timeout))
}

/// Resolves `raw` into an [`Endpoint`], looking domains up with `lookup`.
///
/// `lookup` is only called when no IP address was supplied.
pub fn resolve_with<F>(raw: &RawInput, lookup: F) -> Result<Endpoint, SslCheckError>
where
    F: FnOnce(&str) -> io::Result<Vec<IpAddr>>,
{
    let explicit_port = non_empty(&raw.port);
    let mut port = explicit_port.clone();
    let mut domain = non_empty(&raw.domain).unwrap_or_default();
    let ip = non_empty(&raw.ip);

    if domain.is_empty() && ip.is_none() {
        return Err(SslCheckError::InvalidInput {
            field: "domain".to_string(),
            reason: "a domain name is required".to_string(),
        });
    }

    if let Some(rest) = domain.strip_prefix(HTTPS_SCHEME) {
        // Pasted URLs may carry a path; only the authority matters here.
        domain = rest.split('/').next().unwrap_or_default().to_string();
        if port.is_none() {
            port = Some(DEFAULT_PORT.to_string());
        }
        debug!("Strip https: domain: {}", domain);
    }

    if let Some((name, embedded)) = split_port(&domain) {
        if explicit_port.is_none() && !embedded.is_empty() {
            debug!("Port {} taken from domain {}", embedded, domain);
            port = Some(embedded);
        }
        domain = name;
    }

    let host = match ip {
        Some(ip) => {
            let (address, embedded) = match split_port(&ip) {
                Some((address, embedded)) => (address, Some(embedded)),
                None => (ip, None),
            };
            if let Some(embedded) = embedded.filter(|p| !p.is_empty()) {
                if explicit_port.is_none() {
                    debug!("Port {} taken from ip address {}", embedded, address);
                    port = Some(embedded);
                }
            }
            debug!("Using supplied ip address {}, skipping lookup", address);
            address
        }
        None => lookup_host(&domain, lookup)?,
    };

    let endpoint = Endpoint {
        host,
        port: port.unwrap_or_else(|| DEFAULT_PORT.to_string()),
        sni: domain,
    };
    debug!(
        "Resolved endpoint {} with SNI {:?}",
        endpoint.address(),
        endpoint.sni
    );
    Ok(endpoint)
}

fn lookup_host<F>(domain: &str, lookup: F) -> Result<String, SslCheckError>
where
    F: FnOnce(&str) -> io::Result<Vec<IpAddr>>,
{
    debug!("looking up: {}", domain);
    let addresses = lookup(domain).map_err(|source| SslCheckError::DnsResolution {
        domain: domain.to_string(),
        source,
    })?;
    debug!("IP Addresses: {:?}", addresses);

    let chosen = addresses
        .iter()
        .find(|address| address.is_ipv4())
        .or_else(|| addresses.first())
        .ok_or_else(|| SslCheckError::DnsResolution {
            domain: domain.to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "no addresses returned"),
        })?;
    debug!("IP Address: {}", chosen);
    Ok(chosen.to_string())
}

fn system_lookup(domain: &str, timeout: Duration) -> io::Result<Vec<IpAddr>> {
    let domain = domain.to_string();
    within(timeout, move || {
        let addresses = (domain.as_str(), 0).to_socket_addrs()?;
        Ok(addresses.map(|address| address.ip()).collect())
    })
}

/// Runs a blocking `task` on a helper thread and gives up after `timeout`.
///
/// The std resolver has no timeout of its own; an abandoned lookup finishes
/// in the background and its answer is dropped.
fn within<T, F>(timeout: Duration, task: F) -> io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    thread::spawn(move || {
        let _ = sender.send(task());
    });
    match receiver.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("name lookup timed out after {:?}", timeout),
        )),
        Err(mpsc::RecvTimeoutError::Disconnected) => Err(io::Error::new(
            io::ErrorKind::Other,
            "name lookup thread exited without an answer",
        )),
    }
}

/// Splits `host:port` on the first colon.
///
/// A bare IPv6 literal is left whole and `[v6]:port` is split after the
/// closing bracket.
fn split_port(value: &str) -> Option<(String, String)> {
    if let Some(rest) = value.strip_prefix('[') {
        let (host, tail) = rest.split_once(']')?;
        let port = tail.strip_prefix(':').unwrap_or_default();
        return Some((host.to_string(), port.to_string()));
    }
    if is_ipv6_literal(value) {
        return None;
    }
    value
        .split_once(':')
        .map(|(host, port)| (host.to_string(), port.to_string()))
}

fn is_ipv6_literal(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}
