//! Connectivity probing.
//!
//! A probe answers one question cheaply: does this relay accept a TCP
//! connection right now? No greeting is read and nothing is
//! authenticated, so a passing probe is not a promise that a delivery
//! attempt will succeed — it only spares the cost of a full attempt
//! against a relay that is down.

use std::time::Duration;

use thiserror::Error;
use tokio::net::TcpStream;

/// Why a relay failed the connectivity probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// No connection within the configured bound.
    #[error("connect to {address} timed out after {timeout:?}")]
    Timeout {
        /// The `host:port` that was probed.
        address: String,
        /// The configured connect bound.
        timeout: Duration,
    },

    /// The connection was refused, or the address did not resolve.
    #[error("connect to {address} failed: {source}")]
    Unreachable {
        /// The `host:port` that was probed.
        address: String,
        /// The underlying connect error.
        #[source]
        source: std::io::Error,
    },
}

/// Checks that `address` (`host:port`) accepts a TCP connection within
/// `timeout`, then drops the connection immediately.
///
/// # Errors
///
/// Returns `ProbeError::Timeout` when the bound elapses first, and
/// `ProbeError::Unreachable` when the connect fails outright (refused,
/// unresolvable host, unparseable port).
pub async fn probe(address: &str, timeout: Duration) -> Result<(), ProbeError> {
    match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
        Ok(Ok(stream)) => {
            drop(stream);
            Ok(())
        }
        Ok(Err(source)) => Err(ProbeError::Unreachable {
            address: address.to_string(),
            source,
        }),
        Err(_) => Err(ProbeError::Timeout {
            address: address.to_string(),
            timeout,
        }),
    }
}
