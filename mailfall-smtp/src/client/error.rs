//! Error types for the SMTP client.

use std::io;

use thiserror::Error;

/// Errors that can occur while talking to an SMTP relay.
#[derive(Error, Debug)]
pub enum ClientError {
    /// IO error during a network operation.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// The relay sent something that does not parse as an SMTP reply.
    #[error("failed to parse SMTP response: {0}")]
    Parse(String),

    /// TLS negotiation or certificate handling failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The relay closed the connection mid-exchange.
    #[error("connection closed unexpectedly")]
    Closed,

    /// The relay sent bytes that are not valid UTF-8.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
}

/// Specialized `Result` type for SMTP client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
