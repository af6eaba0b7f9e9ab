//! Error taxonomy for delivery.
//!
//! Two tiers, matching the recovery policy: `AttemptError` is scoped to
//! one `(recipient, relay)` attempt and is always absorbed into the
//! outcome log before the engine moves to the next relay; `BatchError`
//! aborts the whole batch and propagates to the caller.

use std::path::PathBuf;

use thiserror::Error;

use mailfall_smtp::ClientError;

/// The relay pool could not be loaded.
#[derive(Debug, Error)]
pub enum PoolError {
    /// No raw record decomposed into the required four fields.
    #[error("no valid relay records found")]
    Empty,
}

/// One delivery attempt against one relay failed.
///
/// Every variant is recoverable: the engine records it and advances to
/// the next relay in pool order.
#[derive(Debug, Error)]
pub enum AttemptError {
    /// The connection could not be established or broke mid-exchange.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The relay's greeting was not a success reply.
    #[error("relay rejected the connection: {0}")]
    Greeting(String),

    /// STARTTLS negotiation or the TLS handshake failed.
    #[error("TLS negotiation failed: {0}")]
    Tls(String),

    /// The relay refused the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The relay rejected a protocol step (MAIL FROM, RCPT TO, DATA, or
    /// the message content).
    #[error("relay rejected {command}: {response}")]
    Rejected {
        /// The command that was refused.
        command: &'static str,
        /// The relay's reply text.
        response: String,
    },

    /// The relay violated the protocol in a way the client could not
    /// parse around.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<ClientError> for AttemptError {
    fn from(error: ClientError) -> Self {
        match error {
            ClientError::Io(e) => Self::Connect(format!("I/O error: {e}")),
            ClientError::Closed => Self::Connect("connection closed unexpectedly".to_string()),
            ClientError::Tls(message) => Self::Tls(message),
            ClientError::Parse(message) => Self::Protocol(message),
            ClientError::Utf8(e) => Self::Protocol(format!("reply is not valid UTF-8: {e}")),
        }
    }
}

/// Appending to an outcome log failed.
///
/// Unlike relay errors this is never swallowed: losing the audit trail
/// is fatal for the batch.
#[derive(Debug, Error)]
#[error("failed to append to {}: {source}", path.display())]
pub struct RecorderError {
    /// The destination that could not be written.
    pub path: PathBuf,
    /// The underlying I/O failure.
    #[source]
    pub source: std::io::Error,
}

/// The batch could not start, or had to stop.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The relay pool holds no relays.
    #[error("no relays available for the batch")]
    EmptyPool,

    /// A required input is absent or empty.
    #[error("batch input missing or empty: {0}")]
    MissingInput(&'static str),

    /// An outcome log could not be written.
    #[error(transparent)]
    Recorder(#[from] RecorderError),
}
