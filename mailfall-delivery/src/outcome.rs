//! Durable per-attempt outcome records.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::RecorderError;

/// The terminal result of one `(recipient, relay)` attempt.
///
/// Created when an attempt resolves, appended to the recorder, then
/// discarded — nothing accumulates in memory across recipients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The relay accepted the message.
    Sent {
        /// The recipient address.
        recipient: String,
        /// Host of the relay that accepted the message.
        relay_host: String,
    },
    /// The attempt failed after the relay passed the connectivity probe.
    Failed {
        /// The recipient address.
        recipient: String,
        /// Host of the relay that failed.
        relay_host: String,
        /// The failure, as text.
        error: String,
    },
}

impl DeliveryOutcome {
    #[must_use]
    pub fn sent(recipient: impl Into<String>, relay_host: impl Into<String>) -> Self {
        Self::Sent {
            recipient: recipient.into(),
            relay_host: relay_host.into(),
        }
    }

    #[must_use]
    pub fn failed(
        recipient: impl Into<String>,
        relay_host: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self::Failed {
            recipient: recipient.into(),
            relay_host: relay_host.into(),
            error: error.into(),
        }
    }

    /// The log line for this outcome.
    #[must_use]
    pub fn line(&self) -> String {
        match self {
            Self::Sent {
                recipient,
                relay_host,
            } => format!("Email successfully sent to {recipient} using {relay_host}"),
            Self::Failed {
                recipient,
                relay_host,
                error,
            } => format!(
                "Failed to send email to {recipient} using {relay_host}. Error: {error}"
            ),
        }
    }
}

/// Appends outcomes to two independent durable logs, one per kind, so
/// successes and failures can be audited separately.
///
/// Each append opens the destination, writes one line, and releases it.
/// Nothing is created until the first outcome of that kind exists, so an
/// aborted batch leaves no partial files behind.
#[derive(Debug, Clone)]
pub struct OutcomeRecorder {
    sent_path: PathBuf,
    failed_path: PathBuf,
}

impl OutcomeRecorder {
    #[must_use]
    pub fn new(sent_path: impl Into<PathBuf>, failed_path: impl Into<PathBuf>) -> Self {
        Self {
            sent_path: sent_path.into(),
            failed_path: failed_path.into(),
        }
    }

    /// Appends one outcome to its destination.
    ///
    /// # Errors
    ///
    /// Returns `RecorderError` when the destination cannot be opened or
    /// written; the caller must abort the batch rather than continue
    /// with a silent audit gap.
    pub async fn record(&self, outcome: &DeliveryOutcome) -> Result<(), RecorderError> {
        let path = match outcome {
            DeliveryOutcome::Sent { .. } => &self.sent_path,
            DeliveryOutcome::Failed { .. } => &self.failed_path,
        };
        Self::append(path, &outcome.line()).await
    }

    async fn append(path: &Path, line: &str) -> Result<(), RecorderError> {
        let wrap = |source| RecorderError {
            path: path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(path)
            .await
            .map_err(wrap)?;

        file.write_all(format!("{line}\n").as_bytes())
            .await
            .map_err(wrap)?;
        file.flush().await.map_err(wrap)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sent_line_format() {
        let outcome = DeliveryOutcome::sent("x@y.com", "mx1.example.com");
        assert_eq!(
            outcome.line(),
            "Email successfully sent to x@y.com using mx1.example.com"
        );
    }

    #[test]
    fn failed_line_format() {
        let outcome =
            DeliveryOutcome::failed("x@y.com", "mx1.example.com", "authentication failed: 535");
        assert_eq!(
            outcome.line(),
            "Failed to send email to x@y.com using mx1.example.com. Error: authentication failed: 535"
        );
    }

    #[tokio::test]
    async fn appends_to_separate_destinations() {
        let dir = tempfile::tempdir().unwrap();
        let sent = dir.path().join("sent.txt");
        let failed = dir.path().join("failed.txt");
        let recorder = OutcomeRecorder::new(&sent, &failed);

        recorder
            .record(&DeliveryOutcome::sent("a@b.com", "mx1"))
            .await
            .unwrap();
        recorder
            .record(&DeliveryOutcome::failed("c@d.com", "mx2", "boom"))
            .await
            .unwrap();
        recorder
            .record(&DeliveryOutcome::sent("e@f.com", "mx1"))
            .await
            .unwrap();

        let sent_lines = std::fs::read_to_string(&sent).unwrap();
        assert_eq!(
            sent_lines,
            "Email successfully sent to a@b.com using mx1\nEmail successfully sent to e@f.com using mx1\n"
        );

        let failed_lines = std::fs::read_to_string(&failed).unwrap();
        assert_eq!(
            failed_lines,
            "Failed to send email to c@d.com using mx2. Error: boom\n"
        );
    }

    #[tokio::test]
    async fn nothing_is_created_until_first_append() {
        let dir = tempfile::tempdir().unwrap();
        let sent = dir.path().join("sent.txt");
        let failed = dir.path().join("failed.txt");
        let _recorder = OutcomeRecorder::new(&sent, &failed);

        assert!(!sent.exists());
        assert!(!failed.exists());
    }

    #[tokio::test]
    async fn unwritable_destination_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing_dir = dir.path().join("no-such-dir").join("sent.txt");
        let recorder = OutcomeRecorder::new(&missing_dir, dir.path().join("failed.txt"));

        let result = recorder
            .record(&DeliveryOutcome::sent("a@b.com", "mx1"))
            .await;
        assert!(result.is_err());
    }
}
