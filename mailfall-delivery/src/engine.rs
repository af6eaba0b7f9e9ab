//! The failover delivery engine.
//!
//! Per recipient, the engine walks the relay pool in priority order:
//! probe, attempt one authenticated submission through the first
//! reachable relay, stop at the first acceptance, otherwise fail over
//! until the pool is exhausted. Processing is strictly sequential — one
//! recipient fully resolves before the next begins, one relay attempt
//! fully resolves before the next relay is tried.

use mailfall_smtp::{ProbeError, probe};

use crate::error::BatchError;
use crate::message::MessageTemplate;
use crate::outcome::{DeliveryOutcome, OutcomeRecorder};
use crate::recipient::Recipient;
use crate::relay::RelayPool;
use crate::settings::DeliverySettings;
use crate::transaction::RelayTransaction;

/// Totals for one completed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Recipients with a `Sent` outcome.
    pub delivered: usize,
    /// Recipients for whom every relay failed or was unreachable.
    pub exhausted: usize,
}

/// The delivery engine for one batch.
pub struct DeliveryEngine<'a> {
    pool: &'a RelayPool,
    template: &'a MessageTemplate,
    settings: &'a DeliverySettings,
}

impl<'a> DeliveryEngine<'a> {
    #[must_use]
    pub const fn new(
        pool: &'a RelayPool,
        template: &'a MessageTemplate,
        settings: &'a DeliverySettings,
    ) -> Self {
        Self {
            pool,
            template,
            settings,
        }
    }

    /// Runs the batch: resolves every recipient, in order, appending
    /// each terminal attempt outcome to `recorder`.
    ///
    /// No relay is contacted and nothing is written unless the pool,
    /// recipient list, subject, and body are all non-empty.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::EmptyPool`/`MissingInput` when an input is
    /// absent, before any network traffic, and `BatchError::Recorder`
    /// when an outcome log cannot be written — both abort the batch.
    pub async fn run(
        &self,
        recipients: &[Recipient],
        recorder: &OutcomeRecorder,
    ) -> Result<BatchSummary, BatchError> {
        if self.pool.is_empty() {
            return Err(BatchError::EmptyPool);
        }
        if recipients.is_empty() {
            return Err(BatchError::MissingInput("recipients"));
        }
        if self.template.subject.trim().is_empty() {
            return Err(BatchError::MissingInput("subject"));
        }
        if self.template.html_body.is_empty() {
            return Err(BatchError::MissingInput("message body"));
        }

        let mut summary = BatchSummary::default();

        for recipient in recipients {
            if self.deliver_one(recipient, recorder).await? {
                summary.delivered += 1;
            } else {
                summary.exhausted += 1;
            }
        }

        tracing::info!(
            delivered = summary.delivered,
            exhausted = summary.exhausted,
            "batch complete"
        );

        Ok(summary)
    }

    /// Resolves one recipient. Returns `true` when a relay accepted the
    /// message, `false` when the pool was exhausted.
    async fn deliver_one(
        &self,
        recipient: &Recipient,
        recorder: &OutcomeRecorder,
    ) -> Result<bool, BatchError> {
        for relay in self.pool {
            // Gate with the probe: an unreachable relay is skipped
            // without a log line, saving the authenticated attempt.
            if let Err(e) = probe(&relay.address(), self.settings.probe_timeout()).await {
                tracing::debug!(relay = %relay, error = %e, "relay unreachable, skipping");
                continue;
            }

            let message = self.template.compose(&relay.username, recipient);
            let attempt = RelayTransaction::new(relay, self.settings)
                .submit(recipient, &message)
                .await;

            match attempt {
                Ok(()) => {
                    recorder
                        .record(&DeliveryOutcome::sent(recipient.as_str(), &relay.host))
                        .await?;
                    tracing::info!(recipient = %recipient, relay = %relay, "delivered");
                    return Ok(true);
                }
                Err(e) => {
                    recorder
                        .record(&DeliveryOutcome::failed(
                            recipient.as_str(),
                            &relay.host,
                            e.to_string(),
                        ))
                        .await?;
                    tracing::warn!(recipient = %recipient, relay = %relay, error = %e, "attempt failed, trying next relay");
                }
            }
        }

        tracing::warn!(recipient = %recipient, "all relays exhausted");
        Ok(false)
    }
}

/// Reachability of one relay, as reported by [`probe_relays`].
#[derive(Debug)]
pub struct RelayStatus {
    /// The relay's `host:port` address.
    pub address: String,
    /// `Ok` when the relay accepted a connection within the bound.
    pub reachable: Result<(), ProbeError>,
}

/// Probes every relay in the pool, in order, without composing or
/// sending anything. This is the standalone reachability check; it
/// shares nothing with the delivery pipeline but the probe itself.
pub async fn probe_relays(pool: &RelayPool, settings: &DeliverySettings) -> Vec<RelayStatus> {
    let mut statuses = Vec::with_capacity(pool.len());

    for relay in pool {
        let address = relay.address();
        let reachable = probe(&address, settings.probe_timeout()).await;
        match &reachable {
            Ok(()) => tracing::info!(relay = %relay, "relay reachable"),
            Err(e) => tracing::warn!(relay = %relay, error = %e, "relay unreachable"),
        }
        statuses.push(RelayStatus { address, reachable });
    }

    statuses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template() -> MessageTemplate {
        MessageTemplate {
            subject: "Hello".to_string(),
            html_body: "<p>hi</p>".to_string(),
        }
    }

    fn recorder(dir: &tempfile::TempDir) -> OutcomeRecorder {
        OutcomeRecorder::new(dir.path().join("sent.txt"), dir.path().join("failed.txt"))
    }

    #[tokio::test]
    async fn aborts_on_empty_recipient_list() {
        let dir = tempfile::tempdir().unwrap();
        let pool = RelayPool::load("mx1|2525|u|p".lines()).unwrap();
        let template = template();
        let settings = DeliverySettings::default();
        let engine = DeliveryEngine::new(&pool, &template, &settings);

        let result = engine.run(&[], &recorder(&dir)).await;
        assert!(matches!(result, Err(BatchError::MissingInput("recipients"))));
        assert!(!dir.path().join("sent.txt").exists());
        assert!(!dir.path().join("failed.txt").exists());
    }

    #[tokio::test]
    async fn aborts_on_blank_subject() {
        let dir = tempfile::tempdir().unwrap();
        let pool = RelayPool::load("mx1|2525|u|p".lines()).unwrap();
        let template = MessageTemplate {
            subject: "   ".to_string(),
            html_body: "<p>hi</p>".to_string(),
        };
        let settings = DeliverySettings::default();
        let engine = DeliveryEngine::new(&pool, &template, &settings);
        let recipients = vec!["x@y.com".parse().unwrap()];

        let result = engine.run(&recipients, &recorder(&dir)).await;
        assert!(matches!(result, Err(BatchError::MissingInput("subject"))));
    }

    #[tokio::test]
    async fn aborts_on_empty_body() {
        let dir = tempfile::tempdir().unwrap();
        let pool = RelayPool::load("mx1|2525|u|p".lines()).unwrap();
        let template = MessageTemplate {
            subject: "Hello".to_string(),
            html_body: String::new(),
        };
        let settings = DeliverySettings::default();
        let engine = DeliveryEngine::new(&pool, &template, &settings);
        let recipients = vec!["x@y.com".parse().unwrap()];

        let result = engine.run(&recipients, &recorder(&dir)).await;
        assert!(matches!(
            result,
            Err(BatchError::MissingInput("message body"))
        ));
    }
}
