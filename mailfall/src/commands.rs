//! Drivers for the CLI commands.
//!
//! `send` runs the full batch pipeline; `check` probes the relay pool
//! and nothing else. The two deliberately share only the probe, not the
//! pipeline, so a reachability check can never touch the letter or the
//! recipient list.

use mailfall_delivery::{
    BatchSummary, DeliveryEngine, MessageTemplate, OutcomeRecorder, RelayStatus, probe_relays,
};

use crate::config::Config;
use crate::inputs;

/// Runs the full delivery batch described by `config`: load the four
/// inputs, then resolve every recipient against the relay pool.
///
/// # Errors
///
/// Returns an error when an input cannot be loaded, when the batch
/// guard rejects the inputs, or when an outcome log cannot be written.
pub async fn send(config: &Config) -> anyhow::Result<BatchSummary> {
    let paths = &config.paths;

    let pool = inputs::load_relays(&paths.relays).await?;
    let subject = inputs::load_subject(&paths.subject).await?;
    let html_body = inputs::load_letter(&paths.letter).await?;
    let recipients = inputs::load_recipients(&paths.recipients).await?;

    let template = MessageTemplate { subject, html_body };
    let recorder = OutcomeRecorder::new(&paths.sent_log, &paths.failed_log);
    let engine = DeliveryEngine::new(&pool, &template, &config.delivery);

    let summary = engine.run(&recipients, &recorder).await?;

    Ok(summary)
}

/// Probes every relay in the configured pool, in order, without
/// composing or sending anything.
///
/// # Errors
///
/// Returns an error when the relay records cannot be loaded.
pub async fn check(config: &Config) -> anyhow::Result<Vec<RelayStatus>> {
    let pool = inputs::load_relays(&config.paths.relays).await?;

    Ok(probe_relays(&pool, &config.delivery).await)
}
