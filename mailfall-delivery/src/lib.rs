//! Relay-failover delivery engine.
//!
//! Given an ordered pool of relay credentials, a message template, and a
//! recipient list, the engine resolves each recipient in turn: walk the
//! pool in priority order, gate each relay with a connectivity probe,
//! attempt one authenticated submission through the first reachable
//! relay, and fail over to the next relay until one accepts the message
//! or the pool is exhausted. Every terminal attempt outcome is appended
//! to one of two durable logs.

mod engine;
mod error;
mod message;
mod outcome;
mod recipient;
mod relay;
mod settings;
mod transaction;

pub use engine::{BatchSummary, DeliveryEngine, RelayStatus, probe_relays};
pub use error::{AttemptError, BatchError, PoolError, RecorderError};
pub use message::{MessageBuilder, MessageTemplate};
pub use outcome::{DeliveryOutcome, OutcomeRecorder};
pub use recipient::{InvalidRecipient, Recipient};
pub use relay::{RelayCredential, RelayPool};
pub use settings::{DeliverySettings, TlsConfig, TlsPolicy};
