//! Delivery settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// TLS negotiation policy for relay sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsPolicy {
    /// Upgrade via STARTTLS before authenticating; a failed upgrade
    /// fails the attempt. The default.
    #[default]
    Required,

    /// Upgrade when the relay advertises STARTTLS; proceed in plaintext
    /// when it is rejected. A broken handshake still fails the attempt.
    Opportunistic,

    /// Never upgrade. For plaintext test relays only.
    Disabled,
}

/// TLS configuration for relay sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TlsConfig {
    /// Negotiation policy.
    #[serde(default)]
    pub policy: TlsPolicy,

    /// Accept relay certificates that fail validation (self-signed,
    /// expired). Disables a real security check; for test relays only.
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl TlsConfig {
    #[must_use]
    pub const fn is_required(&self) -> bool {
        matches!(self.policy, TlsPolicy::Required)
    }

    #[must_use]
    pub const fn is_disabled(&self) -> bool {
        matches!(self.policy, TlsPolicy::Disabled)
    }
}

/// Settings for one delivery batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySettings {
    /// Bound on the connectivity probe's connect, in seconds.
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// The name announced in EHLO.
    #[serde(default = "default_helo_domain")]
    pub helo_domain: String,

    /// TLS policy for every relay session.
    #[serde(default)]
    pub tls: TlsConfig,
}

impl DeliverySettings {
    /// The probe timeout as a `Duration`.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            probe_timeout_secs: default_probe_timeout(),
            helo_domain: default_helo_domain(),
            tls: TlsConfig::default(),
        }
    }
}

const fn default_probe_timeout() -> u64 {
    10
}

fn default_helo_domain() -> String {
    "localhost".to_string()
}
