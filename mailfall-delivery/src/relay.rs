//! The relay pool: ordered credentials for outbound submission.

use std::fmt;

use crate::error::PoolError;

/// Credentials for one outbound relay.
///
/// Identity is `(host, port)`. The port is kept as the raw field text:
/// load-time syntax validation is deliberately absent, and an address
/// that cannot resolve simply fails the connectivity probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayCredential {
    /// Relay hostname or IP.
    pub host: String,
    /// Submission port, as written in the record.
    pub port: String,
    /// Account to authenticate as; also the sender identity for every
    /// message submitted through this relay.
    pub username: String,
    /// The account secret.
    pub secret: String,
}

impl RelayCredential {
    /// The `host:port` connect address.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for RelayCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// An ordered, read-only pool of relays.
///
/// Order is the failover priority: the first-listed relay is the first
/// tried, for every recipient. The pool is never mutated during a run;
/// a relay that fails one attempt is still tried for the next recipient.
#[derive(Debug, Clone)]
pub struct RelayPool {
    relays: Vec<RelayCredential>,
}

impl RelayPool {
    /// Builds a pool from raw records, one per line, four fields
    /// separated by `|`: `host|port|username|secret`.
    ///
    /// A line with any other field count is silently dropped — it is
    /// neither an error nor counted. No deduplication and no host/port
    /// syntax checks are performed here.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Empty` when no valid record remains, which
    /// the caller must treat as fatal for the batch.
    pub fn load<'a, I>(lines: I) -> Result<Self, PoolError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let relays: Vec<RelayCredential> = lines
            .into_iter()
            .filter_map(|line| {
                let fields: Vec<&str> = line.trim().split('|').collect();
                if let [host, port, username, secret] = fields[..] {
                    Some(RelayCredential {
                        host: host.to_string(),
                        port: port.to_string(),
                        username: username.to_string(),
                        secret: secret.to_string(),
                    })
                } else {
                    tracing::debug!(field_count = fields.len(), "dropping malformed relay record");
                    None
                }
            })
            .collect();

        if relays.is_empty() {
            return Err(PoolError::Empty);
        }

        Ok(Self { relays })
    }

    /// The relays in failover priority order.
    pub fn iter(&self) -> std::slice::Iter<'_, RelayCredential> {
        self.relays.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.relays.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.relays.is_empty()
    }
}

impl<'a> IntoIterator for &'a RelayPool {
    type Item = &'a RelayCredential;
    type IntoIter = std::slice::Iter<'a, RelayCredential>;

    fn into_iter(self) -> Self::IntoIter {
        self.relays.iter()
    }
}
