//! Batch configuration.
//!
//! All file locations travel in one explicit struct handed to the
//! command drivers at batch start; there is no ambient "current paths"
//! state. Values come from an optional RON configuration file, with the
//! CLI able to override individual paths.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use mailfall_delivery::DeliverySettings;

/// Where the batch inputs and outcome logs live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPaths {
    /// Relay records, one `host|port|username|secret` per line.
    #[serde(default = "default_relays")]
    pub relays: PathBuf,

    /// The HTML message body.
    #[serde(default = "default_letter")]
    pub letter: PathBuf,

    /// Recipient addresses, one per line.
    #[serde(default = "default_recipients")]
    pub recipients: PathBuf,

    /// The subject line (first non-empty line of the file).
    #[serde(default = "default_subject")]
    pub subject: PathBuf,

    /// Append-only log of successful deliveries.
    #[serde(default = "default_sent_log")]
    pub sent_log: PathBuf,

    /// Append-only log of failed attempts.
    #[serde(default = "default_failed_log")]
    pub failed_log: PathBuf,
}

impl Default for BatchPaths {
    fn default() -> Self {
        Self {
            relays: default_relays(),
            letter: default_letter(),
            recipients: default_recipients(),
            subject: default_subject(),
            sent_log: default_sent_log(),
            failed_log: default_failed_log(),
        }
    }
}

fn default_relays() -> PathBuf {
    PathBuf::from("smtps.txt")
}

fn default_letter() -> PathBuf {
    PathBuf::from("letter.html")
}

fn default_recipients() -> PathBuf {
    PathBuf::from("emails.txt")
}

fn default_subject() -> PathBuf {
    PathBuf::from("subject.txt")
}

fn default_sent_log() -> PathBuf {
    PathBuf::from("sent.txt")
}

fn default_failed_log() -> PathBuf {
    PathBuf::from("failed.txt")
}

/// Full configuration for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Input and outcome-log locations.
    #[serde(default)]
    pub paths: BatchPaths,

    /// Delivery behavior: probe timeout, EHLO name, TLS policy.
    #[serde(default)]
    pub delivery: DeliverySettings,
}

impl Config {
    /// Loads configuration.
    ///
    /// With an explicit path the file must exist. Otherwise the usual
    /// locations are tried in order — the `MAILFALL_CONFIG` environment
    /// variable, `./mailfall.config.ron`, then
    /// `/etc/mailfall/mailfall.config.ron` — and when none exists the
    /// defaults apply.
    ///
    /// # Errors
    ///
    /// Returns an error when a named file cannot be read or parsed, or
    /// when `MAILFALL_CONFIG` points at a file that does not exist.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file()?,
        };

        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        ron::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))
    }

    fn find_config_file() -> anyhow::Result<Option<PathBuf>> {
        if let Ok(env_path) = std::env::var("MAILFALL_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                return Ok(Some(path));
            }
            anyhow::bail!(
                "MAILFALL_CONFIG points to non-existent file: {}",
                path.display()
            );
        }

        let default_paths = [
            PathBuf::from("./mailfall.config.ron"),
            PathBuf::from("/etc/mailfall/mailfall.config.ron"),
        ];

        Ok(default_paths.into_iter().find(|path| path.exists()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mailfall_delivery::TlsPolicy;

    #[test]
    fn defaults_use_the_conventional_file_names() {
        let config = Config::default();
        assert_eq!(config.paths.relays, PathBuf::from("smtps.txt"));
        assert_eq!(config.paths.sent_log, PathBuf::from("sent.txt"));
        assert_eq!(config.paths.failed_log, PathBuf::from("failed.txt"));
        assert_eq!(config.delivery.probe_timeout_secs, 10);
    }

    #[test]
    fn parses_a_partial_ron_document() {
        let raw = r#"(
    paths: (
        relays: "relays/pool.txt",
    ),
    delivery: (
        probe_timeout_secs: 3,
        tls: (
            policy: disabled,
        ),
    ),
)"#;

        let config: Config = ron::from_str(raw).unwrap();
        assert_eq!(config.paths.relays, PathBuf::from("relays/pool.txt"));
        // Unset paths keep their defaults.
        assert_eq!(config.paths.letter, PathBuf::from("letter.html"));
        assert_eq!(config.delivery.probe_timeout_secs, 3);
        assert_eq!(config.delivery.tls.policy, TlsPolicy::Disabled);
    }
}
