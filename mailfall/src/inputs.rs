//! Batch input loading.
//!
//! These functions turn the four input files into the parsed values the
//! delivery engine consumes. Every failure here is fatal for the batch:
//! nothing has been sent yet, and aborting before the first relay
//! contact is exactly what the engine's batch guard expects.

use std::path::{Path, PathBuf};

use thiserror::Error;

use mailfall_delivery::{InvalidRecipient, PoolError, Recipient, RelayPool};

/// A batch input could not be loaded.
#[derive(Debug, Error)]
pub enum InputError {
    /// The file could not be read.
    #[error("failed to read {name} from {}: {source}", path.display())]
    Read {
        /// Which input this was.
        name: &'static str,
        /// The path that was tried.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file was read but held nothing usable.
    #[error("no {name} found in {}", path.display())]
    Empty {
        /// Which input this was.
        name: &'static str,
        /// The path that was read.
        path: PathBuf,
    },

    /// No relay record survived parsing.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A recipient line failed the validity predicate.
    #[error(transparent)]
    InvalidRecipient(#[from] InvalidRecipient),
}

async fn read(name: &'static str, path: &Path) -> Result<String, InputError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| InputError::Read {
            name,
            path: path.to_path_buf(),
            source,
        })
}

/// Loads the relay pool from `host|port|username|secret` records.
///
/// # Errors
///
/// Returns an error when the file is unreadable or no valid record
/// remains.
pub async fn load_relays(path: &Path) -> Result<RelayPool, InputError> {
    let content = read("relay records", path).await?;
    Ok(RelayPool::load(content.lines())?)
}

/// Loads the recipient list: one address per line, whitespace-trimmed,
/// blank lines skipped, order preserved.
///
/// Any line failing the validity predicate rejects the whole batch here,
/// at the boundary — per-attempt validation does not exist.
///
/// # Errors
///
/// Returns an error when the file is unreadable, empty, or holds an
/// invalid address.
pub async fn load_recipients(path: &Path) -> Result<Vec<Recipient>, InputError> {
    let content = read("recipients", path).await?;

    let recipients = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect::<Result<Vec<Recipient>, InvalidRecipient>>()?;

    if recipients.is_empty() {
        return Err(InputError::Empty {
            name: "recipients",
            path: path.to_path_buf(),
        });
    }

    Ok(recipients)
}

/// Loads the subject: the first non-empty line of the file, trimmed.
///
/// # Errors
///
/// Returns an error when the file is unreadable or has no non-empty
/// line.
pub async fn load_subject(path: &Path) -> Result<String, InputError> {
    let content = read("subject", path).await?;

    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or_else(|| InputError::Empty {
            name: "subject",
            path: path.to_path_buf(),
        })
}

/// Loads the message body: the entire file, treated as HTML.
///
/// # Errors
///
/// Returns an error when the file is unreadable or blank.
pub async fn load_letter(path: &Path) -> Result<String, InputError> {
    let content = read("message body", path).await?;

    if content.trim().is_empty() {
        return Err(InputError::Empty {
            name: "message body",
            path: path.to_path_buf(),
        });
    }

    Ok(content)
}
