//! SMTP client plumbing for the mailfall relay mailer.
//!
//! This crate carries the transport-level pieces of outbound submission:
//! an authenticating SMTP client with STARTTLS support, SMTP reply
//! parsing, and a cheap connectivity probe used to gate full delivery
//! attempts against relays that are not even accepting connections.

pub mod client;
pub mod probe;

pub use client::{AuthMechanism, ClientError, Response, SmtpClient};
pub use probe::{ProbeError, probe};
