//! Authenticating SMTP client.
//!
//! The client speaks just enough ESMTP for relay submission: greeting,
//! EHLO, STARTTLS upgrade, AUTH (PLAIN and LOGIN), MAIL FROM, RCPT TO,
//! DATA, and QUIT. Responses are surfaced to the caller rather than
//! interpreted here; deciding whether a reply code fails a delivery
//! attempt is the delivery engine's business.

mod auth;
mod client;
mod connection;
mod error;
mod response;

pub use auth::AuthMechanism;
pub use client::SmtpClient;
pub use error::{ClientError, Result};
pub use response::Response;
