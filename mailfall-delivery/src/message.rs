//! Message composition.

use std::fmt::Write;

use crate::recipient::Recipient;

/// The template reused verbatim for every recipient in a batch. No
/// per-recipient interpolation is performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    /// Single-line subject.
    pub subject: String,
    /// The body, treated as HTML.
    pub html_body: String,
}

impl MessageTemplate {
    /// Composes the wire-format message for one `(sender, recipient)`
    /// pair. The sender is the username of the relay currently being
    /// attempted, so the identity follows the failover.
    #[must_use]
    pub fn compose(&self, from: &str, to: &Recipient) -> String {
        MessageBuilder::new()
            .from(from)
            .to(to.as_str())
            .subject(&self.subject)
            .html_body(&self.html_body)
            .build()
    }
}

/// Builds a multipart message with a single HTML part.
///
/// Header lines use CRLF endings throughout, ready to hand to the SMTP
/// DATA phase. Pure; performs no I/O.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<String>,
    to: Option<String>,
    subject: Option<String>,
    html_body: Option<String>,
}

impl MessageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from(mut self, email: impl Into<String>) -> Self {
        self.from = Some(email.into());
        self
    }

    #[must_use]
    pub fn to(mut self, email: impl Into<String>) -> Self {
        self.to = Some(email.into());
        self
    }

    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the HTML body, carried verbatim into the message.
    #[must_use]
    pub fn html_body(mut self, content: impl Into<String>) -> Self {
        self.html_body = Some(content.into());
        self
    }

    /// Renders the message: headers, then a `multipart/mixed` body whose
    /// one part is `text/html`.
    #[must_use]
    pub fn build(self) -> String {
        let boundary = generate_boundary();
        let mut message = String::with_capacity(
            1024 + self.html_body.as_ref().map_or(0, String::len),
        );

        if let Some(from) = &self.from {
            let _ = write!(message, "From: {from}\r\n");
        }
        if let Some(to) = &self.to {
            let _ = write!(message, "To: {to}\r\n");
        }
        if let Some(subject) = &self.subject {
            let _ = write!(message, "Subject: {subject}\r\n");
        }

        message.push_str("MIME-Version: 1.0\r\n");
        let _ = write!(
            message,
            "Content-Type: multipart/mixed; boundary=\"{boundary}\"\r\n"
        );
        message.push_str("\r\n");

        let _ = write!(message, "--{boundary}\r\n");
        message.push_str("Content-Type: text/html; charset=utf-8\r\n");
        message.push_str("\r\n");
        if let Some(body) = &self.html_body {
            message.push_str(body);
        }
        message.push_str("\r\n");

        let _ = write!(message, "--{boundary}--\r\n");

        message
    }
}

/// Generates a boundary string unique enough for one message.
fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    format!("----=_Part_{timestamp}")
}
