//! SASL mechanism selection and payload encoding for SMTP AUTH.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};

use super::response::Response;

/// The authentication mechanisms the client can speak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMechanism {
    /// `AUTH PLAIN` with the credentials in a single base64 payload.
    Plain,
    /// `AUTH LOGIN` with username and password sent as separate
    /// base64-encoded steps.
    Login,
}

impl AuthMechanism {
    /// Picks a mechanism from the relay's EHLO reply.
    ///
    /// PLAIN is preferred; LOGIN is used when the relay advertises only
    /// LOGIN. A relay that advertises neither still gets PLAIN, so that
    /// its rejection of the attempt is what the operator sees, rather
    /// than a silent skip of authentication.
    #[must_use]
    pub fn select(ehlo: &Response) -> Self {
        let auth_line = ehlo
            .lines
            .iter()
            .find(|line| line.split_whitespace().next().is_some_and(|w| w.eq_ignore_ascii_case("AUTH")));

        match auth_line {
            Some(line) => {
                let offers = |name: &str| {
                    line.split_whitespace()
                        .skip(1)
                        .any(|m| m.eq_ignore_ascii_case(name))
                };
                if !offers("PLAIN") && offers("LOGIN") {
                    Self::Login
                } else {
                    Self::Plain
                }
            }
            None => Self::Plain,
        }
    }
}

/// Encodes the `AUTH PLAIN` initial response: base64 of
/// `\0username\0secret` (RFC 4616, with an empty authorization identity).
#[must_use]
pub(super) fn plain_payload(username: &str, secret: &str) -> String {
    let mut raw = Vec::with_capacity(username.len() + secret.len() + 2);
    raw.push(0);
    raw.extend_from_slice(username.as_bytes());
    raw.push(0);
    raw.extend_from_slice(secret.as_bytes());
    BASE64.encode(raw)
}

/// Encodes one `AUTH LOGIN` step (username or password).
#[must_use]
pub(super) fn login_step(value: &str) -> String {
    BASE64.encode(value.as_bytes())
}
