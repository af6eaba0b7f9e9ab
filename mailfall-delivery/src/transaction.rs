//! One authenticated submission to one relay.
//!
//! A transaction covers the whole exchange for a single attempt:
//! connect, greeting, EHLO, TLS upgrade per policy, AUTH, MAIL FROM,
//! RCPT TO, DATA, content, QUIT. The connection is dropped on every
//! exit path; QUIT is attempted first on the success path but never
//! fails an attempt the relay has already accepted.

use mailfall_smtp::client::{AuthMechanism, Response, SmtpClient};

use crate::error::AttemptError;
use crate::recipient::Recipient;
use crate::relay::RelayCredential;
use crate::settings::{DeliverySettings, TlsPolicy};

/// A single delivery attempt against one relay.
pub struct RelayTransaction<'a> {
    relay: &'a RelayCredential,
    settings: &'a DeliverySettings,
}

impl<'a> RelayTransaction<'a> {
    #[must_use]
    pub const fn new(relay: &'a RelayCredential, settings: &'a DeliverySettings) -> Self {
        Self { relay, settings }
    }

    /// Submits `message` for `recipient`, authenticating as the relay's
    /// own account and sending from that identity.
    ///
    /// # Errors
    ///
    /// Returns an `AttemptError` for any failure between connect and the
    /// relay's acceptance of the message content. The caller records it
    /// and fails over; nothing here is retried.
    pub async fn submit(
        &self,
        recipient: &Recipient,
        message: &str,
    ) -> Result<(), AttemptError> {
        let address = self.relay.address();

        let mut client = SmtpClient::connect(&address, self.relay.host.clone())
            .await
            .map_err(|e| AttemptError::Connect(format!("failed to connect to {address}: {e}")))?
            .accept_invalid_certs(self.settings.tls.accept_invalid_certs);

        let greeting = client.read_greeting().await?;
        if !greeting.is_success() {
            return Err(AttemptError::Greeting(greeting.message()));
        }

        let ehlo = self.handshake(&mut client).await?;

        let mechanism = AuthMechanism::select(&ehlo);
        let auth = client
            .authenticate(mechanism, &self.relay.username, &self.relay.secret)
            .await?;
        if !auth.is_success() {
            return Err(AttemptError::Auth(format!(
                "{} {}",
                auth.code,
                auth.message()
            )));
        }

        let mail = client.mail_from(&self.relay.username).await?;
        if !mail.is_success() {
            return Err(AttemptError::Rejected {
                command: "MAIL FROM",
                response: format!("{} {}", mail.code, mail.message()),
            });
        }

        let rcpt = client.rcpt_to(recipient.as_str()).await?;
        if !rcpt.is_success() {
            return Err(AttemptError::Rejected {
                command: "RCPT TO",
                response: format!("{} {}", rcpt.code, rcpt.message()),
            });
        }

        let data = client.data().await?;
        if !data.is_intermediate() {
            return Err(AttemptError::Rejected {
                command: "DATA",
                response: format!("{} {}", data.code, data.message()),
            });
        }

        let accepted = client.send_data(message).await?;
        if !accepted.is_success() {
            return Err(AttemptError::Rejected {
                command: "message content",
                response: format!("{} {}", accepted.code, accepted.message()),
            });
        }

        // Delivered. Close the session politely; a QUIT failure does not
        // undo an accepted message.
        if let Err(e) = client.quit().await {
            tracing::debug!(relay = %self.relay, error = %e, "QUIT failed after accepted delivery");
        }

        Ok(())
    }

    /// EHLO, the TLS upgrade dictated by policy, and the post-upgrade
    /// EHLO. Returns the EHLO reply whose capabilities apply to the rest
    /// of the session.
    async fn handshake(&self, client: &mut SmtpClient) -> Result<Response, AttemptError> {
        let ehlo = self.ehlo(client).await?;

        match self.settings.tls.policy {
            TlsPolicy::Disabled => Ok(ehlo),
            TlsPolicy::Required => {
                let reply = client.starttls().await?;
                if !reply.is_success() {
                    return Err(AttemptError::Tls(format!(
                        "relay rejected STARTTLS: {} {}",
                        reply.code,
                        reply.message()
                    )));
                }
                self.ehlo(client).await
            }
            TlsPolicy::Opportunistic => {
                if !ehlo.advertises("STARTTLS") {
                    return Ok(ehlo);
                }
                let reply = client.starttls().await?;
                if reply.is_success() {
                    self.ehlo(client).await
                } else {
                    // Advertised but refused; the plaintext session is
                    // still usable.
                    tracing::debug!(relay = %self.relay, "STARTTLS refused, continuing in plaintext");
                    Ok(ehlo)
                }
            }
        }
    }

    async fn ehlo(&self, client: &mut SmtpClient) -> Result<Response, AttemptError> {
        let reply = client.ehlo(&self.settings.helo_domain).await?;
        if reply.is_success() {
            Ok(reply)
        } else {
            Err(AttemptError::Rejected {
                command: "EHLO",
                response: format!("{} {}", reply.code, reply.message()),
            })
        }
    }
}
