//! The SMTP client proper.

use super::auth::{self, AuthMechanism};
use super::connection::Connection;
use super::error::{ClientError, Result};
use super::response::Response;

/// Initial size of the read buffer for SMTP replies.
const BUFFER_SIZE: usize = 8192;

/// Upper bound on the read buffer, in case a relay streams garbage.
const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// An SMTP client connected to a single relay.
///
/// The connection is closed when the client is dropped, on every path.
pub struct SmtpClient {
    connection: Option<Connection>,
    buffer: Vec<u8>,
    buffer_pos: usize,
    server_name: String,
    accept_invalid_certs: bool,
}

impl SmtpClient {
    /// Connects to `addr` (`host:port`). `server_name` is the name the
    /// relay's TLS certificate is validated against on STARTTLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(addr: &str, server_name: String) -> Result<Self> {
        let stream = tokio::net::TcpStream::connect(addr).await?;

        Ok(Self {
            connection: Some(Connection::Plain(stream)),
            buffer: vec![0u8; BUFFER_SIZE],
            buffer_pos: 0,
            server_name,
            accept_invalid_certs: false,
        })
    }

    /// Accept relay certificates that fail validation (self-signed or
    /// expired). Off by default.
    #[must_use]
    pub const fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Reads the relay's initial greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the greeting is malformed.
    pub async fn read_greeting(&mut self) -> Result<Response> {
        self.read_response().await
    }

    /// Sends one command line and reads the reply.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading fails.
    pub async fn command(&mut self, command: &str) -> Result<Response> {
        let data = format!("{command}\r\n");
        self.connection
            .as_mut()
            .ok_or(ClientError::Closed)?
            .send(data.as_bytes())
            .await?;
        self.read_response().await
    }

    /// Sends `EHLO`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn ehlo(&mut self, domain: &str) -> Result<Response> {
        self.command(&format!("EHLO {domain}")).await
    }

    /// Sends `STARTTLS` and, on a 220 reply, upgrades the connection.
    ///
    /// A non-success reply is returned without upgrading; the caller
    /// decides whether that fails the attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange or the TLS handshake fails.
    pub async fn starttls(&mut self) -> Result<Response> {
        let response = self.command("STARTTLS").await?;

        if response.is_success() {
            let connection = self.connection.take().ok_or(ClientError::Closed)?;
            self.connection = Some(
                connection
                    .upgrade_to_tls(&self.server_name, self.accept_invalid_certs)
                    .await?,
            );
            // Any bytes buffered before the handshake belong to the
            // plaintext session and must not leak into the TLS one.
            self.buffer_pos = 0;
        }

        Ok(response)
    }

    /// Authenticates with the given mechanism and credentials, returning
    /// the relay's final reply (235 on success).
    ///
    /// For LOGIN, a non-334 reply to an intermediate step is returned
    /// as-is so the caller sees the relay's actual refusal.
    ///
    /// # Errors
    ///
    /// Returns an error if an exchange fails at the transport level.
    pub async fn authenticate(
        &mut self,
        mechanism: AuthMechanism,
        username: &str,
        secret: &str,
    ) -> Result<Response> {
        match mechanism {
            AuthMechanism::Plain => {
                let payload = auth::plain_payload(username, secret);
                self.command(&format!("AUTH PLAIN {payload}")).await
            }
            AuthMechanism::Login => {
                let response = self.command("AUTH LOGIN").await?;
                if response.code != 334 {
                    return Ok(response);
                }
                let response = self.command(&auth::login_step(username)).await?;
                if response.code != 334 {
                    return Ok(response);
                }
                self.command(&auth::login_step(secret)).await
            }
        }
    }

    /// Sends `MAIL FROM`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn mail_from(&mut self, from: &str) -> Result<Response> {
        self.command(&format!("MAIL FROM:<{from}>")).await
    }

    /// Sends `RCPT TO`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn rcpt_to(&mut self, to: &str) -> Result<Response> {
        self.command(&format!("RCPT TO:<{to}>")).await
    }

    /// Sends `DATA`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn data(&mut self) -> Result<Response> {
        self.command("DATA").await
    }

    /// Sends the message content followed by the end-of-data marker.
    ///
    /// # Errors
    ///
    /// Returns an error if sending or reading the reply fails.
    pub async fn send_data(&mut self, data: &str) -> Result<Response> {
        let connection = self.connection.as_mut().ok_or(ClientError::Closed)?;

        connection.send(data.as_bytes()).await?;

        // Terminate the last line before the end-of-data marker.
        if data.ends_with("\r\n") {
            // Already terminated.
        } else if data.ends_with('\n') {
            connection.send(b"\r").await?;
        } else {
            connection.send(b"\r\n").await?;
        }

        connection.send(b".\r\n").await?;

        self.read_response().await
    }

    /// Sends `QUIT`.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails.
    pub async fn quit(&mut self) -> Result<Response> {
        self.command("QUIT").await
    }

    /// Reads one complete SMTP reply, growing the buffer as needed.
    async fn read_response(&mut self) -> Result<Response> {
        loop {
            if let Some((response, consumed)) = Response::parse(&self.buffer[..self.buffer_pos])? {
                self.buffer.copy_within(consumed..self.buffer_pos, 0);
                self.buffer_pos -= consumed;
                return Ok(response);
            }

            if self.buffer_pos >= self.buffer.len() {
                let new_size = self.buffer.len() * 2;
                if new_size > MAX_BUFFER_SIZE {
                    return Err(ClientError::Parse(format!(
                        "reply exceeds {MAX_BUFFER_SIZE} bytes"
                    )));
                }
                self.buffer.resize(new_size, 0);
            }

            let connection = self.connection.as_mut().ok_or(ClientError::Closed)?;
            let n = connection.read(&mut self.buffer[self.buffer_pos..]).await?;
            self.buffer_pos += n;
        }
    }
}
