//! A scripted SMTP relay for exercising delivery scenarios.
//!
//! Each command gets a configurable canned reply, so tests can inject a
//! rejection at any stage of the transaction. Received command lines and
//! the number of accepted connections are tracked for assertions.
#![allow(dead_code)] // Shared test support; not every test uses every knob.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

#[derive(Debug, Clone)]
struct Reply {
    code: u16,
    text: String,
}

impl Reply {
    fn new(code: u16, text: impl Into<String>) -> Self {
        Self {
            code,
            text: text.into(),
        }
    }

    fn render(&self) -> String {
        format!("{} {}\r\n", self.code, self.text)
    }
}

#[derive(Debug, Clone)]
struct MockConfig {
    greeting: Reply,
    ehlo_capabilities: Vec<String>,
    starttls: Reply,
    auth: Reply,
    mail_from: Reply,
    rcpt_to: Reply,
    data: Reply,
    data_end: Reply,
    quit: Reply,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            greeting: Reply::new(220, "mock relay ready"),
            ehlo_capabilities: vec!["mock.relay".to_string(), "AUTH PLAIN LOGIN".to_string()],
            starttls: Reply::new(502, "STARTTLS not supported"),
            auth: Reply::new(235, "authentication successful"),
            mail_from: Reply::new(250, "OK"),
            rcpt_to: Reply::new(250, "OK"),
            data: Reply::new(354, "end data with <CRLF>.<CRLF>"),
            data_end: Reply::new(250, "message accepted"),
            quit: Reply::new(221, "bye"),
        }
    }
}

/// A mock relay listening on an ephemeral local port.
pub struct MockRelay {
    addr: SocketAddr,
    commands: Arc<Mutex<Vec<String>>>,
    connections: Arc<AtomicUsize>,
    accept_task: tokio::task::JoinHandle<()>,
}

impl MockRelay {
    pub fn builder() -> MockRelayBuilder {
        MockRelayBuilder {
            config: MockConfig::default(),
        }
    }

    /// Starts a relay that plays the default happy path.
    pub async fn start() -> Self {
        Self::builder().build().await
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Number of connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    /// Every command line received so far, in order.
    pub async fn commands(&self) -> Vec<String> {
        self.commands.lock().await.clone()
    }

    async fn handle_session(
        stream: TcpStream,
        config: MockConfig,
        commands: Arc<Mutex<Vec<String>>>,
    ) -> std::io::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut line = String::new();

        writer.write_all(config.greeting.render().as_bytes()).await?;
        writer.flush().await?;

        loop {
            line.clear();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }
            let command = line.trim().to_string();
            commands.lock().await.push(command.clone());

            let keyword = command
                .split_whitespace()
                .next()
                .unwrap_or_default()
                .to_uppercase();

            match keyword.as_str() {
                "EHLO" | "HELO" => {
                    let mut reply = String::new();
                    let last = config.ehlo_capabilities.len().saturating_sub(1);
                    for (i, cap) in config.ehlo_capabilities.iter().enumerate() {
                        let sep = if i == last { ' ' } else { '-' };
                        reply.push_str(&format!("250{sep}{cap}\r\n"));
                    }
                    writer.write_all(reply.as_bytes()).await?;
                }
                "STARTTLS" => {
                    writer.write_all(config.starttls.render().as_bytes()).await?;
                }
                "AUTH" => {
                    if command.to_uppercase().starts_with("AUTH LOGIN") {
                        // Username and password arrive as separate
                        // base64 lines.
                        writer.write_all(b"334 VXNlcm5hbWU6\r\n").await?;
                        writer.flush().await?;
                        line.clear();
                        reader.read_line(&mut line).await?;
                        commands.lock().await.push(line.trim().to_string());

                        writer.write_all(b"334 UGFzc3dvcmQ6\r\n").await?;
                        writer.flush().await?;
                        line.clear();
                        reader.read_line(&mut line).await?;
                        commands.lock().await.push(line.trim().to_string());
                    }
                    writer.write_all(config.auth.render().as_bytes()).await?;
                }
                "MAIL" => {
                    writer.write_all(config.mail_from.render().as_bytes()).await?;
                }
                "RCPT" => {
                    writer.write_all(config.rcpt_to.render().as_bytes()).await?;
                }
                "DATA" => {
                    writer.write_all(config.data.render().as_bytes()).await?;
                    writer.flush().await?;

                    if config.data.code == 354 {
                        let mut content = String::new();
                        loop {
                            line.clear();
                            if reader.read_line(&mut line).await? == 0 {
                                return Ok(());
                            }
                            if line.trim_end() == "." {
                                break;
                            }
                            content.push_str(&line);
                        }
                        commands.lock().await.push(format!("<content:{} bytes>", content.len()));
                        writer.write_all(config.data_end.render().as_bytes()).await?;
                    }
                }
                "QUIT" => {
                    writer.write_all(config.quit.render().as_bytes()).await?;
                    writer.flush().await?;
                    return Ok(());
                }
                _ => {
                    writer.write_all(b"500 unknown command\r\n").await?;
                }
            }

            writer.flush().await?;
        }
    }
}

impl Drop for MockRelay {
    fn drop(&mut self) {
        self.accept_task.abort();
    }
}

/// Builder for a [`MockRelay`].
pub struct MockRelayBuilder {
    config: MockConfig,
}

impl MockRelayBuilder {
    pub fn with_greeting(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.greeting = Reply::new(code, text);
        self
    }

    pub fn with_ehlo_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.config.ehlo_capabilities = capabilities;
        self
    }

    pub fn with_starttls_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.starttls = Reply::new(code, text);
        self
    }

    pub fn with_auth_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.auth = Reply::new(code, text);
        self
    }

    pub fn with_mail_from_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.mail_from = Reply::new(code, text);
        self
    }

    pub fn with_rcpt_to_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.rcpt_to = Reply::new(code, text);
        self
    }

    pub fn with_data_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.data = Reply::new(code, text);
        self
    }

    pub fn with_data_end_response(mut self, code: u16, text: impl Into<String>) -> Self {
        self.config.data_end = Reply::new(code, text);
        self
    }

    pub async fn build(self) -> MockRelay {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock relay");
        let addr = listener.local_addr().expect("mock relay addr");

        let commands = Arc::new(Mutex::new(Vec::new()));
        let connections = Arc::new(AtomicUsize::new(0));

        let config = self.config;
        let commands_task = Arc::clone(&commands);
        let connections_task = Arc::clone(&connections);

        let accept_task = tokio::spawn(async move {
            loop {
                if let Ok((stream, _peer)) = listener.accept().await {
                    connections_task.fetch_add(1, Ordering::SeqCst);
                    let config = config.clone();
                    let commands = Arc::clone(&commands_task);
                    tokio::spawn(async move {
                        let _ = MockRelay::handle_session(stream, config, commands).await;
                    });
                }
            }
        });

        MockRelay {
            addr,
            commands,
            connections,
            accept_task,
        }
    }
}
