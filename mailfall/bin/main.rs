//! Command-line entry point for mailfall.
//!
//! Two operations are exposed: `send` drives the full delivery batch,
//! and `check` probes every relay in the pool for reachability without
//! composing or sending anything.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use mailfall::commands;
use mailfall::config::Config;

/// Deliver a templated message through a pool of SMTP relays
#[derive(Parser, Debug)]
#[command(name = "mailfall")]
#[command(about = "Relay-failover bulk mail delivery", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deliver the message to every recipient, failing over between relays
    Send {
        #[command(flatten)]
        paths: PathOverrides,
    },
    /// Probe every relay for reachability; nothing is composed or sent
    Check {
        /// Relay records, one `host|port|username|secret` per line
        #[arg(long)]
        relays: Option<PathBuf>,
    },
}

/// Overrides for the configured batch file locations.
#[derive(Args, Debug)]
struct PathOverrides {
    /// Relay records, one `host|port|username|secret` per line
    #[arg(long)]
    relays: Option<PathBuf>,

    /// The HTML message body
    #[arg(long)]
    letter: Option<PathBuf>,

    /// Recipient addresses, one per line
    #[arg(long)]
    recipients: Option<PathBuf>,

    /// The subject line (first non-empty line of the file)
    #[arg(long)]
    subject: Option<PathBuf>,

    /// Where successful deliveries are appended
    #[arg(long)]
    sent_log: Option<PathBuf>,

    /// Where failed attempts are appended
    #[arg(long)]
    failed_log: Option<PathBuf>,
}

impl PathOverrides {
    fn apply(self, config: &mut Config) {
        let paths = &mut config.paths;
        if let Some(relays) = self.relays {
            paths.relays = relays;
        }
        if let Some(letter) = self.letter {
            paths.letter = letter;
        }
        if let Some(recipients) = self.recipients {
            paths.recipients = recipients;
        }
        if let Some(subject) = self.subject {
            paths.subject = subject;
        }
        if let Some(sent_log) = self.sent_log {
            paths.sent_log = sent_log;
        }
        if let Some(failed_log) = self.failed_log {
            paths.failed_log = failed_log;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    mailfall::logging::init();

    let mut config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Send { paths } => {
            paths.apply(&mut config);

            let summary = commands::send(&config).await?;
            println!(
                "Delivered to {} recipient(s), {} exhausted every relay",
                summary.delivered, summary.exhausted
            );
        }
        Commands::Check { relays } => {
            if let Some(relays) = relays {
                config.paths.relays = relays;
            }

            let statuses = commands::check(&config).await?;
            let mut unreachable = 0usize;
            for status in &statuses {
                match &status.reachable {
                    Ok(()) => println!("{}: reachable", status.address),
                    Err(e) => {
                        unreachable += 1;
                        println!("{}: unreachable ({e})", status.address);
                    }
                }
            }

            if unreachable > 0 {
                anyhow::bail!("{unreachable} of {} relay(s) unreachable", statuses.len());
            }
        }
    }

    Ok(())
}
