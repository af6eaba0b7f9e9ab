//! The mailfall glue layer: input files, configuration, logging, and
//! the command drivers behind the CLI.
//!
//! The delivery core in `mailfall-delivery` takes already-parsed inputs
//! — a relay pool, a message template, a recipient list — and never
//! touches the filesystem except through the outcome recorder. This
//! crate is the collaborator that produces those inputs and wires them
//! together.

pub mod commands;
pub mod config;
pub mod inputs;
pub mod logging;
