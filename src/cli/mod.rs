//! CLI module for powerdrill - command-line interface and subcommands.
//!
//! Drives the chat tool the same way a tool host would: build the
//! invocation parameters, invoke, and render the messages in order.

pub mod commands;

pub use commands::Cli;
