//! Handlers for the CLI subcommands.
//!
//! `main.rs` parses arguments and dispatches here; each module owns one
//! subcommand plus the helpers it shares with others.

pub mod ports;
pub mod route;
pub mod vessels;
