//! Searoute CLI library.
//!
//! Command handlers, logging setup and output rendering for the `searoute`
//! binary.

pub mod commands;
pub mod logging;
pub mod output;
