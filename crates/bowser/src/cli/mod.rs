//! CLI command tree and handlers

pub mod commands;
pub mod handlers;

pub use commands::build_cli;
