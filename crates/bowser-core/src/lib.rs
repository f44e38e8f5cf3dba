//! # Bowser Core
//!
//! Core functionality for bowser: watch a directory tree for subtrees
//! marked ready and synchronize each one to the configured remote
//! backends.
//!
//! A subtree is marked ready by creating a `.bowser.ready` file inside
//! it. Each ready signal fans out one upload per backend; a backend makes
//! its destination reflect the subtree's current files with an idempotent
//! clear-then-write protocol, so re-signaling a subtree is a safe retry.
//! The watch ends when the stop strategy is satisfied, the abort marker
//! appears, or the process is interrupted.
//!
//! ## Error Handling
//!
//! All fallible operations return `Result<T, Error>`. Use:
//! - `?` operator for propagation
//! - `map`, `and_then` combinators for transformation
//! - `match` / `map_or` / `unwrap_or_else` for defaults

pub mod backend;
pub mod config;
pub mod dispatch;
mod error;
pub mod markers;
pub mod signal;
pub mod watch;

pub use backend::{provide_backends, Backend};
pub use config::{load_app_configuration, BowserConfig};
pub use error::{Error, ExecutionError, Result, SystemError, ValidationError};
pub use signal::interrupt_channel;
pub use watch::{WatchOutcome, WatchStrategy};
