//! Configuration loading and management
//!
//! # Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. System config: /etc/bowser.toml
//! 3. User config: $XDG_CONFIG_HOME/bowser/bowser.toml (default ~/.config)
//!
//! Tables merge recursively; scalar and array values from later files
//! override earlier ones wholesale.
//!
//! # Example Config
//!
//! ```toml
//! [bowser]
//! verbose = false
//!
//! [[bowser.backends]]
//! kind = "AWS-S3"
//! region = "us-east-1"
//! access_key_id = "AKIA..."
//! secret_access_key = "..."
//!
//! [[bowser.backends.buckets]]
//! name = "warehouse"
//! prefix = "drops"
//!
//! [bowser.backends.buckets.link]
//! name = "latest"
//! target = { kind = "Pattern", pattern = '\d{8}T\d{6}' }
//! ```

pub mod backend;
pub mod link;
pub mod loader;

use std::fmt;

use serde::Deserialize;

pub use backend::{AwsS3Config, BackendConfig, Bucket};
pub use link::{Link, LinkTarget};
pub use loader::load_app_configuration;

/// Top-level application configuration (the `[bowser]` table).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BowserConfig {
    /// If `true`, logging is set to the most verbose level.
    #[serde(default)]
    pub verbose: bool,
    /// The remote backends to synchronize ready subtrees to.
    #[serde(default)]
    pub backends: Vec<BackendConfig>,
}

/// A string that must not leak into logs or debug output.
///
/// Used for credentials. `Display` and `Debug` both render a redaction
/// marker; the wrapped value is only reachable through [`Secret::expose`].
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    /// Wrap a sensitive value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the wrapped value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**********)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("**********")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_never_leaks_in_debug_or_display() {
        let secret = Secret::new("super-sensitive");
        assert!(!format!("{secret:?}").contains("super-sensitive"));
        assert!(!format!("{secret}").contains("super-sensitive"));
        assert_eq!(secret.expose(), "super-sensitive");
    }

    #[test]
    fn test_default_config_has_no_backends() {
        let config = BowserConfig::default();
        assert!(config.backends.is_empty());
        assert!(!config.verbose);
    }
}
