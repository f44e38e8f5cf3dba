//! Link alias rules
//!
//! A [`Link`] publishes content under a secondary destination key whenever
//! the computed primary key matches its target. The canonical use is a
//! `latest` pointer: a rule matching a timestamped prefix mirrors every
//! upload under a stable alias.

use std::fmt;

use regex::Regex;
use serde::Deserialize;

use crate::{Error, Result};

/// Matcher deciding whether a destination key is a valid link target.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind")]
pub enum LinkTarget {
    /// Substring match against a literal string.
    Literal { literal: String },
    /// Regex search (not a full-string match).
    Pattern {
        #[serde(deserialize_with = "deserialize_regex")]
        pattern: Regex,
    },
}

fn deserialize_regex<'de, D>(deserializer: D) -> std::result::Result<Regex, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Regex::new(&raw).map_err(serde::de::Error::custom)
}

impl LinkTarget {
    /// Determine if `value` is a valid target according to this matcher.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            Self::Literal { literal } => value.contains(literal.as_str()),
            Self::Pattern { pattern } => pattern.is_match(value),
        }
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal { literal } => write!(f, "Literal({literal})"),
            Self::Pattern { pattern } => write!(f, "Pattern({})", pattern.as_str()),
        }
    }
}

/// A symbolic-like link named `name` pointing at whatever `target` matches.
#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    /// The link target.
    pub target: LinkTarget,
    /// The link name, substituted in place of the matched portion.
    pub name: String,
}

impl Link {
    /// Return `string` with whatever matches `target` replaced by `name`.
    ///
    /// Must only be called after a successful [`LinkTarget::matches`] check;
    /// a non-matching `string` is a contract violation and returns a fatal
    /// validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bowser_core::config::{Link, LinkTarget};
    ///
    /// let link = Link {
    ///     target: LinkTarget::Literal { literal: "some/prefix".into() },
    ///     name: "latest".into(),
    /// };
    /// let key = "some/prefix/20240311T123456/report.json";
    /// assert_eq!(
    ///     link.substitute(key).unwrap(),
    ///     "latest/20240311T123456/report.json"
    /// );
    /// ```
    pub fn substitute(&self, string: &str) -> Result<String> {
        if !self.target.matches(string) {
            return Err(Error::link_mismatch(string));
        }
        let substituted = match &self.target {
            LinkTarget::Literal { literal } => string.replace(literal.as_str(), &self.name),
            LinkTarget::Pattern { pattern } => {
                pattern.replace_all(string, self.name.as_str()).into_owned()
            }
        };
        Ok(substituted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn literal_link(literal: &str, name: &str) -> Link {
        Link {
            target: LinkTarget::Literal {
                literal: literal.into(),
            },
            name: name.into(),
        }
    }

    fn pattern_link(pattern: &str, name: &str) -> Result<Link> {
        let pattern = Regex::new(pattern).map_err(|e| Error::invalid_config(e.to_string()))?;
        Ok(Link {
            target: LinkTarget::Pattern { pattern },
            name: name.into(),
        })
    }

    #[test]
    fn test_literal_target_matches_substring() {
        let link = literal_link("some/prefix", "latest");
        assert!(link.target.matches("some/prefix/evidence.txt"));
        assert!(!link.target.matches("other/prefix/evidence.txt"));
    }

    #[test]
    fn test_literal_substitution() -> Result<()> {
        let link = literal_link("some/prefix", "latest");
        let substituted = link.substitute("some/prefix/20240311T123456/report.json")?;
        assert_eq!(substituted, "latest/20240311T123456/report.json");
        Ok(())
    }

    #[test]
    fn test_pattern_substitution() -> Result<()> {
        let link = pattern_link(r"\d{8}T\d{6}", "latest")?;
        let substituted = link.substitute("some/prefix/20240311T123456/report.json")?;
        assert_eq!(substituted, "some/prefix/latest/report.json");
        Ok(())
    }

    #[test]
    fn test_substitute_without_match_is_contract_violation() {
        let link = literal_link("some/prefix", "latest");
        let result = link.substitute("unrelated/key");
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(matches!(err, Error::Validation(_)));
            assert_eq!(err.exit_code(), 1);
        }
    }

    #[test]
    fn test_link_deserializes_from_toml() -> Result<()> {
        let link: Link = toml::from_str(
            r#"
            name = "latest"
            target = { kind = "Pattern", pattern = '\d{8}' }
            "#,
        )?;
        assert!(link.target.matches("drops/20240311/report.json"));
        Ok(())
    }
}
