//! Runtime configuration.

use crate::error::{Error, Result};
use serde::Deserialize;

/// Knobs for a [`Runtime`](crate::runtime::Runtime). Every field has a
/// default, so an empty JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Fail a render when a listener selector matches nothing, instead of
    /// logging a warning and attaching nothing.
    pub strict_listeners: bool,
    /// Prefix of every generated instance key.
    pub key_prefix: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            strict_listeners: false,
            key_prefix: "f".to_string(),
        }
    }
}

impl Config {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Config> {
        serde_json::from_str(json).map_err(|err| Error::Config(err.to_string()))
    }

    #[allow(missing_docs)]
    pub fn with_strict_listeners(mut self, strict: bool) -> Config {
        self.strict_listeners = strict;
        self
    }

    #[allow(missing_docs)]
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Config {
        self.key_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn should_default_missing_fields() {
        let config = Config::from_json(r#"{ "strict_listeners": true }"#).unwrap();
        assert!(config.strict_listeners);
        assert_eq!(config.key_prefix, "f");
        assert_eq!(Config::from_json("{}").unwrap(), Config::default());
    }

    #[test]
    fn should_reject_unknown_fields() {
        assert!(matches!(
            Config::from_json(r#"{ "strict": true }"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn should_build_with_setters() {
        let config = Config::default()
            .with_strict_listeners(true)
            .with_key_prefix("k-");
        assert!(config.strict_listeners);
        assert_eq!(config.key_prefix, "k-");
    }
}
