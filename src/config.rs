//! Mapper configuration.

use std::env;

/// Default character joining a value with its prefix and suffix.
pub const DEFAULT_SEPARATOR: char = '#';

/// Environment variable overriding the separator.
pub const SEPARATOR_ENV: &str = "DYNAMODB_ENTITY_SEPARATOR";

/// Process-level settings for value encoding.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MapperConfig {
    /// Character placed between prefix, value and suffix of decorated string values.
    pub separator: char,
}

impl MapperConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let separator = env::var(SEPARATOR_ENV)
            .ok()
            .and_then(|value| value.chars().next())
            .unwrap_or(DEFAULT_SEPARATOR);
        Self { separator }
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
        }
    }
}
