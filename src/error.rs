//! Configuration error types
//!
//! The physics core has no recoverable errors: radii > 0 and dt >= 0 are
//! caller preconditions, and a ball missing every slot is a normal outcome.
//! Errors only arise when reading or validating a [`crate::BoardConfig`].

use std::fmt;

/// Errors raised while loading or validating a board configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read
    Io(std::io::Error),
    /// Config JSON is malformed or has wrongly typed fields
    Parse(serde_json::Error),
    /// A value is outside the range the physics can handle
    Invalid {
        /// Dotted field path, e.g. `layout.slot_width`
        field: &'static str,
        /// The rejected value
        value: f32,
        /// Human-readable description of the accepted range
        reason: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read board config: {e}"),
            ConfigError::Parse(e) => write!(f, "failed to parse board config: {e}"),
            ConfigError::Invalid {
                field,
                value,
                reason,
            } => write!(f, "invalid config value {field} = {value}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}
