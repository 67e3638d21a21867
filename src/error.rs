//! Errors raised by the fallible surfaces of the crate.
//!
//! The per-tick pipeline never fails; only configuration loading does.
use thiserror::Error;

/// Failure while loading or validating a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid JSON for the target struct.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value parsed but is outside its accepted range.
    #[error("invalid configuration value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Convenience constructor used by the `validate` methods.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
