//! Error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors a view may report from [`crate::ViewAdapter::set_text`].
pub enum ViewError {
    #[error("view cannot represent the given text: {reason}")]
    /// The view's document model has no way to hold the text (e.g. a schema without raw HTML).
    Unrepresentable {
        /// Human-readable cause.
        reason: String,
    },
}

impl ViewError {
    /// Build an [`ViewError::Unrepresentable`] error.
    pub fn unrepresentable(reason: impl Into<String>) -> Self {
        Self::Unrepresentable {
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
/// Errors produced while loading an [`crate::EditorConfig`].
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    /// The configuration file is not valid TOML or does not match the schema.
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    /// Reading the configuration file failed.
    Io(#[from] std::io::Error),

    #[error("invalid value for '{field}': {message}")]
    /// A field parsed but holds a value outside its allowed range.
    InvalidValue {
        /// Dotted field path.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}
