//! Editor configuration.
//!
//! Configuration is read from a TOML document. Every field has a default, so an empty document
//! (or no file at all) yields [`EditorConfig::default`].
//!
//! ```toml
//! [plain]
//! normalization = "line-endings"
//! max_undo = 1000
//!
//! [rich]
//! normalization = "trim-trailing"
//! allow_html = true
//!
//! [preview]
//! plain = true
//! html = false
//! max_plain_chars = 240
//! ```

use crate::error::ConfigError;
use crate::normalize::Normalization;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for the plain markdown view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlainViewConfig {
    /// Equality policy for the plain view.
    pub normalization: Normalization,
    /// Maximum number of undo steps kept.
    pub max_undo: usize,
}

impl Default for PlainViewConfig {
    fn default() -> Self {
        Self {
            normalization: Normalization::LineEndings,
            max_undo: 1000,
        }
    }
}

/// Settings for the rich-text view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RichViewConfig {
    /// Equality policy applied on top of the block serialization.
    pub normalization: Normalization,
    /// Whether raw HTML blocks can be represented.
    pub allow_html: bool,
    /// Maximum number of undo steps kept.
    pub max_undo: usize,
}

impl Default for RichViewConfig {
    fn default() -> Self {
        Self {
            normalization: Normalization::TrimTrailing,
            allow_html: true,
            max_undo: 1000,
        }
    }
}

/// Settings for [`crate::PreviewGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewConfig {
    /// Produce the plain-text preview.
    pub plain: bool,
    /// Produce the HTML preview.
    pub html: bool,
    /// Maximum plain preview length in grapheme clusters (0 = unlimited).
    pub max_plain_chars: usize,
    /// Text used when the plain preview would otherwise be empty.
    pub empty_placeholder: Option<String>,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            plain: true,
            html: false,
            max_plain_chars: 240,
            empty_placeholder: None,
        }
    }
}

/// Complete editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Plain view settings.
    pub plain: PlainViewConfig,
    /// Rich view settings.
    pub rich: RichViewConfig,
    /// Preview settings.
    pub preview: PreviewConfig,
}

impl EditorConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.plain.max_undo == 0 {
            return Err(ConfigError::InvalidValue {
                field: "plain.max_undo",
                message: "must be at least 1".to_string(),
            });
        }
        if self.rich.max_undo == 0 {
            return Err(ConfigError::InvalidValue {
                field: "rich.max_undo",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
