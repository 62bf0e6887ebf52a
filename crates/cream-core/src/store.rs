//! Canonical text store.

use crate::view::ActorId;

/// The single authoritative document content and who wrote it last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalText {
    /// Current content.
    pub value: String,
    /// Actor that produced `value`.
    pub last_writer: ActorId,
}

impl Default for CanonicalText {
    fn default() -> Self {
        Self {
            value: String::new(),
            last_writer: ActorId::Init,
        }
    }
}

/// Holder of [`CanonicalText`], owned exclusively by [`crate::SyncController`].
///
/// Every accepted write bumps a version number, so consumers can tell whether the canonical value
/// moved between two observations.
#[derive(Debug, Clone, Default)]
pub struct CanonicalTextStore {
    current: CanonicalText,
    version: u64,
}

impl CanonicalTextStore {
    /// Create a store seeded with `text`, attributed to [`ActorId::Init`].
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            current: CanonicalText {
                value: text.into(),
                last_writer: ActorId::Init,
            },
            version: 0,
        }
    }

    /// Current canonical content.
    pub fn value(&self) -> &str {
        &self.current.value
    }

    /// Actor that last wrote the content.
    pub fn last_writer(&self) -> ActorId {
        self.current.last_writer
    }

    /// Snapshot of the canonical record.
    pub fn get(&self) -> &CanonicalText {
        &self.current
    }

    /// Number of accepted writes since creation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn write(&mut self, value: impl Into<String>, writer: ActorId) {
        self.current = CanonicalText {
            value: value.into(),
            last_writer: writer,
        };
        self.version = self.version.wrapping_add(1);
    }
}
