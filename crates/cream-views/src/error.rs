//! Errors from user-driven edits.

use cream_core::ViewError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reasons a user edit was refused. The buffer is unchanged in every case.
pub enum EditError {
    #[error("view is not mounted")]
    /// The view has no buffer.
    NotMounted,

    #[error("view is read-only")]
    /// The note is locked.
    ReadOnly,

    #[error("invalid range {start}..{end} (length {len})")]
    /// A character range falls outside the buffer.
    InvalidRange {
        /// Inclusive start.
        start: usize,
        /// Exclusive end.
        end: usize,
        /// Buffer length in characters.
        len: usize,
    },

    #[error("block index {index} out of bounds (block count {count})")]
    /// A block index falls outside the document.
    InvalidBlock {
        /// Requested index.
        index: usize,
        /// Number of blocks.
        count: usize,
    },

    #[error(transparent)]
    /// The edit produced content the view cannot hold.
    View(#[from] ViewError),
}
