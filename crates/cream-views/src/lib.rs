#![warn(missing_docs)]
//! Cream Views - Reference View Adapters
//!
//! Two headless editing surfaces implementing [`cream_core::ViewAdapter`]:
//!
//! - [`PlainTextView`]: a rope-backed markdown source buffer with bounded, coalescing undo
//! - [`RichTextView`]: a document of top-level markdown blocks, edited through block
//!   transactions
//!
//! Programmatic replaces ([`cream_core::ViewAdapter::set_text`]) never enter either view's undo
//! history and are reported with [`cream_core::EditOrigin::Sync`]; user edits are reported with
//! [`cream_core::EditOrigin::User`].
//!
//! ```rust
//! use cream_core::{EditorConfig, EditorShell, ViewAdapter};
//! use cream_views::{PlainTextView, RichTextView};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let config = EditorConfig::default();
//! let rich = Rc::new(RefCell::new(RichTextView::mounted()));
//! let plain = Rc::new(RefCell::new(PlainTextView::mounted()));
//! let mut shell = EditorShell::new(&config, rich.clone(), plain.clone());
//!
//! plain.borrow_mut().insert(0, "# Hi").unwrap();
//! assert_eq!(shell.pump(), 1);
//! assert_eq!(rich.borrow().text().as_deref(), Some("# Hi"));
//! ```

pub mod error;
pub mod history;
pub mod plain;
pub mod rich;

pub use error::EditError;
pub use history::UndoHistory;
pub use plain::PlainTextView;
pub use rich::{Block, BlockKind, RichSchema, RichTextView, canonicalize, parse_blocks, serialize_blocks};
