#![warn(missing_docs)]
//! Cream Core - Dual-View Synchronization Kernel
//!
//! # Overview
//!
//! `cream-core` keeps two interchangeable editing surfaces of one markdown note (a rendered
//! rich-text view and a plain-text view) converged on a single canonical text, and relays every
//! accepted change to the embedding host application.
//!
//! It does not render or parse anything for display: views are opaque capability providers
//! behind the [`ViewAdapter`] trait, and the host is reached through a closed message set
//! ([`HostCommand`] / [`HostNotification`]).
//!
//! # Architecture
//!
//! ```text
//! ┌────────────┐  edit   ┌────────────────┐  relay   ┌────────────┐
//! │  RichView  │ ──────▶ │                │ ───────▶ │ HostBridge │ ──▶ host
//! └────────────┘         │ SyncController │          └────────────┘
//! ┌────────────┐  edit   │  (store +      │  apply_external  ▲
//! │ PlainView  │ ──────▶ │   in-flight)   │ ◀────────────────┘ host commands
//! └────────────┘         └────────────────┘
//! ```
//!
//! - [`view`] - View capability contract
//! - [`normalize`] - Per-view equality policies
//! - [`store`] - Canonical text store
//! - [`sync`] - Feedback-loop-safe relay
//! - [`host`] - Host command/notification bridge
//! - [`split`] - Split view layout
//! - [`preview`] - Note previews
//! - [`config`] - TOML configuration
//! - [`shell`] - Composition of all of the above
//!
//! # Quick Start
//!
//! ```rust
//! use cream_core::{ActorId, SyncController, SyncOutcome};
//!
//! let mut controller = SyncController::new("");
//! controller.apply_external("# Hi");
//! assert_eq!(controller.canonical(), "# Hi");
//! assert_eq!(controller.last_writer(), ActorId::Host);
//!
//! match controller.on_view_change(ActorId::PlainView, "# Hi\n\nthere") {
//!     SyncOutcome::Relayed(text) => assert_eq!(text, "# Hi\n\nthere"),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

pub mod config;
pub mod error;
pub mod host;
pub mod normalize;
pub mod preview;
pub mod shell;
pub mod split;
pub mod store;
pub mod sync;
pub mod view;

pub use config::{EditorConfig, PlainViewConfig, PreviewConfig, RichViewConfig};
pub use error::{ConfigError, ViewError};
pub use host::{HostBridge, HostCommand, HostNotification, HostReply, HostSink, SessionId};
pub use normalize::Normalization;
pub use preview::{Preview, PreviewGenerator};
pub use shell::EditorShell;
pub use split::{PaneLayout, SPLIT_WIDTH_PERCENT, SplitLayout, SplitViewManager};
pub use store::{CanonicalText, CanonicalTextStore};
pub use sync::{ActorSet, ExternalOutcome, SyncController, SyncOutcome, SyncStats, ViewRef};
pub use view::{ActorId, ChangeHandler, EditOrigin, TextChange, ViewAdapter, ViewChange, ViewState};
