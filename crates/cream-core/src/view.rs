//! View capability contract.
//!
//! `cream-core` never touches widget internals. Each editing surface (the rendered rich-text
//! view and the plain markdown view) is wrapped in a [`ViewAdapter`] that exposes a small,
//! uniform set of capabilities:
//!
//! - read/replace the whole buffer ([`ViewAdapter::text`], [`ViewAdapter::set_text`])
//! - editability and presentation ([`ViewAdapter::set_editable`], [`ViewAdapter::set_visible`],
//!   [`ViewAdapter::set_width`])
//! - a change-notification channel ([`ViewAdapter::on_change`])
//!
//! Views mount asynchronously relative to host commands, so "not mounted" is a normal state:
//! every operation must silently no-op on an unmounted view.

use crate::error::ViewError;
use crate::normalize::Normalization;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an actor that can write the canonical text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActorId {
    /// The rendered rich-text view.
    RichView,
    /// The plain markdown view.
    PlainView,
    /// The embedding host application.
    Host,
    /// Initial state before anyone wrote.
    Init,
}

impl ActorId {
    /// The two view actors, in push order.
    pub const VIEWS: [ActorId; 2] = [ActorId::RichView, ActorId::PlainView];

    /// The view on the other side of a relay, if `self` is a view.
    pub fn sibling(self) -> Option<ActorId> {
        match self {
            ActorId::RichView => Some(ActorId::PlainView),
            ActorId::PlainView => Some(ActorId::RichView),
            ActorId::Host | ActorId::Init => None,
        }
    }

    /// Returns `true` for [`ActorId::RichView`] and [`ActorId::PlainView`].
    pub fn is_view(self) -> bool {
        matches!(self, ActorId::RichView | ActorId::PlainView)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActorId::RichView => "rich-view",
            ActorId::PlainView => "plain-view",
            ActorId::Host => "host",
            ActorId::Init => "init",
        };
        f.write_str(name)
    }
}

/// Where a reported content change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOrigin {
    /// Typed, pasted, undone, or otherwise driven by the user.
    User,
    /// Produced by a programmatic [`ViewAdapter::set_text`] push.
    Sync,
}

/// A content change reported by a single view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    /// Full buffer content after the change.
    pub text: String,
    /// Whether the user or a programmatic push caused it.
    pub origin: EditOrigin,
}

impl TextChange {
    /// A user-driven change.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: EditOrigin::User,
        }
    }

    /// A change caused by a programmatic push.
    pub fn sync(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: EditOrigin::Sync,
        }
    }
}

/// A [`TextChange`] tagged with the view that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewChange {
    /// The originating view.
    pub source: ActorId,
    /// New content.
    pub text: String,
    /// Origin of the change.
    pub origin: EditOrigin,
}

/// Presentation and editability state of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    /// Whether user input is accepted.
    pub editable: bool,
    /// Whether the view is shown.
    pub visible: bool,
    /// Share of the editor width (0..=100).
    pub width_percent: u8,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            editable: true,
            visible: true,
            width_percent: 100,
        }
    }
}

/// Change notification callback registered through [`ViewAdapter::on_change`].
pub type ChangeHandler = Box<dyn FnMut(&TextChange)>;

/// Uniform capability wrapper around an editing surface.
pub trait ViewAdapter {
    /// Current buffer content, or `None` if the view is not mounted.
    fn text(&self) -> Option<String>;

    /// Replace the entire buffer in one atomic edit.
    ///
    /// The replace must not be recorded in the view's undo history. On an unmounted view this is
    /// a no-op that returns `Ok(())`. If the view cannot represent `text`, it returns
    /// [`ViewError::Unrepresentable`] and leaves the buffer untouched.
    ///
    /// Registered handlers fire with [`EditOrigin::Sync`] only if the content actually changed.
    fn set_text(&mut self, text: &str) -> Result<(), ViewError>;

    /// Toggle whether user input is accepted. Does not affect [`ViewAdapter::set_text`].
    fn set_editable(&mut self, editable: bool);

    /// Show or hide the view.
    fn set_visible(&mut self, visible: bool);

    /// Set the view's share of the editor width (clamped to 0..=100).
    fn set_width(&mut self, percent: u8);

    /// Register a change handler.
    fn on_change(&mut self, handler: ChangeHandler);

    /// Current presentation state, or `None` if not mounted.
    fn view_state(&self) -> Option<ViewState>;

    /// Equality policy this view applies to its own content.
    fn normalization(&self) -> Normalization;

    /// Whether `a` and `b` represent the same content for this view.
    fn equivalent(&self, a: &str, b: &str) -> bool {
        self.normalization().equivalent(a, b)
    }

    /// Enable or disable soft line wrapping.
    fn set_line_wrapping(&mut self, _wrap: bool) {}

    /// Drop the view's undo/redo history, if it has one.
    fn clear_history(&mut self) {}
}
