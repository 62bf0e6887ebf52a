//! Host bridge.
//!
//! The editor runs embedded in a host application that owns persistence. The host talks to the
//! editor through a closed set of commands ([`HostCommand`]) and hears back through a single
//! notification ([`HostNotification`]). [`HostBridge`] is the only place that translates between
//! those messages and controller calls, so the controller stays ignorant of host wire details.
//!
//! Both message enums serialize as JSON objects tagged by `"action"`:
//!
//! ```rust
//! use cream_core::HostCommand;
//!
//! let command: HostCommand =
//!     serde_json::from_str(r#"{"action":"onNoteLockToggle","locked":true}"#).unwrap();
//! assert_eq!(command, HostCommand::NoteLockToggle { locked: true });
//! ```

use crate::preview::{Preview, PreviewGenerator};
use crate::sync::{ExternalOutcome, SyncController};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Commands the host may issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum HostCommand {
    /// Replace the document with text loaded by the host.
    #[serde(rename = "setEditorRawText")]
    SetEditorRawText {
        /// New document content.
        text: String,
    },
    /// Build a preview of arbitrary text.
    #[serde(rename = "generateCustomPreview")]
    GenerateCustomPreview {
        /// Text to summarize.
        text: String,
    },
    /// Lock or unlock the note.
    #[serde(rename = "onNoteLockToggle")]
    NoteLockToggle {
        /// `true` makes both views read-only.
        locked: bool,
    },
    /// Reset undo history in every view.
    #[serde(rename = "clearUndoHistory")]
    ClearUndoHistory,
}

impl HostCommand {
    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            HostCommand::SetEditorRawText { .. } => "setEditorRawText",
            HostCommand::GenerateCustomPreview { .. } => "generateCustomPreview",
            HostCommand::NoteLockToggle { .. } => "onNoteLockToggle",
            HostCommand::ClearUndoHistory => "clearUndoHistory",
        }
    }
}

/// Notifications sent to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum HostNotification {
    /// The user changed the document.
    #[serde(rename = "onEditorValueChanged")]
    EditorValueChanged {
        /// Full document content.
        text: String,
    },
}

/// Answer to a [`HostCommand`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostReply {
    /// The command was handled.
    Ack,
    /// The preview requested by [`HostCommand::GenerateCustomPreview`].
    Preview(Preview),
    /// No session is mounted; the command was dropped.
    Dropped,
}

/// Receiver of [`HostNotification`]s.
pub trait HostSink {
    /// Deliver a notification to the host.
    fn notify(&mut self, notification: HostNotification);
}

impl<F> HostSink for F
where
    F: FnMut(HostNotification),
{
    fn notify(&mut self, notification: HostNotification) {
        (*self)(notification)
    }
}

/// Opaque identifier of a mounted host session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl SessionId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Per-mount host state: the sink the host registered.
struct HostSession {
    id: SessionId,
    sink: Box<dyn HostSink>,
    notifications: u64,
}

/// Translator between host messages and the controller.
pub struct HostBridge {
    session: Option<HostSession>,
    next_session: u64,
    preview: PreviewGenerator,
}

impl HostBridge {
    /// Create an unmounted bridge.
    pub fn new(preview: PreviewGenerator) -> Self {
        Self {
            session: None,
            next_session: 0,
            preview,
        }
    }

    /// Start a session delivering notifications to `sink`, replacing any previous session.
    pub fn mount(&mut self, sink: impl HostSink + 'static) -> SessionId {
        self.next_session += 1;
        let id = SessionId(self.next_session);
        if let Some(previous) = self.session.replace(HostSession {
            id,
            sink: Box::new(sink),
            notifications: 0,
        }) {
            debug!(previous = previous.id.get(), "host session replaced");
        }
        info!(session = id.get(), "host session mounted");
        id
    }

    /// End the current session.
    pub fn unmount(&mut self) -> Option<SessionId> {
        let session = self.session.take()?;
        info!(
            session = session.id.get(),
            notifications = session.notifications,
            "host session unmounted"
        );
        Some(session.id)
    }

    /// Current session id, if mounted.
    pub fn session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Notifications sent in the current session.
    pub fn notifications_sent(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.notifications)
    }

    /// Preview generator used for [`HostCommand::GenerateCustomPreview`].
    pub fn preview(&self) -> &PreviewGenerator {
        &self.preview
    }

    /// Handle a host command.
    pub fn handle(&mut self, command: HostCommand, controller: &mut SyncController) -> HostReply {
        if self.session.is_none() {
            debug!(command = command.name(), "no host session, command dropped");
            return HostReply::Dropped;
        }
        trace!(command = command.name(), "host command");

        match command {
            HostCommand::SetEditorRawText { text } => {
                match controller.apply_external(&text) {
                    ExternalOutcome::Applied => debug!(len = text.len(), "host text applied"),
                    ExternalOutcome::Unchanged => trace!("host text unchanged"),
                    // Already logged by the controller; the host has no remedy.
                    ExternalOutcome::Rejected(_) => {}
                }
                HostReply::Ack
            }
            HostCommand::GenerateCustomPreview { text } => {
                HostReply::Preview(self.preview.generate(&text))
            }
            HostCommand::NoteLockToggle { locked } => {
                controller.for_each_view_mut(|_, view| view.set_editable(!locked));
                debug!(locked, "note lock toggled");
                HostReply::Ack
            }
            HostCommand::ClearUndoHistory => {
                controller.for_each_view_mut(|_, view| view.clear_history());
                HostReply::Ack
            }
        }
    }

    /// Tell the host the user changed the document. Returns `false` if no session is mounted.
    pub fn content_changed(&mut self, text: &str) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("no host session, change notification dropped");
            return false;
        };
        session.sink.notify(HostNotification::EditorValueChanged {
            text: text.to_string(),
        });
        session.notifications += 1;
        true
    }
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new(PreviewGenerator::default())
    }
}
