//! Editor composition.
//!
//! [`EditorShell`] is the value that ties everything together: it holds both views, owns the
//! [`SyncController`], the [`HostBridge`] and the [`SplitViewManager`], and moves queued view
//! changes through the controller into host notifications.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut shell = EditorShell::new(&config, rich.clone(), plain.clone());
//! shell.mount_host(|notification| println!("{notification:?}"));
//!
//! plain.borrow_mut().insert(0, "Hello");
//! shell.pump(); // rich view refreshed, host notified once
//! ```

use crate::config::EditorConfig;
use crate::host::{HostBridge, HostCommand, HostReply, HostSink, SessionId};
use crate::preview::PreviewGenerator;
use crate::split::SplitViewManager;
use crate::sync::{SyncController, SyncOutcome, ViewRef};
use crate::view::{ActorId, ViewAdapter};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

/// Owner of the controller, the host bridge and the split state.
pub struct EditorShell {
    controller: SyncController,
    bridge: HostBridge,
    split: SplitViewManager,
    rich: ViewRef,
    plain: ViewRef,
}

impl EditorShell {
    /// Compose an editor from two views.
    ///
    /// Both views are subscribed, laid out in the closed split state, and filled with the
    /// canonical text (initially empty).
    pub fn new<R, P>(config: &EditorConfig, rich: Rc<RefCell<R>>, plain: Rc<RefCell<P>>) -> Self
    where
        R: ViewAdapter + 'static,
        P: ViewAdapter + 'static,
    {
        let rich: ViewRef = rich;
        let plain: ViewRef = plain;

        let mut controller = SyncController::new("");
        controller.attach_ref(ActorId::RichView, &rich);
        controller.attach_ref(ActorId::PlainView, &plain);

        let mut shell = Self {
            controller,
            bridge: HostBridge::new(PreviewGenerator::new(config.preview.clone())),
            split: SplitViewManager::new(),
            rich,
            plain,
        };
        shell.resync_views();
        shell
    }

    /// Bring every view back to the current split layout and the canonical text, e.g. after a
    /// late mount.
    pub fn resync_views(&mut self) {
        self.split.layout().apply(&self.controller);
        for actor in ActorId::VIEWS {
            if let Err(err) = self.controller.resync(actor) {
                warn!(%actor, %err, "view could not take canonical text");
            }
        }
    }

    /// Mount a host session.
    pub fn mount_host(&mut self, sink: impl HostSink + 'static) -> SessionId {
        self.bridge.mount(sink)
    }

    /// Unmount the host session.
    pub fn unmount_host(&mut self) -> Option<SessionId> {
        self.bridge.unmount()
    }

    /// Handle a host command, then flush any view changes it left queued.
    pub fn handle_host(&mut self, command: HostCommand) -> HostReply {
        let reply = self.bridge.handle(command, &mut self.controller);
        self.pump();
        reply
    }

    /// Process queued view changes; returns how many were relayed to the host.
    pub fn pump(&mut self) -> usize {
        let mut relayed = 0;
        for outcome in self.controller.process_pending() {
            if let SyncOutcome::Relayed(text) = outcome {
                self.bridge.content_changed(&text);
                relayed += 1;
            }
        }
        relayed
    }

    /// Open or close the split view; returns whether it is now open.
    pub fn toggle_split(&mut self) -> bool {
        self.split.toggle().apply(&self.controller);
        self.split.is_open()
    }

    /// Whether the split view is open.
    pub fn is_split_open(&self) -> bool {
        self.split.is_open()
    }

    /// The controller.
    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    /// The controller, mutably.
    pub fn controller_mut(&mut self) -> &mut SyncController {
        &mut self.controller
    }

    /// The host bridge.
    pub fn bridge(&self) -> &HostBridge {
        &self.bridge
    }

    /// The rich view.
    pub fn rich(&self) -> &ViewRef {
        &self.rich
    }

    /// The plain view.
    pub fn plain(&self) -> &ViewRef {
        &self.plain
    }
}
