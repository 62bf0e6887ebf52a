//! Split view presentation.
//!
//! By default only the rich view is shown, at full width. Opening the split reveals the plain
//! view next to it with a fixed 50/50 split; closing hides it again.

use crate::sync::SyncController;
use crate::view::ActorId;

/// Width of each pane while the split is open.
pub const SPLIT_WIDTH_PERCENT: u8 = 50;

/// Target presentation of one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    /// Whether the view is shown.
    pub visible: bool,
    /// Share of the editor width.
    pub width_percent: u8,
    /// Soft wrapping to enable, if the layout asks for it.
    pub line_wrapping: Option<bool>,
}

/// Target presentation of both views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitLayout {
    /// Rich view pane.
    pub rich: PaneLayout,
    /// Plain view pane.
    pub plain: PaneLayout,
}

impl SplitLayout {
    /// Layout with only the rich view visible.
    pub fn closed() -> Self {
        Self {
            rich: PaneLayout {
                visible: true,
                width_percent: 100,
                line_wrapping: None,
            },
            plain: PaneLayout {
                visible: false,
                width_percent: 0,
                line_wrapping: None,
            },
        }
    }

    /// Layout with both views side by side.
    pub fn open() -> Self {
        Self {
            rich: PaneLayout {
                visible: true,
                width_percent: SPLIT_WIDTH_PERCENT,
                line_wrapping: None,
            },
            plain: PaneLayout {
                visible: true,
                width_percent: SPLIT_WIDTH_PERCENT,
                // Long lines stay legible at half width.
                line_wrapping: Some(true),
            },
        }
    }

    /// Pane layout for `actor`, if it is a view.
    pub fn pane(&self, actor: ActorId) -> Option<PaneLayout> {
        match actor {
            ActorId::RichView => Some(self.rich),
            ActorId::PlainView => Some(self.plain),
            ActorId::Host | ActorId::Init => None,
        }
    }

    /// Push this layout to every present view.
    pub fn apply(&self, controller: &SyncController) {
        controller.for_each_view_mut(|actor, view| {
            let Some(pane) = self.pane(actor) else {
                return;
            };
            view.set_visible(pane.visible);
            view.set_width(pane.width_percent);
            if let Some(wrap) = pane.line_wrapping {
                view.set_line_wrapping(wrap);
            }
        });
    }
}

/// Open/closed state of the split view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitViewManager {
    split_open: bool,
}

impl SplitViewManager {
    /// A manager in the closed state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the plain view is currently shown.
    pub fn is_open(&self) -> bool {
        self.split_open
    }

    /// Layout for the current state.
    pub fn layout(&self) -> SplitLayout {
        if self.split_open {
            SplitLayout::open()
        } else {
            SplitLayout::closed()
        }
    }

    /// Flip the state and return the layout to apply.
    pub fn toggle(&mut self) -> SplitLayout {
        self.split_open = !self.split_open;
        self.layout()
    }
}
