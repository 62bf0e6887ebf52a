//! Feedback-loop-safe relay between the two views.
//!
//! # Overview
//!
//! [`SyncController`] owns the [`CanonicalTextStore`] and holds weak references to the rich and
//! plain views. When one view reports an edit, the controller:
//!
//! 1. ignores it if a programmatic push is in flight (the edit is an echo of that push)
//! 2. ignores it if it equals the canonical text under the source view's normalization
//! 3. pushes the text into the sibling view while the in-flight guard is raised
//! 4. records the text as canonical, attributed to the source view
//! 5. reports [`SyncOutcome::Relayed`] so the composition can notify the host
//!
//! Host writes go through [`SyncController::apply_external`], which refreshes both views under a
//! guard covering both and never produces a relay.
//!
//! # Event delivery
//!
//! [`SyncController::attach`] registers a change handler on the view. The handler runs inside the
//! view's own call stack, so it never touches the controller directly: it checks the shared
//! in-flight set and either drops the change (echo) or queues it. The composition then drains
//! the queue with [`SyncController::process_pending`], strictly in arrival order.
//!
//! # Example
//!
//! ```rust
//! use cream_core::{ActorId, SyncController, SyncOutcome};
//!
//! let mut controller = SyncController::new("");
//!
//! // No views are mounted yet: the relay still records the edit.
//! let outcome = controller.on_view_change(ActorId::PlainView, "Hello");
//! assert_eq!(outcome, SyncOutcome::Relayed("Hello".to_string()));
//! assert_eq!(controller.canonical(), "Hello");
//!
//! // The same content again is not a change.
//! assert_eq!(controller.on_view_change(ActorId::RichView, "Hello"), SyncOutcome::Unchanged);
//! ```

use crate::error::ViewError;
use crate::normalize::Normalization;
use crate::store::CanonicalTextStore;
use crate::view::{ActorId, EditOrigin, TextChange, ViewAdapter, ViewChange};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};
use tracing::{debug, trace, warn};

/// Shared, reference-counted handle to a view.
pub type ViewRef = Rc<RefCell<dyn ViewAdapter>>;

type ViewSlot = Weak<RefCell<dyn ViewAdapter>>;

/// A small set of view actors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActorSet(u8);

impl ActorSet {
    /// No actors.
    pub const EMPTY: ActorSet = ActorSet(0);
    /// Both views.
    pub const VIEWS: ActorSet = ActorSet(0b11);

    /// A set holding a single view. Non-view actors yield an empty set.
    pub fn of(actor: ActorId) -> Self {
        ActorSet(Self::bit(actor))
    }

    /// Union of two sets.
    pub fn union(self, other: ActorSet) -> Self {
        ActorSet(self.0 | other.0)
    }

    /// Whether `actor` is in the set.
    pub fn contains(self, actor: ActorId) -> bool {
        let bit = Self::bit(actor);
        bit != 0 && self.0 & bit == bit
    }

    /// Whether the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    fn bit(actor: ActorId) -> u8 {
        match actor {
            ActorId::RichView => 0b01,
            ActorId::PlainView => 0b10,
            ActorId::Host | ActorId::Init => 0,
        }
    }
}

/// Result of feeding a view edit through the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Accepted: the store holds the text, the sibling was refreshed, the host must be notified.
    Relayed(String),
    /// Equal to the canonical text under the source view's normalization.
    Unchanged,
    /// Arrived while a push was in flight, or was itself caused by a push.
    Echo,
    /// The source is not a view.
    Ignored,
    /// The sibling could not represent the text; the store kept its previous value.
    Rejected(ViewError),
}

/// Result of a host-driven write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalOutcome {
    /// The store and every present view now hold the text.
    Applied,
    /// The store and every present view already held the text.
    Unchanged,
    /// A view rejected the text; views written so far were rolled back.
    Rejected(ViewError),
}

/// Counters describing how edits were handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Edits relayed to the sibling and the host.
    pub relayed: u64,
    /// Edits dropped because they matched the canonical text.
    pub unchanged: u64,
    /// Echoes of programmatic pushes that were suppressed.
    pub echoes_suppressed: u64,
    /// Edits or host writes a view could not represent.
    pub rejected: u64,
    /// Host writes applied.
    pub external_applied: u64,
}

#[derive(Default)]
struct Dispatch {
    in_flight: Cell<ActorSet>,
    pending: RefCell<VecDeque<(u64, ViewChange)>>,
    generations: Cell<[u32; 2]>,
    echoes: Cell<u64>,
    clock: Cell<u64>,
    last_push: Cell<[u64; 2]>,
}

impl Dispatch {
    fn generation(&self, actor: ActorId) -> u32 {
        self.generations.get()[slot_index(actor)]
    }

    fn bump_generation(&self, actor: ActorId) -> u32 {
        let mut generations = self.generations.get();
        let index = slot_index(actor);
        generations[index] = generations[index].wrapping_add(1);
        self.generations.set(generations);
        generations[index]
    }

    fn deliver(&self, source: ActorId, generation: u32, change: &TextChange) {
        if self.generation(source) != generation {
            trace!(%source, "change from a detached view dropped");
            return;
        }

        let in_flight = self.in_flight.get();
        if !in_flight.is_empty() || change.origin == EditOrigin::Sync {
            self.echoes.set(self.echoes.get() + 1);
            trace!(%source, ?in_flight, "echo suppressed");
            return;
        }

        let queued_at = self.tick();
        self.pending.borrow_mut().push_back((
            queued_at,
            ViewChange {
                source,
                text: change.text.clone(),
                origin: change.origin,
            },
        ));
    }

    fn tick(&self) -> u64 {
        let now = self.clock.get() + 1;
        self.clock.set(now);
        now
    }

    fn mark_pushed(&self, actor: ActorId) {
        let mut last_push = self.last_push.get();
        last_push[slot_index(actor)] = self.tick();
        self.last_push.set(last_push);
    }

    /// Whether `actor` received a push after `tick`.
    fn pushed_since(&self, actor: ActorId, tick: u64) -> bool {
        self.last_push.get()[slot_index(actor)] > tick
    }

    fn pop(&self) -> Option<(u64, ViewChange)> {
        self.pending.borrow_mut().pop_front()
    }

    fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }
}

/// Raises actors into the in-flight set for the lifetime of the guard.
struct InFlightGuard<'a> {
    dispatch: &'a Dispatch,
    previous: ActorSet,
}

impl<'a> InFlightGuard<'a> {
    fn enter(dispatch: &'a Dispatch, actors: ActorSet) -> Self {
        let previous = dispatch.in_flight.get();
        dispatch.in_flight.set(previous.union(actors));
        Self { dispatch, previous }
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.dispatch.in_flight.set(self.previous);
    }
}

fn slot_index(actor: ActorId) -> usize {
    match actor {
        ActorId::PlainView => 1,
        _ => 0,
    }
}

/// Keeps the rich and plain views converged on a single canonical text.
///
/// The controller is a plain value owned by the composing shell. Views are owned elsewhere and
/// referenced weakly: a dropped, unmounted, or currently borrowed view is treated as absent and
/// every operation on it is skipped.
pub struct SyncController {
    store: CanonicalTextStore,
    dispatch: Rc<Dispatch>,
    views: [Option<ViewSlot>; 2],
    stats: SyncStats,
}

impl SyncController {
    /// Create a controller whose canonical text starts as `text`.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            store: CanonicalTextStore::new(text),
            dispatch: Rc::new(Dispatch::default()),
            views: [None, None],
            stats: SyncStats::default(),
        }
    }

    /// Current canonical text.
    pub fn canonical(&self) -> &str {
        self.store.value()
    }

    /// Actor that last wrote the canonical text.
    pub fn last_writer(&self) -> ActorId {
        self.store.last_writer()
    }

    /// Read-only access to the store.
    pub fn store(&self) -> &CanonicalTextStore {
        &self.store
    }

    /// Handling counters.
    pub fn stats(&self) -> SyncStats {
        SyncStats {
            echoes_suppressed: self.stats.echoes_suppressed + self.dispatch.echoes.get(),
            ..self.stats
        }
    }

    /// Number of queued view changes not yet processed.
    pub fn pending(&self) -> usize {
        self.dispatch.pending_len()
    }

    /// Whether a programmatic push is currently running.
    pub fn is_in_flight(&self) -> bool {
        !self.dispatch.in_flight.get().is_empty()
    }

    /// Attach a concrete view as `actor` and subscribe to its changes.
    ///
    /// Returns `false` if `actor` is not a view or the view is currently borrowed.
    pub fn attach<V: ViewAdapter + 'static>(&mut self, actor: ActorId, view: &Rc<RefCell<V>>) -> bool {
        let view: ViewRef = view.clone();
        self.attach_ref(actor, &view)
    }

    /// Attach a type-erased view as `actor` and subscribe to its changes.
    pub fn attach_ref(&mut self, actor: ActorId, view: &ViewRef) -> bool {
        if !actor.is_view() {
            warn!(%actor, "only views can be attached");
            return false;
        }

        let Ok(mut adapter) = view.try_borrow_mut() else {
            warn!(%actor, "view is busy, not attached");
            return false;
        };

        let generation = self.dispatch.bump_generation(actor);
        let dispatch = Rc::downgrade(&self.dispatch);
        adapter.on_change(Box::new(move |change: &TextChange| {
            if let Some(dispatch) = dispatch.upgrade() {
                dispatch.deliver(actor, generation, change);
            }
        }));
        drop(adapter);

        self.views[slot_index(actor)] = Some(Rc::downgrade(view));
        debug!(%actor, "view attached");
        true
    }

    /// Forget the view attached as `actor`. Its later changes are dropped.
    pub fn detach(&mut self, actor: ActorId) {
        if !actor.is_view() {
            return;
        }
        self.dispatch.bump_generation(actor);
        self.views[slot_index(actor)] = None;
    }

    /// Whether a live view is attached as `actor`.
    pub fn has_view(&self, actor: ActorId) -> bool {
        self.view(actor).is_some()
    }

    fn view(&self, actor: ActorId) -> Option<ViewRef> {
        if !actor.is_view() {
            return None;
        }
        self.views[slot_index(actor)].as_ref()?.upgrade()
    }

    /// Run `f` against the view attached as `actor`, if it is alive and not borrowed.
    pub fn with_view<R>(&self, actor: ActorId, f: impl FnOnce(&dyn ViewAdapter) -> R) -> Option<R> {
        let view = self.view(actor)?;
        let adapter = view.try_borrow().ok()?;
        Some(f(&*adapter))
    }

    /// Run `f` mutably against the view attached as `actor`.
    ///
    /// Text replaced through this accessor is not guarded; use [`SyncController::apply_external`]
    /// to write content.
    pub fn with_view_mut<R>(
        &self,
        actor: ActorId,
        f: impl FnOnce(&mut dyn ViewAdapter) -> R,
    ) -> Option<R> {
        let view = self.view(actor)?;
        let mut adapter = view.try_borrow_mut().ok()?;
        Some(f(&mut *adapter))
    }

    /// Run `f` against every present view, rich first.
    pub fn for_each_view_mut(&self, mut f: impl FnMut(ActorId, &mut dyn ViewAdapter)) {
        for actor in ActorId::VIEWS {
            if self.with_view_mut(actor, |view| f(actor, view)).is_none() {
                trace!(%actor, "view absent, skipped");
            }
        }
    }

    /// Drain queued view changes in arrival order.
    pub fn process_pending(&mut self) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        while let Some((queued_at, change)) = self.dispatch.pop() {
            let outcome = self.on_view_change(change.source, &change.text);
            // An earlier relay in this batch overwrote the source after it queued the change.
            if matches!(outcome, SyncOutcome::Relayed(_))
                && self.dispatch.pushed_since(change.source, queued_at)
                && let Err(err) = self.push(change.source, &change.text)
            {
                warn!(source = %change.source, %err, "source view could not be restored");
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    /// Handle a user edit reported by `source`.
    pub fn on_view_change(&mut self, source: ActorId, new_text: &str) -> SyncOutcome {
        let Some(sibling) = source.sibling() else {
            return SyncOutcome::Ignored;
        };

        if self.is_in_flight() {
            self.stats.echoes_suppressed += 1;
            trace!(%source, "echo suppressed");
            return SyncOutcome::Echo;
        }

        let canonical = self.store.value();
        let unchanged = self
            .with_view(source, |view| view.equivalent(new_text, canonical))
            .unwrap_or_else(|| Normalization::default().equivalent(new_text, canonical));
        if unchanged {
            self.stats.unchanged += 1;
            trace!(%source, "edit matches canonical text");
            return SyncOutcome::Unchanged;
        }

        if let Err(err) = self.push(sibling, new_text) {
            self.stats.rejected += 1;
            warn!(%source, %sibling, %err, "sibling rejected text, canonical text kept");
            let canonical = canonical.to_string();
            if let Err(restore) = self.push(source, &canonical) {
                warn!(%source, %restore, "source view could not be restored");
            }
            return SyncOutcome::Rejected(err);
        }

        self.store.write(new_text, source);
        self.stats.relayed += 1;
        debug!(%source, version = self.store.version(), len = new_text.len(), "edit relayed");
        SyncOutcome::Relayed(new_text.to_string())
    }

    /// Replace the canonical text on behalf of the host and refresh both views.
    ///
    /// Views whose current content already equals `text` are not written. No relay is produced:
    /// the host is the origin of the change.
    pub fn apply_external(&mut self, text: &str) -> ExternalOutcome {
        let canonical = self.store.value().to_string();

        let mut store_matches = true;
        let mut any_present = false;
        let mut targets = Vec::new();
        for actor in ActorId::VIEWS {
            let checked = self.with_view(actor, |view| {
                let current = view.text()?;
                Some((view.equivalent(text, &current), view.equivalent(text, &canonical)))
            });
            match checked.flatten() {
                Some((holds_text, matches_canonical)) => {
                    any_present = true;
                    store_matches &= matches_canonical;
                    if !holds_text {
                        targets.push(actor);
                    }
                }
                None => trace!(%actor, "view absent, not written"),
            }
        }

        if !any_present {
            store_matches = text == canonical;
        }
        if targets.is_empty() && store_matches {
            self.stats.unchanged += 1;
            trace!("host text matches canonical text");
            return ExternalOutcome::Unchanged;
        }

        let _guard = InFlightGuard::enter(&self.dispatch, ActorSet::VIEWS);
        let mut written = Vec::new();
        for actor in targets {
            match self.push(actor, text) {
                Ok(true) => written.push(actor),
                Ok(false) => {}
                Err(err) => {
                    for done in written {
                        if let Err(rollback) = self.push(done, &canonical) {
                            warn!(actor = %done, %rollback, "rollback failed");
                        }
                    }
                    self.stats.rejected += 1;
                    warn!(%actor, %err, "view rejected host text, canonical text kept");
                    return ExternalOutcome::Rejected(err);
                }
            }
        }

        self.store.write(text, ActorId::Host);
        self.stats.external_applied += 1;
        debug!(version = self.store.version(), len = text.len(), "host text applied");
        ExternalOutcome::Applied
    }

    /// Bring a single view in line with the canonical text, e.g. after it mounted late.
    pub fn resync(&mut self, actor: ActorId) -> Result<bool, ViewError> {
        let canonical = self.store.value().to_string();
        let in_sync = self.with_view(actor, |view| {
            view.text()
                .is_none_or(|current| view.equivalent(&current, &canonical))
        });
        match in_sync {
            Some(false) => self.push(actor, &canonical),
            _ => Ok(false),
        }
    }

    /// Push `text` into `target` under the in-flight guard.
    ///
    /// Returns `Ok(false)` if the view is absent or busy.
    fn push(&self, target: ActorId, text: &str) -> Result<bool, ViewError> {
        let Some(view) = self.view(target) else {
            trace!(%target, "view absent, push skipped");
            return Ok(false);
        };
        let Ok(mut adapter) = view.try_borrow_mut() else {
            trace!(%target, "view busy, push skipped");
            return Ok(false);
        };

        self.dispatch.mark_pushed(target);
        let _guard = InFlightGuard::enter(&self.dispatch, ActorSet::of(target));
        adapter.set_text(text)?;
        Ok(true)
    }
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new("")
    }
}
