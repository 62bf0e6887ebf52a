//! Rope-backed plain markdown view.

use crate::error::EditError;
use crate::history::UndoHistory;
use cream_core::{
    ChangeHandler, Normalization, PlainViewConfig, TextChange, ViewAdapter, ViewError, ViewState,
};
use ropey::Rope;
use std::ops::Range;
use tracing::trace;

#[derive(Debug, Clone)]
struct TextEdit {
    start: usize,
    deleted: String,
    inserted: String,
}

impl TextEdit {
    fn deleted_len(&self) -> usize {
        self.deleted.chars().count()
    }

    fn inserted_len(&self) -> usize {
        self.inserted.chars().count()
    }
}

/// Plain-text view over a [`Rope`].
///
/// The view starts unmounted. User edits go through [`PlainTextView::insert`],
/// [`PlainTextView::delete`] and friends and are recorded in undo history; the controller's
/// [`ViewAdapter::set_text`] pushes are not.
///
/// # Example
///
/// ```rust
/// use cream_core::ViewAdapter;
/// use cream_views::PlainTextView;
///
/// let mut view = PlainTextView::mounted();
/// view.insert(0, "Hello").unwrap();
/// view.set_text("replaced").unwrap();
/// assert!(!view.can_undo());
/// assert_eq!(view.text().as_deref(), Some("replaced"));
/// ```
pub struct PlainTextView {
    rope: Option<Rope>,
    state: ViewState,
    line_wrapping: bool,
    normalization: Normalization,
    history: UndoHistory<TextEdit>,
    last_insert_end: Option<usize>,
    handlers: Vec<ChangeHandler>,
}

impl PlainTextView {
    /// Create an unmounted view with default settings.
    pub fn new() -> Self {
        Self::with_config(&PlainViewConfig::default())
    }

    /// Create an unmounted view from configuration.
    pub fn with_config(config: &PlainViewConfig) -> Self {
        Self {
            rope: None,
            state: ViewState::default(),
            line_wrapping: false,
            normalization: config.normalization,
            history: UndoHistory::new(config.max_undo),
            last_insert_end: None,
            handlers: Vec::new(),
        }
    }

    /// Create a view that is already mounted with an empty buffer.
    pub fn mounted() -> Self {
        let mut view = Self::new();
        view.mount();
        view
    }

    /// Attach the view to a surface. The buffer starts empty.
    pub fn mount(&mut self) {
        if self.rope.is_none() {
            self.rope = Some(Rope::new());
            trace!("plain view mounted");
        }
    }

    /// Detach the view. Content and history are discarded.
    pub fn unmount(&mut self) {
        self.rope = None;
        self.history.reset();
        self.last_insert_end = None;
    }

    /// Whether the view has a buffer.
    pub fn is_mounted(&self) -> bool {
        self.rope.is_some()
    }

    /// Length in characters (0 if unmounted).
    pub fn len_chars(&self) -> usize {
        self.rope.as_ref().map_or(0, Rope::len_chars)
    }

    /// Number of lines (0 if unmounted).
    pub fn line_count(&self) -> usize {
        self.rope.as_ref().map_or(0, Rope::len_lines)
    }

    /// Whether soft wrapping is on.
    pub fn is_line_wrapping(&self) -> bool {
        self.line_wrapping
    }

    /// Whether undo is possible.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is possible.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Current history generation; bumped by every programmatic replace.
    pub fn history_generation(&self) -> u64 {
        self.history.generation()
    }

    /// Insert `text` at character offset `offset`.
    pub fn insert(&mut self, offset: usize, text: &str) -> Result<(), EditError> {
        let len = self.editable_rope()?.len_chars();
        if offset > len {
            return Err(EditError::InvalidRange {
                start: offset,
                end: offset,
                len,
            });
        }
        if text.is_empty() {
            return Ok(());
        }

        let mut chars = text.chars();
        let single_char = matches!((chars.next(), chars.next()), (Some(c), None) if c != '\n');
        if !(single_char && self.last_insert_end == Some(offset)) {
            self.history.end_group();
        }

        let edit = TextEdit {
            start: offset,
            deleted: String::new(),
            inserted: text.to_string(),
        };
        self.apply_forward(&edit);
        self.history.push(edit, single_char);
        self.last_insert_end = single_char.then(|| offset + 1);
        self.emit_user();
        Ok(())
    }

    /// Delete the characters in `range`.
    pub fn delete(&mut self, range: Range<usize>) -> Result<(), EditError> {
        let rope = self.editable_rope()?;
        let len = rope.len_chars();
        if range.start > range.end || range.end > len {
            return Err(EditError::InvalidRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        if range.is_empty() {
            return Ok(());
        }

        let edit = TextEdit {
            start: range.start,
            deleted: rope.slice(range).to_string(),
            inserted: String::new(),
        };
        self.apply_forward(&edit);
        self.history.push(edit, false);
        self.last_insert_end = None;
        self.emit_user();
        Ok(())
    }

    /// Replace the whole buffer as a single undoable user edit (e.g. select-all and paste).
    pub fn replace_all(&mut self, text: &str) -> Result<(), EditError> {
        let rope = self.editable_rope()?;
        let deleted = rope.to_string();
        if deleted == text {
            return Ok(());
        }

        let edit = TextEdit {
            start: 0,
            deleted,
            inserted: text.to_string(),
        };
        self.apply_forward(&edit);
        self.history.push(edit, false);
        self.last_insert_end = None;
        self.emit_user();
        Ok(())
    }

    /// Undo the latest edit group. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        self.editable_rope()?;
        let Some(edits) = self.history.undo() else {
            return Ok(false);
        };
        for edit in &edits {
            self.apply_inverse(edit);
        }
        self.last_insert_end = None;
        self.emit_user();
        Ok(true)
    }

    /// Redo the latest undone group. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        self.editable_rope()?;
        let Some(edits) = self.history.redo() else {
            return Ok(false);
        };
        for edit in &edits {
            self.apply_forward(edit);
        }
        self.last_insert_end = None;
        self.emit_user();
        Ok(true)
    }

    fn editable_rope(&self) -> Result<&Rope, EditError> {
        let rope = self.rope.as_ref().ok_or(EditError::NotMounted)?;
        if !self.state.editable {
            return Err(EditError::ReadOnly);
        }
        Ok(rope)
    }

    fn apply_forward(&mut self, edit: &TextEdit) {
        if let Some(rope) = self.rope.as_mut() {
            rope.remove(edit.start..edit.start + edit.deleted_len());
            rope.insert(edit.start, &edit.inserted);
        }
    }

    fn apply_inverse(&mut self, edit: &TextEdit) {
        if let Some(rope) = self.rope.as_mut() {
            rope.remove(edit.start..edit.start + edit.inserted_len());
            rope.insert(edit.start, &edit.deleted);
        }
    }

    fn emit_user(&mut self) {
        if let Some(text) = self.text() {
            self.emit(TextChange::user(text));
        }
    }

    fn emit(&mut self, change: TextChange) {
        for handler in &mut self.handlers {
            handler(&change);
        }
    }
}

impl Default for PlainTextView {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewAdapter for PlainTextView {
    fn text(&self) -> Option<String> {
        self.rope.as_ref().map(Rope::to_string)
    }

    fn set_text(&mut self, text: &str) -> Result<(), ViewError> {
        let Some(rope) = self.rope.as_mut() else {
            return Ok(());
        };
        if *rope == text {
            return Ok(());
        }

        *rope = Rope::from_str(text);
        self.history.reset();
        self.last_insert_end = None;
        self.emit(TextChange::sync(text));
        Ok(())
    }

    fn set_editable(&mut self, editable: bool) {
        if self.is_mounted() {
            self.state.editable = editable;
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if self.is_mounted() {
            self.state.visible = visible;
        }
    }

    fn set_width(&mut self, percent: u8) {
        if self.is_mounted() {
            self.state.width_percent = percent.min(100);
        }
    }

    fn on_change(&mut self, handler: ChangeHandler) {
        self.handlers.push(handler);
    }

    fn view_state(&self) -> Option<ViewState> {
        self.rope.as_ref().map(|_| self.state)
    }

    fn normalization(&self) -> Normalization {
        self.normalization
    }

    fn set_line_wrapping(&mut self, wrap: bool) {
        self.line_wrapping = wrap;
    }

    fn clear_history(&mut self) {
        self.history.reset();
        self.last_insert_end = None;
    }
}
