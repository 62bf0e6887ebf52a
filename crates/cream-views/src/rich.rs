//! Block-model markdown view.
//!
//! The rich view holds the document as a list of top-level markdown blocks. Setting text parses
//! it into blocks; reading text serializes the blocks back, one blank line apart, with trailing
//! whitespace removed. That serialization is the view's canonical form: two texts are
//! equivalent for this view when their serializations match under the configured
//! [`Normalization`].

use crate::error::EditError;
use crate::history::UndoHistory;
use cream_core::{
    ChangeHandler, Normalization, RichViewConfig, TextChange, ViewAdapter, ViewError, ViewState,
};
use pulldown_cmark::{Event, Options, Parser, Tag};
use tracing::{debug, trace};

/// Kind of a top-level block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// ATX or setext heading of the given level.
    Heading(u8),
    /// Paragraph.
    Paragraph,
    /// Block quote.
    BlockQuote,
    /// Fenced or indented code block.
    CodeBlock,
    /// Ordered or bullet list.
    List,
    /// Table.
    Table,
    /// Thematic break.
    Rule,
    /// Raw HTML block.
    Html,
    /// Source the parser emits no block for, such as link reference definitions.
    Raw,
}

/// One top-level block and its markdown source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// What the block is.
    pub kind: BlockKind,
    /// Markdown source, without trailing whitespace.
    pub source: String,
}

/// What the rich view is able to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RichSchema {
    /// Raw HTML blocks are representable.
    pub allow_html: bool,
}

impl Default for RichSchema {
    fn default() -> Self {
        Self { allow_html: true }
    }
}

impl RichSchema {
    /// Reject block lists the schema cannot represent.
    pub fn check(&self, blocks: &[Block]) -> Result<(), ViewError> {
        if !self.allow_html && blocks.iter().any(|b| b.kind == BlockKind::Html) {
            return Err(ViewError::unrepresentable("raw HTML blocks are not supported"));
        }
        Ok(())
    }
}

fn parser_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options
}

fn block_kind(tag: &Tag<'_>) -> BlockKind {
    match tag {
        Tag::Heading { level, .. } => BlockKind::Heading(*level as u8),
        Tag::Paragraph => BlockKind::Paragraph,
        Tag::BlockQuote { .. } => BlockKind::BlockQuote,
        Tag::CodeBlock(_) => BlockKind::CodeBlock,
        Tag::List(_) => BlockKind::List,
        Tag::Table(_) => BlockKind::Table,
        Tag::HtmlBlock => BlockKind::Html,
        _ => BlockKind::Raw,
    }
}

/// Start of the line holding `offset`, if only indentation precedes `offset` on that line.
fn line_start(text: &str, offset: usize) -> usize {
    let start = text[..offset].rfind('\n').map_or(0, |i| i + 1);
    if text[start..offset].chars().all(|c| c == ' ' || c == '\t') {
        start
    } else {
        offset
    }
}

fn push_raw(blocks: &mut Vec<Block>, gap: &str) {
    let gap = gap.trim();
    if !gap.is_empty() {
        blocks.push(Block {
            kind: BlockKind::Raw,
            source: gap.to_string(),
        });
    }
}

/// Split markdown into top-level blocks.
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut depth = 0usize;
    let mut cursor = 0usize;

    for (event, range) in Parser::new_ext(text, parser_options()).into_offset_iter() {
        let kind = match (&event, depth) {
            (Event::Start(tag), 0) => Some(block_kind(tag)),
            (Event::Rule, 0) => Some(BlockKind::Rule),
            _ => None,
        };
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) => depth = depth.saturating_sub(1),
            _ => {}
        }

        let Some(kind) = kind else {
            continue;
        };
        if range.end <= cursor {
            continue;
        }
        let start = line_start(text, range.start).max(cursor);
        push_raw(&mut blocks, &text[cursor..start]);
        blocks.push(Block {
            kind,
            source: text[start..range.end].trim_end().to_string(),
        });
        cursor = range.end.max(cursor);
    }

    push_raw(&mut blocks, &text[cursor..]);
    blocks
}

/// Join blocks into the view's canonical markdown.
pub fn serialize_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|b| b.source.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Canonical rich-view form of arbitrary markdown.
pub fn canonicalize(text: &str) -> String {
    serialize_blocks(&parse_blocks(text))
}

#[derive(Debug, Clone)]
struct BlockSplice {
    index: usize,
    removed: Vec<Block>,
    inserted: Vec<Block>,
}

/// Rendered-document view over a block list.
pub struct RichTextView {
    blocks: Option<Vec<Block>>,
    schema: RichSchema,
    state: ViewState,
    normalization: Normalization,
    history: UndoHistory<BlockSplice>,
    handlers: Vec<ChangeHandler>,
}

impl RichTextView {
    /// Create an unmounted view with default settings.
    pub fn new() -> Self {
        Self::with_config(&RichViewConfig::default())
    }

    /// Create an unmounted view from configuration.
    pub fn with_config(config: &RichViewConfig) -> Self {
        Self {
            blocks: None,
            schema: RichSchema {
                allow_html: config.allow_html,
            },
            state: ViewState::default(),
            normalization: config.normalization,
            history: UndoHistory::new(config.max_undo),
            handlers: Vec::new(),
        }
    }

    /// Create a view that is already mounted with an empty document.
    pub fn mounted() -> Self {
        let mut view = Self::new();
        view.mount();
        view
    }

    /// Attach the view to a surface. The document starts empty.
    pub fn mount(&mut self) {
        if self.blocks.is_none() {
            self.blocks = Some(Vec::new());
            trace!("rich view mounted");
        }
    }

    /// Detach the view, discarding content and history.
    pub fn unmount(&mut self) {
        self.blocks = None;
        self.history.reset();
    }

    /// Whether the view has a document.
    pub fn is_mounted(&self) -> bool {
        self.blocks.is_some()
    }

    /// The schema in force.
    pub fn schema(&self) -> RichSchema {
        self.schema
    }

    /// Top-level blocks (empty if unmounted).
    pub fn blocks(&self) -> &[Block] {
        self.blocks.as_deref().unwrap_or(&[])
    }

    /// Whether undo is possible.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo is possible.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace block `index` with the blocks parsed from `markdown`.
    ///
    /// The change is reported even when the resulting markdown is unchanged, as a formatting
    /// toggle that round-trips to the same source would be.
    pub fn replace_block(&mut self, index: usize, markdown: &str) -> Result<(), EditError> {
        self.check_index(index, false)?;
        self.transact(index, 1, markdown)
    }

    /// Insert the blocks parsed from `markdown` before block `index` (`index == len` appends).
    pub fn insert_block(&mut self, index: usize, markdown: &str) -> Result<(), EditError> {
        self.check_index(index, true)?;
        self.transact(index, 0, markdown)
    }

    /// Remove block `index`.
    pub fn remove_block(&mut self, index: usize) -> Result<(), EditError> {
        self.check_index(index, false)?;
        self.transact(index, 1, "")
    }

    /// Replace the whole document as one undoable transaction (select all, paste).
    pub fn replace_document(&mut self, markdown: &str) -> Result<(), EditError> {
        let count = self.editable_blocks()?.len();
        self.transact(0, count, markdown)
    }

    /// Type `markdown` at the end of the document.
    ///
    /// The last block is re-parsed together with the typed text, so input such as `"\n\n- a"`
    /// starts a new list the way markdown input rules would.
    pub fn type_markdown(&mut self, markdown: &str) -> Result<(), EditError> {
        let last = self.editable_blocks()?.last().map(|b| b.source.clone());
        match last {
            Some(source) => {
                let index = self.blocks().len() - 1;
                self.transact(index, 1, &format!("{source}{markdown}"))
            }
            None => self.transact(0, 0, markdown),
        }
    }

    /// Undo the latest transaction group. Returns `false` if there was nothing to undo.
    pub fn undo(&mut self) -> Result<bool, EditError> {
        self.editable_blocks()?;
        let Some(splices) = self.history.undo() else {
            return Ok(false);
        };
        for splice in &splices {
            self.splice(splice.index, splice.inserted.len(), splice.removed.clone());
        }
        self.emit_user();
        Ok(true)
    }

    /// Redo the latest undone transaction group. Returns `false` if there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, EditError> {
        self.editable_blocks()?;
        let Some(splices) = self.history.redo() else {
            return Ok(false);
        };
        for splice in &splices {
            self.splice(splice.index, splice.removed.len(), splice.inserted.clone());
        }
        self.emit_user();
        Ok(true)
    }

    fn check_index(&self, index: usize, allow_end: bool) -> Result<(), EditError> {
        let count = self.editable_blocks()?.len();
        if index < count || (allow_end && index == count) {
            Ok(())
        } else {
            Err(EditError::InvalidBlock { index, count })
        }
    }

    fn editable_blocks(&self) -> Result<&[Block], EditError> {
        let blocks = self.blocks.as_deref().ok_or(EditError::NotMounted)?;
        if !self.state.editable {
            return Err(EditError::ReadOnly);
        }
        Ok(blocks)
    }

    fn transact(&mut self, index: usize, remove: usize, markdown: &str) -> Result<(), EditError> {
        let inserted = parse_blocks(markdown);
        self.schema.check(&inserted)?;

        let removed = self.splice(index, remove, inserted.clone());
        if removed != inserted {
            self.history.push(
                BlockSplice {
                    index,
                    removed,
                    inserted,
                },
                false,
            );
        }
        self.emit_user();
        Ok(())
    }

    fn splice(&mut self, index: usize, remove: usize, insert: Vec<Block>) -> Vec<Block> {
        match self.blocks.as_mut() {
            Some(blocks) => blocks.splice(index..index + remove, insert).collect(),
            None => Vec::new(),
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

impl Default for RichTextView {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewAdapter for RichTextView {
    fn text(&self) -> Option<String> {
        self.blocks.as_deref().map(serialize_blocks)
    }

    fn set_text(&mut self, text: &str) -> Result<(), ViewError> {
        let Some(current) = self.blocks.as_deref() else {
            return Ok(());
        };

        let blocks = parse_blocks(text);
        self.schema.check(&blocks)?;
        if blocks == current {
            return Ok(());
        }

        debug!(blocks = blocks.len(), "rich document replaced");
        self.blocks = Some(blocks);
        self.history.reset();
        if let Some(text) = self.text() {
            self.emit(TextChange::sync(text));
        }
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
        self.blocks.as_ref().map(|_| self.state)
    }

    fn normalization(&self) -> Normalization {
        self.normalization
    }

    fn equivalent(&self, a: &str, b: &str) -> bool {
        self.normalization.equivalent(&canonicalize(a), &canonicalize(b))
    }

    fn clear_history(&mut self) {
        self.history.reset();
    }
}
