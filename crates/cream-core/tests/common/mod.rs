#![allow(dead_code)]

use cream_core::{
    ChangeHandler, Normalization, TextChange, ViewAdapter, ViewError, ViewState,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Minimal scripted view: records pushes and lets tests play the user.
pub struct MockView {
    pub text: Option<String>,
    pub state: ViewState,
    pub normalization: Normalization,
    pub wrapping: bool,
    pub set_text_calls: Vec<String>,
    pub history_cleared: usize,
    pub reject_marker: Option<&'static str>,
    /// Report pushes as user edits, like a widget whose listener cannot tell them apart.
    pub echo_as_user: bool,
    handlers: Vec<ChangeHandler>,
}

impl MockView {
    pub fn mounted() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(Some(String::new()))))
    }

    pub fn unmounted() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new(None)))
    }

    fn new(text: Option<String>) -> Self {
        Self {
            text,
            state: ViewState::default(),
            normalization: Normalization::Exact,
            wrapping: false,
            set_text_calls: Vec::new(),
            history_cleared: 0,
            reject_marker: None,
            echo_as_user: false,
            handlers: Vec::new(),
        }
    }

    /// Simulate the user changing the buffer.
    pub fn type_text(&mut self, text: &str) {
        self.text = Some(text.to_string());
        self.emit(TextChange::user(text));
    }

    pub fn mount(&mut self) {
        if self.text.is_none() {
            self.text = Some(String::new());
        }
    }

    fn emit(&mut self, change: TextChange) {
        for handler in &mut self.handlers {
            handler(&change);
        }
    }
}

impl ViewAdapter for MockView {
    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) -> Result<(), ViewError> {
        let Some(current) = &self.text else {
            return Ok(());
        };
        if let Some(marker) = self.reject_marker
            && text.contains(marker)
        {
            return Err(ViewError::unrepresentable(format!("contains {marker}")));
        }
        self.set_text_calls.push(text.to_string());
        if current == text {
            return Ok(());
        }
        self.text = Some(text.to_string());
        let change = if self.echo_as_user {
            TextChange::user(text)
        } else {
            TextChange::sync(text)
        };
        self.emit(change);
        Ok(())
    }

    fn set_editable(&mut self, editable: bool) {
        if self.text.is_some() {
            self.state.editable = editable;
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if self.text.is_some() {
            self.state.visible = visible;
        }
    }

    fn set_width(&mut self, percent: u8) {
        if self.text.is_some() {
            self.state.width_percent = percent.min(100);
        }
    }

    fn on_change(&mut self, handler: ChangeHandler) {
        self.handlers.push(handler);
    }

    fn view_state(&self) -> Option<ViewState> {
        self.text.as_ref().map(|_| self.state)
    }

    fn normalization(&self) -> Normalization {
        self.normalization
    }

    fn set_line_wrapping(&mut self, wrap: bool) {
        self.wrapping = wrap;
    }

    fn clear_history(&mut self) {
        self.history_cleared += 1;
    }
}
