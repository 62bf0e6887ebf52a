//! Note previews for the host.
//!
//! The host shows a short summary of each note in its list and search results. A preview is
//! derived from arbitrary markdown, not necessarily the text currently in the editor, and never
//! depends on editor state.

use crate::config::PreviewConfig;
use pulldown_cmark::{Event, Options, Parser, TagEnd, html};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use unicode_segmentation::UnicodeSegmentation;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

const ELLIPSIS: char = '…';

/// A note preview. Either half may be absent when disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    /// Plain-text summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plain: Option<String>,
    /// Rendered HTML.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
}

/// Pure markdown-to-preview function with fixed settings.
#[derive(Debug, Clone, Default)]
pub struct PreviewGenerator {
    config: PreviewConfig,
}

impl PreviewGenerator {
    /// Create a generator with the given settings.
    pub fn new(config: PreviewConfig) -> Self {
        Self { config }
    }

    /// Settings in use.
    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Build the preview of `text`.
    pub fn generate(&self, text: &str) -> Preview {
        let plain = self.config.plain.then(|| {
            let summary = truncate_graphemes(&plain_text(text), self.config.max_plain_chars);
            match &self.config.empty_placeholder {
                Some(placeholder) if summary.is_empty() => placeholder.clone(),
                _ => summary,
            }
        });
        let html = self.config.html.then(|| render_html(text));
        Preview { plain, html }
    }
}

fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Textual content of `text`, with markup removed and whitespace collapsed.
pub fn plain_text(text: &str) -> String {
    let mut raw = String::with_capacity(text.len());
    for event in Parser::new_ext(text, markdown_options()) {
        match event {
            Event::Text(t) | Event::Code(t) => raw.push_str(&t),
            Event::SoftBreak | Event::HardBreak | Event::Rule => raw.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading { .. }
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell
                | TagEnd::BlockQuote { .. },
            ) => raw.push(' '),
            _ => {}
        }
    }
    WHITESPACE_RUN.replace_all(&raw, " ").trim().to_string()
}

fn render_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(text, markdown_options()));
    out
}

fn truncate_graphemes(text: &str, max: usize) -> String {
    if max == 0 {
        return text.to_string();
    }
    let mut graphemes = text.grapheme_indices(true);
    match graphemes.nth(max) {
        None => text.to_string(),
        Some(_) => {
            let cut = text
                .grapheme_indices(true)
                .nth(max - 1)
                .map_or(text.len(), |(offset, _)| offset);
            let mut out = text[..cut].trim_end().to_string();
            out.push(ELLIPSIS);
            out
        }
    }
}
