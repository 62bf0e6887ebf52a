#![warn(missing_docs)]
//! JSON-lines host runner.
//!
//! [`HostRunner`] plays the host application for a real editor session built from the
//! reference views in `cream-views`. Each input line is one JSON object tagged by `"action"`:
//!
//! - host commands: `setEditorRawText`, `generateCustomPreview`, `onNoteLockToggle`,
//!   `clearUndoHistory`
//! - scripted user input: `editPlain` / `editRich` (replace the view's content as a user edit),
//!   `toggleSplit`
//!
//! Every resulting message is written as one JSON line: `onEditorValueChanged` notifications,
//! `customPreview` replies, and `error` reports for lines that could not be handled.

use cream_core::{EditorConfig, EditorShell, HostCommand, HostNotification, HostReply, Preview};
use cream_views::{EditError, PlainTextView, RichTextView};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Simulated user input accepted next to host commands.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum LocalCommand {
    /// Replace the plain view's content as if the user pasted it.
    EditPlain {
        /// New content.
        text: String,
    },
    /// Replace the rich view's document as if the user pasted it.
    EditRich {
        /// New content.
        text: String,
    },
    /// Open or close the split view.
    ToggleSplit,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Inbound {
    /// A host command.
    Host(HostCommand),
    /// Scripted user input.
    Local(LocalCommand),
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action")]
pub enum Outbound {
    /// The user changed the document.
    #[serde(rename = "onEditorValueChanged")]
    EditorValueChanged {
        /// Full document content.
        text: String,
    },
    /// Reply to `generateCustomPreview`.
    #[serde(rename = "customPreview")]
    CustomPreview(Preview),
    /// A line could not be handled.
    #[serde(rename = "error")]
    Error {
        /// What went wrong.
        message: String,
    },
}

impl From<HostNotification> for Outbound {
    fn from(notification: HostNotification) -> Self {
        match notification {
            HostNotification::EditorValueChanged { text } => Outbound::EditorValueChanged { text },
        }
    }
}

#[derive(Debug, Error)]
/// Failures that end a [`HostRunner::run`] loop.
pub enum RunError {
    #[error("I/O error: {0}")]
    /// Reading input or writing output failed.
    Io(#[from] std::io::Error),

    #[error("JSON encode error: {0}")]
    /// An output message could not be encoded.
    Json(#[from] serde_json::Error),
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-empty input lines read.
    pub lines: usize,
    /// Output messages written.
    pub messages: usize,
    /// Lines answered with an error.
    pub errors: usize,
}

/// An editor session driven by JSON lines.
pub struct HostRunner {
    shell: EditorShell,
    rich: Rc<RefCell<RichTextView>>,
    plain: Rc<RefCell<PlainTextView>>,
    outbox: Rc<RefCell<Vec<HostNotification>>>,
}

impl HostRunner {
    /// Build a session with mounted views and a mounted host.
    pub fn new(config: &EditorConfig) -> Self {
        let mut rich = RichTextView::with_config(&config.rich);
        rich.mount();
        let mut plain = PlainTextView::with_config(&config.plain);
        plain.mount();
        let rich = Rc::new(RefCell::new(rich));
        let plain = Rc::new(RefCell::new(plain));

        let mut shell = EditorShell::new(config, rich.clone(), plain.clone());
        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = outbox.clone();
        shell.mount_host(move |n: HostNotification| sink.borrow_mut().push(n));

        Self {
            shell,
            rich,
            plain,
            outbox,
        }
    }

    /// The composed editor.
    pub fn shell(&self) -> &EditorShell {
        &self.shell
    }

    /// Handle one input line and return the messages it produced.
    pub fn handle_line(&mut self, line: &str) -> Vec<Outbound> {
        let inbound = match serde_json::from_str::<Inbound>(line) {
            Ok(inbound) => inbound,
            Err(err) => {
                warn!(%err, "unrecognized input line");
                return vec![Outbound::Error {
                    message: format!("unrecognized message: {err}"),
                }];
            }
        };

        let mut out = Vec::new();
        match inbound {
            Inbound::Host(command) => match self.shell.handle_host(command) {
                HostReply::Preview(preview) => out.push(Outbound::CustomPreview(preview)),
                HostReply::Ack => {}
                HostReply::Dropped => out.push(Outbound::Error {
                    message: "no host session".to_string(),
                }),
            },
            Inbound::Local(command) => {
                if let Err(err) = self.handle_local(command) {
                    debug!(%err, "user edit refused");
                    out.push(Outbound::Error {
                        message: err.to_string(),
                    });
                }
                self.shell.pump();
            }
        }

        // Notifications come before any reply produced by the same line.
        let notifications: Vec<Outbound> =
            self.outbox.borrow_mut().drain(..).map(Outbound::from).collect();
        out.splice(0..0, notifications);
        out
    }

    fn handle_local(&mut self, command: LocalCommand) -> Result<(), EditError> {
        match command {
            LocalCommand::EditPlain { text } => self.plain.borrow_mut().replace_all(&text),
            LocalCommand::EditRich { text } => self.rich.borrow_mut().replace_document(&text),
            LocalCommand::ToggleSplit => {
                let open = self.shell.toggle_split();
                debug!(open, "split toggled");
                Ok(())
            }
        }
    }

    /// Process `input` line by line until EOF, writing JSON lines to `output`.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        input: R,
        mut output: W,
    ) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary::default();
        for line in input.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            summary.lines += 1;

            for message in self.handle_line(line) {
                if matches!(message, Outbound::Error { .. }) {
                    summary.errors += 1;
                }
                serde_json::to_writer(&mut output, &message)?;
                output.write_all(b"\n")?;
                summary.messages += 1;
            }
            output.flush()?;
        }

        info!(
            lines = summary.lines,
            messages = summary.messages,
            errors = summary.errors,
            "input closed"
        );
        Ok(summary)
    }
}
