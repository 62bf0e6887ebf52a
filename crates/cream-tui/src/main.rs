//! Terminal demo of the dual-view editor.
//!
//! The left pane is the rich view (rendered blocks), the right pane is the plain markdown view,
//! shown when the split is open. The demo itself plays the host: it loads the file through
//! `setEditorRawText`, counts `onEditorValueChanged` notifications as unsaved changes, and writes
//! the canonical text back on save.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p cream-tui -- <note.md> [config.toml]
//! ```
//!
//! # Keys
//!
//! - Ctrl+T: open/close the split view
//! - Tab: switch focus between the views (split open)
//! - Arrows/Home/End: move the cursor (plain view)
//! - Backspace/Delete: delete (plain view); Backspace removes the last block (rich view)
//! - Ctrl+Z / Ctrl+Y: undo / redo in the focused view
//! - Ctrl+L: lock/unlock the note
//! - Ctrl+P: show the preview of the note
//! - Ctrl+U: clear undo history
//! - Ctrl+S: save
//! - Ctrl+Q: quit

use cream_core::{
    EditorConfig, EditorShell, HostCommand, HostNotification, HostReply, ViewAdapter,
};
use cream_views::{BlockKind, EditError, PlainTextView, RichTextView};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::{
    cell::{Cell, RefCell},
    env, fs,
    io::{self, stdout},
    path::PathBuf,
    process,
    rc::Rc,
    time::Duration,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Rich,
    Plain,
}

struct App {
    shell: EditorShell,
    rich: Rc<RefCell<RichTextView>>,
    plain: Rc<RefCell<PlainTextView>>,
    file_path: PathBuf,
    /// Notifications received since the last save.
    unsaved: Rc<Cell<usize>>,
    focus: Focus,
    /// Cursor in the plain view, in characters.
    cursor: usize,
    locked: bool,
    should_quit: bool,
    status_message: String,
}

impl App {
    fn new(file_path: PathBuf, config: &EditorConfig) -> io::Result<Self> {
        let content = if file_path.exists() {
            fs::read_to_string(&file_path)?
        } else {
            String::new()
        };

        let mut rich = RichTextView::with_config(&config.rich);
        rich.mount();
        let mut plain = PlainTextView::with_config(&config.plain);
        plain.mount();
        let rich = Rc::new(RefCell::new(rich));
        let plain = Rc::new(RefCell::new(plain));

        let mut shell = EditorShell::new(config, rich.clone(), plain.clone());
        let unsaved = Rc::new(Cell::new(0));
        let counter = unsaved.clone();
        shell.mount_host(move |_: HostNotification| counter.set(counter.get() + 1));
        shell.handle_host(HostCommand::SetEditorRawText { text: content });
        shell.handle_host(HostCommand::ClearUndoHistory);

        Ok(Self {
            shell,
            rich,
            plain,
            file_path,
            unsaved,
            focus: Focus::Rich,
            cursor: 0,
            locked: false,
            should_quit: false,
            status_message: String::new(),
        })
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let result = match key.code {
            KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                Ok(())
            }
            KeyCode::Char('s') if ctrl => {
                self.save_file();
                Ok(())
            }
            KeyCode::Char('t') if ctrl => {
                self.toggle_split();
                Ok(())
            }
            KeyCode::Char('l') if ctrl => {
                self.locked = !self.locked;
                self.shell.handle_host(HostCommand::NoteLockToggle {
                    locked: self.locked,
                });
                self.status_message = if self.locked { "Locked" } else { "Unlocked" }.to_string();
                Ok(())
            }
            KeyCode::Char('p') if ctrl => {
                self.show_preview();
                Ok(())
            }
            KeyCode::Char('u') if ctrl => {
                self.shell.handle_host(HostCommand::ClearUndoHistory);
                self.status_message = "Undo history cleared".to_string();
                Ok(())
            }
            KeyCode::Char('z') if ctrl => self.undo_redo(true),
            KeyCode::Char('y') if ctrl => self.undo_redo(false),
            KeyCode::Tab if self.shell.is_split_open() => {
                self.focus = match self.focus {
                    Focus::Rich => Focus::Plain,
                    Focus::Plain => Focus::Rich,
                };
                Ok(())
            }
            _ => match self.focus {
                Focus::Rich => self.handle_rich_key(key),
                Focus::Plain => self.handle_plain_key(key),
            },
        };

        if let Err(err) = result {
            self.status_message = format!("Edit refused: {err}");
        }
        self.shell.pump();
        self.cursor = self.cursor.min(self.plain.borrow().len_chars());
    }

    fn handle_rich_key(&mut self, key: KeyEvent) -> Result<(), EditError> {
        let mut rich = self.rich.borrow_mut();
        match key.code {
            KeyCode::Char(c) => rich.type_markdown(c.encode_utf8(&mut [0; 4])),
            KeyCode::Enter => rich.type_markdown("\n"),
            KeyCode::Backspace => match rich.blocks().len() {
                0 => Ok(()),
                count => rich.remove_block(count - 1),
            },
            _ => Ok(()),
        }
    }

    fn handle_plain_key(&mut self, key: KeyEvent) -> Result<(), EditError> {
        let mut plain = self.plain.borrow_mut();
        let len = plain.len_chars();
        match key.code {
            KeyCode::Char(c) => {
                plain.insert(self.cursor, c.encode_utf8(&mut [0; 4]))?;
                self.cursor += 1;
            }
            KeyCode::Enter => {
                plain.insert(self.cursor, "\n")?;
                self.cursor += 1;
            }
            KeyCode::Backspace if self.cursor > 0 => {
                plain.delete(self.cursor - 1..self.cursor)?;
                self.cursor -= 1;
            }
            KeyCode::Delete if self.cursor < len => plain.delete(self.cursor..self.cursor + 1)?,
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => {}
        }
        Ok(())
    }

    fn undo_redo(&mut self, undo: bool) -> Result<(), EditError> {
        let done = match (self.focus, undo) {
            (Focus::Rich, true) => self.rich.borrow_mut().undo()?,
            (Focus::Rich, false) => self.rich.borrow_mut().redo()?,
            (Focus::Plain, true) => self.plain.borrow_mut().undo()?,
            (Focus::Plain, false) => self.plain.borrow_mut().redo()?,
        };
        if !done {
            self.status_message = "Nothing to do".to_string();
        }
        Ok(())
    }

    fn toggle_split(&mut self) {
        let open = self.shell.toggle_split();
        if !open {
            self.focus = Focus::Rich;
        }
        self.status_message = if open { "Split open" } else { "Split closed" }.to_string();
    }

    fn show_preview(&mut self) {
        let text = self.shell.controller().canonical().to_string();
        if let HostReply::Preview(preview) =
            self.shell.handle_host(HostCommand::GenerateCustomPreview { text })
        {
            self.status_message = format!("Preview: {}", preview.plain.unwrap_or_default());
        }
    }

    fn save_file(&mut self) {
        match fs::write(&self.file_path, self.shell.controller().canonical()) {
            Ok(()) => {
                self.unsaved.set(0);
                self.status_message = format!("Saved {}", self.file_path.display());
            }
            Err(err) => self.status_message = format!("Save failed: {err}"),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(frame.area());

        let rich_width = self
            .rich
            .borrow()
            .view_state()
            .map_or(100, |s| s.width_percent);
        let plain_state = self.plain.borrow().view_state();
        let plain_width = plain_state
            .filter(|s| s.visible)
            .map_or(0, |s| s.width_percent);

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(rich_width.into()),
                Constraint::Percentage(plain_width.into()),
            ])
            .split(chunks[0]);

        self.render_rich(frame, panes[0]);
        if plain_width > 0 {
            self.render_plain(frame, panes[1]);
        }
        self.render_status_line(frame, chunks[1]);
    }

    fn pane_block(&self, title: &'static str, focus: Focus) -> Block<'static> {
        let style = if self.focus == focus {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(title)
    }

    fn render_rich(&self, frame: &mut Frame, area: Rect) {
        let rich = self.rich.borrow();
        let mut lines = Vec::new();
        for block in rich.blocks() {
            let style = match block.kind {
                BlockKind::Heading(_) => Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
                BlockKind::BlockQuote => Style::default()
                    .fg(Color::Gray)
                    .add_modifier(Modifier::ITALIC),
                BlockKind::CodeBlock => Style::default().fg(Color::Yellow),
                BlockKind::Html | BlockKind::Raw => Style::default().fg(Color::DarkGray),
                BlockKind::Rule => Style::default().fg(Color::DarkGray),
                BlockKind::List | BlockKind::Table | BlockKind::Paragraph => Style::default(),
            };
            for line in block.source.lines() {
                lines.push(Line::from(Span::styled(line.to_string(), style)));
            }
            lines.push(Line::default());
        }

        let paragraph = Paragraph::new(lines)
            .block(self.pane_block("Rich", Focus::Rich))
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, area);
    }

    fn render_plain(&self, frame: &mut Frame, area: Rect) {
        let plain = self.plain.borrow();
        let text = plain.text().unwrap_or_default();
        let lines: Vec<Line> = text.split('\n').map(|l| Line::from(l.to_string())).collect();

        let mut paragraph = Paragraph::new(lines).block(self.pane_block("Markdown", Focus::Plain));
        if plain.is_line_wrapping() {
            paragraph = paragraph.wrap(Wrap { trim: false });
        }
        frame.render_widget(paragraph, area);

        if self.focus == Focus::Plain {
            let before: String = text.chars().take(self.cursor).collect();
            let row = before.matches('\n').count();
            let col = before.rsplit('\n').next().map_or(0, |l| l.chars().count());
            let x = area.x + 1 + col as u16;
            let y = area.y + 1 + row as u16;
            if x < area.right().saturating_sub(1) && y < area.bottom().saturating_sub(1) {
                frame.set_cursor_position((x, y));
            }
        }
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let stats = self.shell.controller().stats();
        let unsaved = match self.unsaved.get() {
            0 => String::new(),
            n => format!(" [{n} unsaved]"),
        };
        let status = format!(
            " {}{} | relayed {} | echoes {} | {}",
            self.file_path.display(),
            unsaved,
            stats.relayed,
            stats.echoes_suppressed,
            self.status_message
        );
        let paragraph =
            Paragraph::new(status).style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(paragraph, area);
    }
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("usage: {} <note.md> [config.toml]", args[0]);
        process::exit(1);
    }

    let file_path = PathBuf::from(&args[1]);
    let config = match args.get(2) {
        Some(path) => match EditorConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load {path}: {err}");
                process::exit(1);
            }
        },
        None => EditorConfig::default(),
    };
    let mut app = App::new(file_path, &config)?;

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("error: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            app.handle_key_event(key);
        }
    }

    Ok(())
}
