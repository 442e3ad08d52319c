//! TUI application state management.

use std::time::{Duration, Instant};

use unicode_width::UnicodeWidthChar;

use crate::{
    editor::EditorState,
    execution::{Outcome, Signal, Submission},
    language::Language,
};

const TAB: &str = "    ";
const PAGE_LINES: usize = 10;
const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Transient message shown after an execution settles.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub signal: Signal,
    pub shown_at: Instant,
}

/// Application state for the TUI
#[derive(Debug)]
pub struct App {
    pub editor: EditorState,
    /// Cursor position in the source (byte index, always on a char boundary)
    pub cursor: usize,
    /// Highlighted row while the language selector is open
    pub selector: Option<usize>,
    pub show_help: bool,
    pub notification: Option<Notification>,
    pub notification_ttl: Duration,
    /// Lines scrolled off the top of the output pane
    pub output_scroll: u16,
    /// Inner (width, height) of the output pane as last drawn
    pub output_view: (u16, u16),
    pub running_since: Option<Instant>,
    pub endpoint: String,
}

impl App {
    pub fn new(language: Language, endpoint: String, notification_ttl: Duration) -> Self {
        let editor = EditorState::new(language);
        let cursor = editor.source().len();
        Self {
            editor,
            cursor,
            selector: None,
            show_help: false,
            notification: None,
            notification_ttl,
            output_scroll: 0,
            output_view: (0, 0),
            running_since: None,
            endpoint,
        }
    }

    // ----- Execution -----

    /// Start an execution unless one is already running.
    pub fn begin_execution(&mut self) -> Option<Submission> {
        if self.editor.is_running() {
            return None;
        }
        self.notification = None;
        self.output_scroll = 0;
        self.running_since = Some(Instant::now());
        Some(self.editor.begin_execution())
    }

    pub fn finish_execution(&mut self, outcome: Outcome) {
        let signal = self.editor.settle(outcome);
        self.running_since = None;
        self.output_scroll = 0;
        self.notification = Some(Notification { signal, shown_at: Instant::now() });
    }

    pub fn spinner(&self) -> &'static str {
        let elapsed = self.running_since.map(|t| t.elapsed().as_millis()).unwrap_or(0);
        SPINNER[(elapsed / 80) as usize % SPINNER.len()]
    }

    /// Drop the notification once it has been visible long enough.
    pub fn tick(&mut self, now: Instant) {
        if let Some(n) = &self.notification {
            if now.duration_since(n.shown_at) >= self.notification_ttl {
                self.notification = None;
            }
        }
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    // ----- Language selector -----

    pub fn open_selector(&mut self) {
        self.selector = Some(self.editor.language().index());
    }

    pub fn close_selector(&mut self) {
        self.selector = None;
    }

    pub fn selector_up(&mut self) {
        if let Some(i) = self.selector.as_mut() {
            *i = i.checked_sub(1).unwrap_or(Language::ALL.len() - 1);
        }
    }

    pub fn selector_down(&mut self) {
        if let Some(i) = self.selector.as_mut() {
            *i = (*i + 1) % Language::ALL.len();
        }
    }

    pub fn confirm_selector(&mut self) {
        if let Some(i) = self.selector.take() {
            self.pick_language(Language::ALL[i]);
        }
    }

    /// Selector choice: re-picking the current language keeps the edits.
    pub fn pick_language(&mut self, language: Language) {
        if language != self.editor.language() {
            self.select_language(language);
        }
    }

    pub fn select_language(&mut self, language: Language) {
        self.editor.select_language(language);
        self.cursor = self.editor.source().len();
        self.output_scroll = 0;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    // ----- Output scrolling -----

    pub fn scroll_output_up(&mut self) {
        self.output_scroll = self.output_scroll.saturating_sub(1);
    }

    pub fn scroll_output_down(&mut self) {
        if self.output_scroll < self.max_output_scroll() {
            self.output_scroll += 1;
        }
    }

    /// Furthest scroll that still fills the pane, counted in wrapped rows.
    pub fn max_output_scroll(&self) -> u16 {
        let (width, height) = self.output_view;
        let rows = wrap_rows(self.editor.output(), width).len();
        rows.saturating_sub(height.max(1) as usize).min(u16::MAX as usize) as u16
    }

    // ----- Source editing helpers -----

    pub fn insert_char(&mut self, c: char) {
        self.editor.source_mut().insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        // Terminals deliver pasted newlines as \r or \r\n.
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        self.editor.source_mut().insert_str(self.cursor, &normalized);
        self.cursor += normalized.len();
    }

    pub fn insert_newline(&mut self) {
        self.insert_char('\n');
    }

    pub fn insert_tab(&mut self) {
        self.insert_str(TAB);
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.editor.source_mut().replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.editor.source_mut().replace_range(self.cursor..next, "");
        }
    }

    pub fn move_cursor_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = self.line_start(self.cursor);
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.line_end(self.cursor);
    }

    pub fn move_cursor_up(&mut self) {
        let start = self.line_start(self.cursor);
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let col = self.column();
        let prev_start = self.line_start(start - 1);
        self.cursor = self.offset_in_line(prev_start, col);
    }

    pub fn move_cursor_down(&mut self) {
        let end = self.line_end(self.cursor);
        if end == self.editor.source().len() {
            self.cursor = end;
            return;
        }
        let col = self.column();
        self.cursor = self.offset_in_line(end + 1, col);
    }

    pub fn page_up(&mut self) {
        for _ in 0..PAGE_LINES {
            self.move_cursor_up();
        }
    }

    pub fn page_down(&mut self) {
        for _ in 0..PAGE_LINES {
            self.move_cursor_down();
        }
    }

    /// Zero-based (line, char column) of the cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        let src = self.editor.source();
        let row = src[..self.cursor].matches('\n').count();
        (row, self.column())
    }

    fn column(&self) -> usize {
        let start = self.line_start(self.cursor);
        self.editor.source()[start..self.cursor].chars().count()
    }

    fn line_start(&self, at: usize) -> usize {
        self.editor.source()[..at].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    fn line_end(&self, at: usize) -> usize {
        let src = self.editor.source();
        src[at..].find('\n').map(|i| at + i).unwrap_or(src.len())
    }

    /// Byte offset of char column `col` on the line starting at `start`, clamped to its end.
    fn offset_in_line(&self, start: usize, col: usize) -> usize {
        let end = self.line_end(start);
        let line = &self.editor.source()[start..end];
        start + line.char_indices().nth(col).map(|(i, _)| i).unwrap_or(line.len())
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.editor.source()[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.editor.source()[self.cursor..].chars().next().map(|c| self.cursor + c.len_utf8())
    }
}

/// Hard-wrap `text` into rows no wider than `width` display columns; 0 disables wrapping.
pub fn wrap_rows(text: &str, width: u16) -> Vec<String> {
    let width = width as usize;
    let mut rows = Vec::new();
    for line in text.lines() {
        if width == 0 {
            rows.push(line.to_string());
            continue;
        }
        let mut row = String::new();
        let mut used = 0;
        for c in line.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > width && !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                used = 0;
            }
            row.push(c);
            used += w;
        }
        rows.push(row);
    }
    rows
}
