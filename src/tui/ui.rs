//! UI layout and rendering logic for the TUI.

use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use super::app::{wrap_rows, App};
use crate::language::Language;

const OUTPUT_PLACEHOLDER: &str = "Output will appear here...";
const EDITOR_PLACEHOLDER: &str = "Write your code here...";

/// Render the main UI
pub fn render_ui(frame: &mut Frame, app: &mut App) {
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Header
            Constraint::Min(3),    // Editor + output
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_header(frame, app, main_layout[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(main_layout[1]);

    render_editor(frame, app, panes[0]);
    render_output(frame, app, panes[1]);
    render_status_bar(frame, app, main_layout[2]);

    if let Some(selected) = app.selector {
        render_language_selector(frame, selected);
    } else if app.show_help {
        render_help_overlay(frame);
    }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::BOTTOM);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(36)])
        .split(inner);

    let title = Text::from(vec![
        Line::from(Span::styled(
            "Code Compiler",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Execute C, Java, Python, and JavaScript online",
            Style::default().fg(Color::DarkGray),
        )),
    ]);
    frame.render_widget(Paragraph::new(title), columns[0]);

    let (button, button_style) = if app.editor.is_running() {
        (
            format!(" {} Running ", app.spinner()),
            Style::default().fg(Color::Gray).bg(Color::DarkGray),
        )
    } else {
        (
            " ▶ Execute ".to_string(),
            Style::default().fg(Color::Black).bg(Color::Cyan).add_modifier(Modifier::BOLD),
        )
    };

    let controls = Text::from(vec![
        Line::from(vec![
            Span::raw(format!("[{} ▾] ", app.editor.language().display_name())),
            Span::styled(button, button_style),
        ]),
        Line::from(Span::styled(
            "F2 language  Ctrl+R run",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .right_aligned();
    frame.render_widget(Paragraph::new(controls), columns[1]);
}

/// Scroll so that `pos` stays inside a viewport of `len` cells.
fn follow(pos: usize, len: u16) -> u16 {
    let len = len.max(1) as usize;
    pos.saturating_sub(len - 1) as u16
}

fn render_editor(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!("Editor - {}", app.editor.language().display_name());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);

    let source = app.editor.source();
    if source.is_empty() {
        let placeholder = Paragraph::new(EDITOR_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        if let Some(pos) = editor_cursor(app, inner.x, inner.y) {
            frame.set_cursor_position(pos);
        }
        return;
    }

    let (row, _) = app.cursor_position();
    let line_start = source[..app.cursor].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col_width = source[line_start..app.cursor].width();

    let scroll_y = follow(row, inner.height);
    let scroll_x = follow(col_width, inner.width);

    // Code is shown unwrapped; long lines scroll horizontally with the cursor.
    let paragraph = Paragraph::new(source).block(block).scroll((scroll_y, scroll_x));
    frame.render_widget(paragraph, area);

    let x = inner.x + (col_width as u16).saturating_sub(scroll_x);
    let y = inner.y + (row as u16).saturating_sub(scroll_y);
    if let Some(pos) = editor_cursor(app, x, y) {
        frame.set_cursor_position(pos);
    }
}

/// Popups own the screen; the editor cursor stays hidden under them.
fn editor_cursor(app: &App, x: u16, y: u16) -> Option<Position> {
    (app.selector.is_none() && !app.show_help).then_some(Position::new(x, y))
}

fn render_output(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title("Output");
    let inner = block.inner(area);

    // Scroll limits are computed from the same rows drawn here.
    app.output_view = (inner.width, inner.height);
    app.output_scroll = app.output_scroll.min(app.max_output_scroll());

    let output = app.editor.output();
    let paragraph = if output.is_empty() {
        Paragraph::new(OUTPUT_PLACEHOLDER)
            .style(Style::default().fg(Color::DarkGray))
            .wrap(Wrap { trim: false })
    } else {
        let rows: Vec<Line> = wrap_rows(output, inner.width).into_iter().map(Line::from).collect();
        Paragraph::new(rows).scroll((app.output_scroll, 0))
    };

    frame.render_widget(paragraph.block(block), area);
}

/// Render the status bar
fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match &app.notification {
        Some(n) if n.signal.is_success() => (
            n.signal.message().to_string(),
            Style::default().bg(Color::Green).fg(Color::Black),
        ),
        Some(n) => (
            n.signal.message().to_string(),
            Style::default().bg(Color::Red).fg(Color::White),
        ),
        None => (
            format!("Ctrl+R run | F2 language | F1 help | Ctrl+Q quit | {}", app.endpoint),
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
    };

    frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_language_selector(frame: &mut Frame, selected: usize) {
    let popup_area = centered_fixed(30, Language::ALL.len() as u16 + 2, frame.area());
    frame.render_widget(Clear, popup_area);

    let items: Vec<ListItem> = Language::ALL
        .iter()
        .enumerate()
        .map(|(i, lang)| ListItem::new(format!("{}  {}", i + 1, lang.display_name())))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Language"))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan))
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, popup_area, &mut state);
}

/// Render help overlay
fn render_help_overlay(frame: &mut Frame) {
    let popup_area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, popup_area);

    let help_lines = vec![
        Line::from("Run:"),
        Line::from("  Ctrl+R / F5  - Execute the editor contents"),
        Line::from("  Esc          - Dismiss notification"),
        Line::from("  Alt+↑/↓      - Scroll output"),
        Line::from(""),
        Line::from("Language:"),
        Line::from("  F2           - Choose language (resets the editor)"),
        Line::from(""),
        Line::from("Editing:"),
        Line::from("  Arrows, Home/End, PgUp/PgDn - Move cursor"),
        Line::from("  Enter / Tab  - Newline / four spaces"),
        Line::from(""),
        Line::from("  F1           - Toggle this help"),
        Line::from("  Ctrl+Q       - Quit"),
    ];

    let help_paragraph = Paragraph::new(Text::from(help_lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help")
                .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_paragraph, popup_area);
}

/// Helper function to create a centered rectangle
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect::new(
        r.x + (r.width - width) / 2,
        r.y + (r.height - height) / 2,
        width,
        height,
    )
}
