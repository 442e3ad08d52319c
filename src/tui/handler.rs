//! Async event loop for the interactive editor.

use std::io;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use log::{debug, info};
use ratatui::prelude::*;
use tokio::sync::mpsc;

use crate::{execution, language::Language, piston::PistonClient};
use super::{app::App, events::TuiEvent, ui::render_ui};

/// Run the interactive editor until the user quits.
pub async fn run_tui(client: PistonClient, language: Language, notification_ttl: Duration) -> Result<()> {
    if !io::IsTerminal::is_terminal(&io::stdout()) {
        return Err(anyhow::anyhow!("interactive mode requires a terminal; use --run FILE instead"));
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(language, client.endpoint().to_string(), notification_ttl);
    info!("editor started: language={} endpoint={}", language, client.endpoint());

    let result = run_app(&mut terminal, &mut app, client).await;

    // Restore terminal
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

/// Main application loop
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: PistonClient,
) -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<TuiEvent>();

    // Spawn input handler; it exits once the loop below drops the receiver.
    let input_tx = event_tx.clone();
    tokio::task::spawn_blocking(move || {
        while !input_tx.is_closed() {
            if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                continue;
            }
            let ev = match event::read() {
                Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => TuiEvent::Key(key),
                Ok(Event::Paste(text)) => TuiEvent::Paste(text),
                _ => continue,
            };
            if input_tx.send(ev).is_err() {
                break; // Channel closed
            }
        }
    });

    loop {
        terminal.draw(|frame| render_ui(frame, app))?;

        while let Ok(tui_event) = event_rx.try_recv() {
            match tui_event {
                TuiEvent::Key(key) => {
                    if handle_key_event(app, key, &client, &event_tx) {
                        return Ok(());
                    }
                }
                TuiEvent::Paste(text) => {
                    if app.selector.is_none() {
                        app.insert_str(&text);
                    }
                }
                TuiEvent::ExecutionSettled(outcome) => {
                    app.finish_execution(outcome);
                }
            }
        }

        app.tick(Instant::now());

        // Small delay to prevent busy waiting
        tokio::time::sleep(Duration::from_millis(16)).await;
    }
}

/// Dispatch the current source without blocking the loop; the result comes back as an event.
fn spawn_execution(app: &mut App, client: &PistonClient, event_tx: &mpsc::UnboundedSender<TuiEvent>) {
    let Some(submission) = app.begin_execution() else {
        debug!("execute ignored: request already in flight");
        return;
    };
    let client = client.clone();
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let outcome = execution::run(&client, &submission).await;
        let _ = tx.send(TuiEvent::ExecutionSettled(outcome));
    });
}

/// Handle keyboard events. Returns true when the user asked to quit.
fn handle_key_event(
    app: &mut App,
    key: KeyEvent,
    client: &PistonClient,
    event_tx: &mpsc::UnboundedSender<TuiEvent>,
) -> bool {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    if ctrl && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q')) {
        return true;
    }

    // Help overlay: any key closes it
    if app.show_help {
        app.toggle_help();
        return false;
    }

    if app.selector.is_some() {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.selector_up(),
            KeyCode::Down | KeyCode::Char('j') => app.selector_down(),
            KeyCode::Enter => app.confirm_selector(),
            KeyCode::Esc | KeyCode::F(2) => app.close_selector(),
            KeyCode::Char(c @ '1'..='4') => {
                app.pick_language(Language::ALL[c as usize - '1' as usize]);
                app.close_selector();
            }
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('r') if ctrl => spawn_execution(app, client, event_tx),
        KeyCode::F(5) => spawn_execution(app, client, event_tx),
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(2) => app.open_selector(),
        KeyCode::Esc => app.dismiss_notification(),
        KeyCode::Up if alt => app.scroll_output_up(),
        KeyCode::Down if alt => app.scroll_output_down(),
        KeyCode::Up => app.move_cursor_up(),
        KeyCode::Down => app.move_cursor_down(),
        KeyCode::Left => app.move_cursor_left(),
        KeyCode::Right => app.move_cursor_right(),
        KeyCode::Home => app.move_cursor_home(),
        KeyCode::End => app.move_cursor_end(),
        KeyCode::PageUp => app.page_up(),
        KeyCode::PageDown => app.page_down(),
        KeyCode::Enter => app.insert_newline(),
        KeyCode::Tab => app.insert_tab(),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Char(c) if !ctrl && !alt => app.insert_char(c),
        _ => {}
    }

    false
}
