//! Custom event types for TUI application.

use crossterm::event::KeyEvent;

use crate::execution::Outcome;

/// Events that can occur in the TUI application
#[derive(Debug)]
pub enum TuiEvent {
    /// User keyboard input
    Key(KeyEvent),
    /// Bracketed paste content
    Paste(String),
    /// The in-flight execute request settled
    ExecutionSettled(Outcome),
}
