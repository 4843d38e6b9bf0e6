//! Terminal display: raw mode, alternate screen, and frame presentation.
//!
//! Owns the terminal for the lifetime of the session and restores it on
//! drop, mirroring the usual enter/leave pairing. Drawing is left to the
//! entities; this wrapper only clears, presents, and tracks the viewport.

use crate::entity::RenderContext;
use crate::runtime::Display;
use crossterm::{cursor, event, execute, queue, style, terminal};
use std::io::{self, Stdout, Write};

/// Terminal-backed display surface.
pub struct TerminalDisplay {
    stdout: Stdout,
    size: (u32, u32),
}

impl TerminalDisplay {
    /// Take over the terminal: raw mode, alternate screen, mouse capture,
    /// hidden cursor.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup fails.
    pub fn new() -> io::Result<Self> {
        let (cols, rows) = terminal::size()?;

        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            event::EnableMouseCapture,
            cursor::Hide
        )?;

        Ok(Self {
            stdout,
            size: (u32::from(cols), u32::from(rows)),
        })
    }
}

impl RenderContext for TerminalDisplay {
    fn viewport(&self) -> (u32, u32) {
        self.size
    }

    fn draw_text(&mut self, x: u32, y: u32, text: &str) {
        let column = u16::try_from(x).unwrap_or(u16::MAX);
        let row = u16::try_from(y).unwrap_or(u16::MAX);
        // Queued, not executed; present() flushes the whole frame at once.
        let _ = queue!(
            self.stdout,
            cursor::MoveTo(column, row),
            style::Print(text)
        );
    }
}

impl Display for TerminalDisplay {
    fn set_viewport(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn clear(&mut self) {
        let _ = execute!(self.stdout, terminal::Clear(terminal::ClearType::All));
    }

    fn present(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        // Restore terminal state best-effort; the session is over.
        let _ = execute!(
            self.stdout,
            cursor::Show,
            event::DisableMouseCapture,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
