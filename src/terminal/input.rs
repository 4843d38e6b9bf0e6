//! Terminal input: a polling thread translating crossterm events into raw
//! input records.
//!
//! The thread drains crossterm's event queue and forwards mouse and key
//! records over bounded channels, which the frame thread consumes through
//! the [`InputSource`] implementation. Held buttons are mirrored into an
//! atomic mask so the dispatcher's release-by-absence check never blocks.
//!
//! Mouse rows are reported bottom-origin (`rows - 1 - row`) so that the
//! dispatcher's vertical flip lands back in top-left screen coordinates.

use crate::event::{InputSource, KeyState, MouseButton, RawKeyEvent, RawMouseEvent};
use crate::runtime::ViewportResizeSignal;
use crossbeam_channel::{bounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyEventKind, MouseEventKind};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

const INPUT_THREAD_NAME: &str = "tickshell-input";

/// Terminal-backed input source.
pub struct TerminalInput {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    mouse_rx: Receiver<RawMouseEvent>,
    key_rx: Receiver<RawKeyEvent>,
    held: Arc<AtomicU8>,
}

impl TerminalInput {
    /// Spawn the polling thread.
    ///
    /// Resize events are posted to `resize` rather than queued as input;
    /// the frame loop picks them up at its next frame start.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal size cannot be queried.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the input thread.
    pub fn spawn(resize: Arc<ViewportResizeSignal>) -> io::Result<Self> {
        let (_, rows) = crossterm::terminal::size()?;

        let shutdown = Arc::new(AtomicBool::new(false));
        let held = Arc::new(AtomicU8::new(0));
        // Small buffers; a frame drains everything, so queues never build up.
        let (mouse_tx, mouse_rx) = bounded(64);
        let (key_tx, key_rx) = bounded(64);

        let thread_shutdown = Arc::clone(&shutdown);
        let pump = Pump {
            mouse_tx,
            key_tx,
            resize,
            held: Arc::clone(&held),
            rows: AtomicU32::new(u32::from(rows)),
        };
        let handle = thread::Builder::new()
            .name(INPUT_THREAD_NAME.to_string())
            .spawn(move || {
                run_loop(&pump, &thread_shutdown);
            })
            .expect("Failed to spawn input thread");

        Ok(Self {
            handle: Some(handle),
            shutdown,
            mouse_rx,
            key_rx,
            held,
        })
    }

    /// Signal the polling thread to shut down.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Wait for the polling thread to finish.
    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl InputSource for TerminalInput {
    fn poll_mouse(&mut self) -> Option<RawMouseEvent> {
        self.mouse_rx.try_recv().ok()
    }

    fn poll_key(&mut self) -> Option<RawKeyEvent> {
        self.key_rx.try_recv().ok()
    }

    fn is_button_down(&self, button: MouseButton) -> bool {
        self.held.load(Ordering::Relaxed) & button_bit(button) != 0
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Everything the polling thread writes into.
struct Pump {
    mouse_tx: Sender<RawMouseEvent>,
    key_tx: Sender<RawKeyEvent>,
    resize: Arc<ViewportResizeSignal>,
    held: Arc<AtomicU8>,
    rows: AtomicU32,
}

fn run_loop(pump: &Pump, shutdown: &Arc<AtomicBool>) {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match event::poll(Duration::from_millis(10)) {
            Ok(true) => match event::read() {
                Ok(event) => forward(pump, event),
                Err(error) => log::warn!("Failed to read terminal event: {error}"),
            },
            Ok(false) => {
                // No event; loop to re-check shutdown.
            }
            Err(error) => log::warn!("Failed to poll terminal events: {error}"),
        }
    }
}

fn forward(pump: &Pump, event: Event) {
    match event {
        Event::Key(key) => {
            let Some(record) = convert_key(&key) else {
                return;
            };
            let _ = pump.key_tx.try_send(record);
        }
        Event::Mouse(mouse) => {
            let rows = pump.rows.load(Ordering::Relaxed);
            match mouse.kind {
                MouseEventKind::Down(button) => {
                    let button = convert_button(button);
                    pump.held.fetch_or(button_bit(button), Ordering::Relaxed);
                }
                MouseEventKind::Up(button) => {
                    let button = convert_button(button);
                    pump.held.fetch_and(!button_bit(button), Ordering::Relaxed);
                }
                _ => {}
            }
            let _ = pump.mouse_tx.try_send(convert_mouse(&mouse, rows));
        }
        Event::Resize(cols, rows) => {
            pump.rows.store(u32::from(rows), Ordering::Relaxed);
            pump.resize.post(u32::from(cols), u32::from(rows));
        }
        _ => {}
    }
}

const fn button_bit(button: MouseButton) -> u8 {
    match button.0 {
        0 => 0b001,
        1 => 0b010,
        2 => 0b100,
        _ => 0,
    }
}

const fn convert_button(button: event::MouseButton) -> MouseButton {
    match button {
        event::MouseButton::Left => MouseButton::LEFT,
        event::MouseButton::Right => MouseButton::RIGHT,
        event::MouseButton::Middle => MouseButton::MIDDLE,
    }
}

fn convert_mouse(mouse: &event::MouseEvent, rows: u32) -> RawMouseEvent {
    // Bottom-origin rows; the dispatcher flips back to top-left.
    let flipped = rows.saturating_sub(1).saturating_sub(u32::from(mouse.row));
    let button = match mouse.kind {
        MouseEventKind::Down(b) => Some(convert_button(b)),
        _ => None,
    };
    let wheel = match mouse.kind {
        MouseEventKind::ScrollUp => 1,
        MouseEventKind::ScrollDown => -1,
        _ => 0,
    };
    RawMouseEvent {
        x: i32::from(mouse.column),
        y: i32::try_from(flipped).unwrap_or(0),
        button,
        wheel,
    }
}

fn convert_key(key: &event::KeyEvent) -> Option<RawKeyEvent> {
    let state = match key.kind {
        KeyEventKind::Press => KeyState::Pressed,
        KeyEventKind::Repeat => KeyState::Repeat,
        KeyEventKind::Release => KeyState::Released,
    };
    let (code, ch) = match key.code {
        event::KeyCode::Char(c) => (c as u32, Some(c)),
        event::KeyCode::Backspace => (8, None),
        event::KeyCode::Tab => (9, None),
        event::KeyCode::Enter => (13, Some('\n')),
        event::KeyCode::Esc => (27, None),
        event::KeyCode::PageUp => (33, None),
        event::KeyCode::PageDown => (34, None),
        event::KeyCode::End => (35, None),
        event::KeyCode::Home => (36, None),
        event::KeyCode::Left => (37, None),
        event::KeyCode::Up => (38, None),
        event::KeyCode::Right => (39, None),
        event::KeyCode::Down => (40, None),
        event::KeyCode::Insert => (45, None),
        event::KeyCode::Delete => (46, None),
        event::KeyCode::F(n) => (111 + u32::from(n), None),
        _ => return None,
    };
    Some(RawKeyEvent {
        key: code,
        ch,
        state,
    })
}
