//! Raw input records and the host-facing input source contract.
//!
//! The host owns the real event queue (terminal, windowing system, test
//! harness) and exposes it through [`InputSource`]. The dispatcher drains
//! these records once per frame and synthesizes the higher-level consumer
//! callbacks from them; the records themselves stay deliberately close to
//! the hardware stream.

/// A mouse button identifier.
///
/// Buttons are numbered the way the underlying platform numbers them:
/// 0 = left, 1 = right, 2 = middle, higher values for extra buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseButton(pub u8);

impl MouseButton {
    /// The left (primary) button.
    pub const LEFT: Self = Self(0);
    /// The right (secondary) button.
    pub const RIGHT: Self = Self(1);
    /// The middle button.
    pub const MIDDLE: Self = Self(2);
}

/// One raw mouse record as observed by the host.
///
/// Coordinates are in the host's native convention (origin top-left or
/// bottom-left); the dispatcher flips the vertical axis itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMouseEvent {
    /// Cursor x position at the time of the event.
    pub x: i32,
    /// Cursor y position at the time of the event, in host convention.
    pub y: i32,
    /// The button this event is about, if it is a button event.
    pub button: Option<MouseButton>,
    /// Scroll wheel delta; zero when the wheel did not move.
    pub wheel: i32,
}

/// Key transition carried by a [`RawKeyEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    /// Initial key-down.
    Pressed,
    /// Auto-repeat while held.
    Repeat,
    /// Key-up. Not dispatched to consumers, but hosts report it so the
    /// record stream stays complete.
    Released,
}

/// One raw keyboard record as observed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Platform key code.
    pub key: u32,
    /// Printable character for this key, if any.
    pub ch: Option<char>,
    /// Which transition this record describes.
    pub state: KeyState,
}

/// Buffered, polled input as supplied by the host.
///
/// `poll_*` drain one record at a time in arrival order and return `None`
/// when the queue is empty for this frame. None of these calls may block.
pub trait InputSource {
    /// Next queued mouse record, if any.
    fn poll_mouse(&mut self) -> Option<RawMouseEvent>;

    /// Next queued keyboard record, if any.
    fn poll_key(&mut self) -> Option<RawKeyEvent>;

    /// Whether the given button is held down right now.
    ///
    /// Queried by the dispatcher after each mouse record to detect
    /// releases by absence rather than by a matching up-event.
    fn is_button_down(&self, button: MouseButton) -> bool;
}
