//! Terminal host backend.
//!
//! A concrete implementation of the host seams ([`crate::event::InputSource`]
//! and [`crate::runtime::Display`]) over a terminal: a dedicated thread
//! polls crossterm events into bounded channels, and a thin display wrapper
//! owns raw mode, the alternate screen, and frame presentation. This is
//! deliberately minimal plumbing: no cell buffers, no diffing, no
//! emulation. Just enough host for the runtime core to run end to end.

pub mod display;
pub mod input;

pub use display::TerminalDisplay;
pub use input::TerminalInput;
