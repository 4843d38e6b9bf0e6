//! Input manager: drains raw host records and fans them out to consumers.
//!
//! Once per frame the dispatcher pulls every buffered mouse record, then
//! every buffered keyboard record, in arrival order, and synthesizes the
//! consumer callbacks from tracked pointer state. Every registered consumer
//! sees every callback in registration order; relevance filtering is the
//! consumer's own job.
//!
//! Release detection works by absence: a release fires when the tracked
//! button is no longer held at the time a later record is processed, not
//! when a matching up-event arrives. A click and its release can therefore
//! land on different poll cycles.

use crate::entity::InputConsumer;
use crate::event::{InputSource, KeyState, MouseButton, RawMouseEvent};
use crate::manager::registry::Registry;
use crate::runtime::report::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Pointer bookkeeping owned by the dispatcher, updated once per record.
#[derive(Debug, Clone, Copy, Default)]
struct PointerState {
    last_x: i32,
    last_y: i32,
    button: Option<MouseButton>,
}

/// Fans raw input out to every registered [`InputConsumer`].
pub struct InputDispatcher {
    consumers: Registry<dyn InputConsumer>,
    pointer: PointerState,
}

impl InputDispatcher {
    /// Create a dispatcher with no consumers.
    pub const fn new() -> Self {
        Self {
            consumers: Registry::new("Input"),
            pointer: PointerState {
                last_x: 0,
                last_y: 0,
                button: None,
            },
        }
    }

    /// Register an input consumer.
    pub fn register(&mut self, consumer: Arc<dyn InputConsumer>) -> bool {
        self.consumers.register(consumer)
    }

    /// Unregister an input consumer.
    pub fn unregister(&mut self, consumer: &Arc<dyn InputConsumer>) -> bool {
        self.consumers.unregister(consumer)
    }

    /// Snapshot of registered consumers in insertion order.
    pub fn registered(&self) -> Vec<Arc<dyn InputConsumer>> {
        self.consumers.registered()
    }

    /// Drain and dispatch all buffered input for this frame.
    ///
    /// Mouse records are processed first, then keyboard records, each group
    /// in arrival order. `surface_height` is the current drawable height,
    /// used to flip the vertical axis into the dispatcher's top-left
    /// convention.
    pub fn poll_and_dispatch(&mut self, source: &mut dyn InputSource, surface_height: i32) {
        while let Some(event) = source.poll_mouse() {
            self.handle_mouse(&event, source, surface_height);
        }
        while let Some(event) = source.poll_key() {
            if matches!(event.state, KeyState::Pressed | KeyState::Repeat) {
                self.fan_out(|consumer| consumer.on_key_pressed(event.key, event.ch));
            }
        }
    }

    /// One unified decision per raw mouse record; may emit zero or more of
    /// the four mouse callbacks.
    fn handle_mouse(&mut self, event: &RawMouseEvent, source: &dyn InputSource, height: i32) {
        let x = event.x;
        let y = height - event.y - 1;

        if let Some(button) = event.button {
            if self.pointer.button != Some(button) {
                self.pointer.button = Some(button);
                self.fan_out(|consumer| consumer.on_mouse_click(x, y, button));
            }
        }

        if let Some(tracked) = self.pointer.button {
            if !source.is_button_down(tracked) {
                self.pointer.button = None;
                self.fan_out(|consumer| consumer.on_mouse_release(x, y, tracked));
            }
        }

        if self.pointer.last_x != x || self.pointer.last_y != y {
            self.pointer.last_x = x;
            self.pointer.last_y = y;
            self.fan_out(|consumer| consumer.on_mouse_moved(x, y));
        }

        if event.wheel != 0 {
            let delta = event.wheel;
            self.fan_out(|consumer| consumer.on_mouse_scrolled(x, y, delta));
        }
    }

    /// Invoke a callback on every consumer in registration order,
    /// containing panics per consumer.
    fn fan_out<F>(&self, callback: F)
    where
        F: Fn(&dyn InputConsumer),
    {
        for consumer in &self.consumers {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| callback(consumer.as_ref()))) {
                log::error!(
                    "Input consumer {:p} panicked during dispatch: {}",
                    Arc::as_ptr(consumer),
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}
