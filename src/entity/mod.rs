//! Capability traits implemented by emulated entities.
//!
//! An entity is anything the shell tracks: a window, an overlay, an input
//! consumer, a simulated device. Rather than a base-class hierarchy, each
//! behavior is an independent trait and an entity implements whichever
//! subset it needs. [`Window`] composes the other three.
//!
//! Entities are shared as `Arc<dyn Trait>` between the tick thread and the
//! frame thread, so every trait is `Send + Sync` and all callbacks take
//! `&self`; entities own their interior mutability. Identity is reference
//! identity: two handles name the same entity iff they share an allocation
//! (see [`same_entity`]).

use std::sync::Arc;

/// An entity that receives periodic simulation updates from the tick thread.
pub trait Ticking: Send + Sync {
    /// Invoked once per tick cycle, in registration order.
    ///
    /// Runs on the tick thread while the tick-set lock is held; it must not
    /// call back into the scheduler. A panic here is contained and logged by
    /// the scheduler, never propagated.
    fn on_tick(&self);
}

/// An entity that receives raw input events from the frame thread.
///
/// The dispatcher performs no filtering: every consumer sees every event and
/// decides relevance for itself via [`InputConsumer::was_click_in_bounds`].
pub trait InputConsumer: Send + Sync {
    /// A key was pressed (or auto-repeated).
    fn on_key_pressed(&self, key: u32, ch: Option<char>);

    /// The cursor moved to a new position.
    fn on_mouse_moved(&self, x: i32, y: i32);

    /// A mouse button was pressed.
    fn on_mouse_click(&self, x: i32, y: i32, button: crate::event::MouseButton);

    /// The previously pressed mouse button was released.
    fn on_mouse_release(&self, x: i32, y: i32, button: crate::event::MouseButton);

    /// The mouse wheel was scrolled; `delta` is positive for up.
    fn on_mouse_scrolled(&self, x: i32, y: i32, delta: i32);

    /// Whether a click at the given position falls within this consumer's
    /// bounds. Consumers use this in their own handlers; the dispatcher
    /// never calls it.
    fn was_click_in_bounds(&self, x: i32, y: i32) -> bool;
}

/// The narrow drawing seam entities render through.
///
/// Concrete render state (projection, buffers, terminal handles) lives in
/// the host's [`crate::runtime::Display`]; entities only see this view.
pub trait RenderContext {
    /// Current drawable size as `(width, height)`.
    fn viewport(&self) -> (u32, u32);

    /// Draw a line of text with its origin at `(x, y)`, in surface cells.
    ///
    /// The text becomes visible when the owning display presents the
    /// frame. Hosts without a text surface ignore the call.
    fn draw_text(&mut self, x: u32, y: u32, text: &str) {
        let _ = (x, y, text);
    }
}

/// A drawable entity with focus and visibility state.
pub trait Rendered: Send + Sync {
    /// Whether this entity currently has logical focus.
    fn has_focus(&self) -> bool;

    /// Grant or revoke logical focus.
    fn set_focus(&self, focus: bool);

    /// Whether this entity should be drawn.
    fn is_visible(&self) -> bool;

    /// Show or hide this entity.
    fn set_visible(&self, visible: bool);

    /// Draw this entity. Invoked once per frame by the owning manager;
    /// invisible entities are expected to early-return themselves.
    fn draw(&self, ctx: &mut dyn RenderContext);
}

/// A top-level window: drawable, input-consuming, ticking, with lifecycle
/// hooks. All hooks default to no-ops; concrete windows override what they
/// need.
pub trait Window: Rendered + InputConsumer + Ticking {
    /// The window transitioned from hidden to shown.
    fn on_show(&self) {}

    /// The window transitioned from shown to hidden.
    fn on_hide(&self) {}

    /// The window was created and registered.
    fn on_create(&self) {}

    /// The window was unregistered and is about to be disposed.
    fn on_destroy(&self) {}

    /// The window was resized to the given dimensions.
    fn on_resize(&self, width: u32, height: u32) {
        let _ = (width, height);
    }
}

/// Whether two handles refer to the same entity allocation.
///
/// Compares data pointers only, ignoring vtable metadata, so the same
/// entity viewed through the same trait always compares equal regardless of
/// how the `Arc` was unsized.
pub fn same_entity<T: ?Sized>(a: &Arc<T>, b: &Arc<T>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter;

    impl Ticking for Counter {
        fn on_tick(&self) {}
    }

    #[test]
    fn test_same_entity_identity() {
        let a: Arc<dyn Ticking> = Arc::new(Counter);
        let b = Arc::clone(&a);
        let c: Arc<dyn Ticking> = Arc::new(Counter);

        assert!(same_entity(&a, &b));
        assert!(!same_entity(&a, &c));
    }
}
