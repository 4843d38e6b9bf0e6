//! Window manager: ordered window set with focus handling.
//!
//! Registering a window activates it immediately, so the newest window
//! always comes up focused. Activation enforces single-focus as an
//! invariant: every other registered window is defocused first. Windows
//! render in registration order; z-order-correct stacking is presentation
//! policy the device layer owns, not this coordinator.

use crate::entity::{same_entity, RenderContext, Window};
use crate::manager::registry::Registry;
use crate::runtime::report::panic_message;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Manages the ordered set of on-screen windows.
pub struct WindowCoordinator {
    windows: Registry<dyn Window>,
}

impl WindowCoordinator {
    /// Create a coordinator with no windows.
    pub const fn new() -> Self {
        Self {
            windows: Registry::new("Window"),
        }
    }

    /// Register a window, fire its create hook, and bring it into focus.
    ///
    /// The side effects happen only when the base registration succeeds; a
    /// duplicate register warns and changes nothing.
    pub fn register(&mut self, window: Arc<dyn Window>) -> bool {
        if self.windows.register(Arc::clone(&window)) {
            window.on_create();
            self.activate(&window);
            return true;
        }
        false
    }

    /// Unregister a window, firing its destroy hook.
    pub fn unregister(&mut self, window: &Arc<dyn Window>) -> bool {
        if self.windows.unregister(window) {
            window.on_destroy();
            return true;
        }
        false
    }

    /// Bring a window to logical focus, defocusing all others.
    ///
    /// Idempotent, and safe to call for an unregistered window (only that
    /// window's focus flag is touched in that case).
    pub fn activate(&mut self, window: &Arc<dyn Window>) {
        for other in &self.windows {
            if !same_entity(other, window) && other.has_focus() {
                other.set_focus(false);
            }
        }
        window.set_focus(true);
    }

    /// The focused window, if any.
    pub fn focused(&self) -> Option<Arc<dyn Window>> {
        self.windows.iter().find(|w| w.has_focus()).cloned()
    }

    /// Snapshot of registered windows in insertion order.
    pub fn registered(&self) -> Vec<Arc<dyn Window>> {
        self.windows.registered()
    }

    /// Number of registered windows.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Whether no windows are registered.
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Draw every window in registration order.
    ///
    /// A panicking draw callback is contained and logged; the remaining
    /// windows still render this frame.
    pub fn render_all(&self, ctx: &mut dyn RenderContext) {
        for window in &self.windows {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| window.draw(ctx))) {
                log::error!(
                    "Window {:p} panicked during draw: {}",
                    Arc::as_ptr(window),
                    panic_message(payload.as_ref())
                );
            }
        }
    }
}

impl Default for WindowCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Rendered;
    use crate::event::MouseButton;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    struct TestWindow {
        focus: AtomicBool,
        visible: AtomicBool,
        draws: AtomicU32,
        created: AtomicBool,
        destroyed: AtomicBool,
    }

    impl TestWindow {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                focus: AtomicBool::new(false),
                visible: AtomicBool::new(true),
                draws: AtomicU32::new(0),
                created: AtomicBool::new(false),
                destroyed: AtomicBool::new(false),
            })
        }
    }

    impl crate::entity::Rendered for TestWindow {
        fn has_focus(&self) -> bool {
            self.focus.load(Ordering::Relaxed)
        }
        fn set_focus(&self, focus: bool) {
            self.focus.store(focus, Ordering::Relaxed);
        }
        fn is_visible(&self) -> bool {
            self.visible.load(Ordering::Relaxed)
        }
        fn set_visible(&self, visible: bool) {
            self.visible.store(visible, Ordering::Relaxed);
        }
        fn draw(&self, _ctx: &mut dyn RenderContext) {
            self.draws.fetch_add(1, Ordering::Relaxed);
        }
    }

    impl crate::entity::InputConsumer for TestWindow {
        fn on_key_pressed(&self, _key: u32, _ch: Option<char>) {}
        fn on_mouse_moved(&self, _x: i32, _y: i32) {}
        fn on_mouse_click(&self, _x: i32, _y: i32, _button: MouseButton) {}
        fn on_mouse_release(&self, _x: i32, _y: i32, _button: MouseButton) {}
        fn on_mouse_scrolled(&self, _x: i32, _y: i32, _delta: i32) {}
        fn was_click_in_bounds(&self, _x: i32, _y: i32) -> bool {
            true
        }
    }

    impl crate::entity::Ticking for TestWindow {
        fn on_tick(&self) {}
    }

    impl Window for TestWindow {
        fn on_create(&self) {
            self.created.store(true, Ordering::Relaxed);
        }

        fn on_destroy(&self) {
            self.destroyed.store(true, Ordering::Relaxed);
        }
    }

    struct NullContext;

    impl RenderContext for NullContext {
        fn viewport(&self) -> (u32, u32) {
            (0, 0)
        }
    }

    #[test]
    fn test_register_focuses_new_window() {
        let mut coordinator = WindowCoordinator::new();
        let first = TestWindow::new();
        let second = TestWindow::new();

        let a: Arc<dyn Window> = first.clone();
        let b: Arc<dyn Window> = second.clone();
        assert!(coordinator.register(a));
        assert!(first.created.load(Ordering::Relaxed));
        assert!(first.has_focus());

        assert!(coordinator.register(b));
        assert!(second.has_focus());
        assert!(!first.has_focus());
    }

    #[test]
    fn test_duplicate_register_has_no_side_effect() {
        let mut coordinator = WindowCoordinator::new();
        let first = TestWindow::new();
        let second = TestWindow::new();
        let a: Arc<dyn Window> = first.clone();
        let b: Arc<dyn Window> = second.clone();
        coordinator.register(Arc::clone(&a));
        coordinator.register(b);

        // Re-registering the first window fails and must not steal focus.
        assert!(!coordinator.register(a));
        assert_eq!(coordinator.len(), 2);
        assert!(second.has_focus());
        assert!(!first.has_focus());
    }

    #[test]
    fn test_activate_is_idempotent_and_exclusive() {
        let mut coordinator = WindowCoordinator::new();
        let first = TestWindow::new();
        let second = TestWindow::new();
        let a: Arc<dyn Window> = first.clone();
        let b: Arc<dyn Window> = second.clone();
        coordinator.register(Arc::clone(&a));
        coordinator.register(b);

        coordinator.activate(&a);
        coordinator.activate(&a);

        assert!(first.has_focus());
        assert!(!second.has_focus());
        let focused = coordinator.focused().expect("one focused window");
        assert!(same_entity(&focused, &a));
    }

    #[test]
    fn test_render_all_draws_each_window() {
        let mut coordinator = WindowCoordinator::new();
        let first = TestWindow::new();
        let second = TestWindow::new();
        let a: Arc<dyn Window> = first.clone();
        let b: Arc<dyn Window> = second.clone();
        coordinator.register(a);
        coordinator.register(b);

        coordinator.render_all(&mut NullContext);

        assert_eq!(first.draws.load(Ordering::Relaxed), 1);
        assert_eq!(second.draws.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_unregister_fires_destroy_hook() {
        let mut coordinator = WindowCoordinator::new();
        let window = TestWindow::new();
        let handle: Arc<dyn Window> = window.clone();
        coordinator.register(Arc::clone(&handle));

        assert!(coordinator.unregister(&handle));
        assert!(window.destroyed.load(Ordering::Relaxed));
        assert!(coordinator.is_empty());
    }
}
