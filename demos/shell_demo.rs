//! Minimal end-to-end demo: one window entity ticking at 20 Hz, drawn and
//! fed input by the frame loop over the terminal host backend.
//!
//! Run with `cargo run --example shell_demo`; press Esc to quit.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use tickshell::terminal::{TerminalDisplay, TerminalInput};
use tickshell::{
    EmulatorContext, FrameOrchestrator, InputConsumer, MouseButton, RenderContext, Rendered,
    Ticking, Window,
};

const KEY_ESC: u32 = 27;

/// A toy window that shows tick progress and the latest input it saw.
struct DemoWindow {
    ctx: EmulatorContext,
    ticks: AtomicU64,
    focus: AtomicBool,
    visible: AtomicBool,
    last_key: AtomicU32,
    pointer_x: AtomicI32,
    pointer_y: AtomicI32,
}

impl DemoWindow {
    fn new(ctx: EmulatorContext) -> Arc<Self> {
        Arc::new(Self {
            ctx,
            ticks: AtomicU64::new(0),
            focus: AtomicBool::new(false),
            visible: AtomicBool::new(true),
            last_key: AtomicU32::new(0),
            pointer_x: AtomicI32::new(0),
            pointer_y: AtomicI32::new(0),
        })
    }
}

impl Ticking for DemoWindow {
    fn on_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

impl Rendered for DemoWindow {
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

    fn draw(&self, ctx: &mut dyn RenderContext) {
        if !self.is_visible() {
            return;
        }
        let (cols, _) = ctx.viewport();
        let mut line = format!(
            "ticks: {}  last key: {}  pointer: {},{}  (Esc quits)",
            self.ticks.load(Ordering::Relaxed),
            self.last_key.load(Ordering::Relaxed),
            self.pointer_x.load(Ordering::Relaxed),
            self.pointer_y.load(Ordering::Relaxed),
        );
        line.truncate(cols as usize);
        ctx.draw_text(0, 0, &line);
    }
}

impl InputConsumer for DemoWindow {
    fn on_key_pressed(&self, key: u32, _ch: Option<char>) {
        self.last_key.store(key, Ordering::Relaxed);
        if key == KEY_ESC {
            self.ctx.stop();
        }
    }

    fn on_mouse_moved(&self, x: i32, y: i32) {
        self.pointer_x.store(x, Ordering::Relaxed);
        self.pointer_y.store(y, Ordering::Relaxed);
    }

    fn on_mouse_click(&self, x: i32, y: i32, _button: MouseButton) {
        self.pointer_x.store(x, Ordering::Relaxed);
        self.pointer_y.store(y, Ordering::Relaxed);
    }

    fn on_mouse_release(&self, _x: i32, _y: i32, _button: MouseButton) {}

    fn on_mouse_scrolled(&self, _x: i32, _y: i32, _delta: i32) {}

    fn was_click_in_bounds(&self, _x: i32, _y: i32) -> bool {
        true
    }
}

impl Window for DemoWindow {}

fn main() -> io::Result<()> {
    env_logger::init();

    let ctx = EmulatorContext::default();
    let mut shell = FrameOrchestrator::new(ctx.clone());

    let window = DemoWindow::new(ctx);
    let as_window: Arc<dyn Window> = window.clone();
    let as_consumer: Arc<dyn InputConsumer> = window.clone();
    let as_ticking: Arc<dyn Ticking> = window.clone();
    shell.windows().register(as_window);
    shell.input().register(as_consumer);
    shell.scheduler().register(as_ticking);

    let mut display = TerminalDisplay::new()?;
    let mut input = TerminalInput::spawn(shell.resize_signal())?;

    shell.run(&mut display, &mut input);
    input.join();
    Ok(())
}
