//! Frame orchestration: the render/input loop on the calling thread.
//!
//! One iteration per frame: apply any pending viewport resize, clear,
//! draw windows, draw overlays, present, drain input, then sleep to the
//! frame budget. The orchestrator also owns the tick scheduler's lifetime:
//! it spawns the tick thread on construction and joins it (bounded) during
//! shutdown.
//!
//! A panic escaping the frame body is reported as fatal with a truncated
//! backtrace and ends the session with an orderly teardown; it never
//! silently repeats and never produces a crash dump.

use crate::entity::{RenderContext, Rendered};
use crate::event::InputSource;
use crate::manager::{InputDispatcher, Registry, TickScheduler, WindowCoordinator};
use crate::runtime::report::{fatal, panic_message};
use crate::runtime::signal::ViewportResizeSignal;
use crate::runtime::EmulatorContext;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Host display services consumed by the frame loop.
///
/// Implementations own the real surface (terminal, GL context, test
/// double); the orchestrator only ever touches this interface. All calls
/// are treated as fast and synchronous.
pub trait Display: RenderContext {
    /// Apply a new drawable size before the next frame renders.
    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear the frame buffer.
    fn clear(&mut self);

    /// Present the completed frame.
    fn present(&mut self) -> std::io::Result<()>;

    /// Whether the host asked for the session to end (window close,
    /// terminal hangup).
    fn close_requested(&self) -> bool {
        false
    }
}

/// The outer per-frame loop tying the managers together.
pub struct FrameOrchestrator {
    ctx: EmulatorContext,
    scheduler: TickScheduler,
    windows: WindowCoordinator,
    rendered: Registry<dyn Rendered>,
    input: InputDispatcher,
    resize: Arc<ViewportResizeSignal>,
    frame_count: u64,
}

impl FrameOrchestrator {
    /// Create the orchestrator and start the background tick thread.
    pub fn new(ctx: EmulatorContext) -> Self {
        let scheduler = TickScheduler::spawn(ctx.clone());
        Self {
            ctx,
            scheduler,
            windows: WindowCoordinator::new(),
            rendered: Registry::new("Render"),
            input: InputDispatcher::new(),
            resize: Arc::new(ViewportResizeSignal::new()),
            frame_count: 0,
        }
    }

    /// The shared runtime context.
    pub fn context(&self) -> &EmulatorContext {
        &self.ctx
    }

    /// The window coordinator.
    pub fn windows(&mut self) -> &mut WindowCoordinator {
        &mut self.windows
    }

    /// The registry of non-window rendered entities. These always draw
    /// above all windows.
    pub fn rendered(&mut self) -> &mut Registry<dyn Rendered> {
        &mut self.rendered
    }

    /// The input dispatcher.
    pub fn input(&mut self) -> &mut InputDispatcher {
        &mut self.input
    }

    /// The tick scheduler, for registering and invalidating ticking
    /// entities from any thread.
    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    /// Handle for posting resize notifications from UI callbacks.
    pub fn resize_signal(&self) -> Arc<ViewportResizeSignal> {
        Arc::clone(&self.resize)
    }

    /// Frames rendered so far.
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Run the frame loop until stopped, then tear down.
    ///
    /// The loop exits when the context is stopped or the display requests
    /// close. A panic escaping the frame body is reported as fatal and
    /// followed by the same orderly teardown.
    pub fn run<D: Display, S: InputSource>(mut self, display: &mut D, source: &mut S) {
        log::info!("Shell started");
        let frame_budget = Duration::from_secs(1) / self.ctx.config().target_fps.max(1);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            while self.ctx.is_running() && !display.close_requested() {
                self.frame(display, source, frame_budget);
            }
        }));
        if let Err(payload) = outcome {
            fatal(&format!(
                "Exception in graphics/input loop: {}",
                panic_message(payload.as_ref())
            ));
        }

        self.shutdown();
    }

    /// One frame: resize, clear, windows, overlays, present, input, pace.
    fn frame<D: Display, S: InputSource>(
        &mut self,
        display: &mut D,
        source: &mut S,
        frame_budget: Duration,
    ) {
        let frame_start = Instant::now();

        // Pending resize is applied before anything draws this frame.
        if let Some((width, height)) = self.resize.take() {
            log::debug!("Canvas has been re-sized to W: {width} H: {height}");
            display.set_viewport(width, height);
        }

        display.clear();
        self.windows.render_all(display);
        self.render_overlays(display);

        if let Err(error) = display.present() {
            fatal(&format!("Failed to present frame: {error}"));
            self.ctx.stop();
            return;
        }
        self.frame_count += 1;

        let height = i32::try_from(display.viewport().1).unwrap_or(i32::MAX);
        self.input.poll_and_dispatch(source, height);

        let elapsed = frame_start.elapsed();
        if elapsed < frame_budget {
            std::thread::sleep(frame_budget - elapsed);
        }
    }

    /// Draw non-window entities in registration order, containing faults
    /// per entity like every other callback boundary.
    fn render_overlays(&self, ctx: &mut dyn RenderContext) {
        for entity in &self.rendered {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| entity.draw(ctx))) {
                log::error!(
                    "Rendered entity {:p} panicked during draw: {}",
                    Arc::as_ptr(entity),
                    panic_message(payload.as_ref())
                );
            }
        }
    }

    /// Orderly teardown: stop both loops, dispose windows, join the tick
    /// thread with the configured bound.
    pub fn shutdown(mut self) {
        log::info!("Shutting down the shell...");
        self.ctx.stop();
        for window in self.windows.registered() {
            window.on_destroy();
        }
        self.scheduler.join(self.ctx.config().tick_join_timeout);
    }
}
