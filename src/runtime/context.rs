//! Shell configuration and the shared runtime context.
//!
//! The context replaces any ambient global state: it is constructed once at
//! process start and handed (cheaply cloned) to the orchestrator, the tick
//! scheduler, and anything else that needs the running flag, the clock, or
//! the configuration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Configuration for the shell runtime.
#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    /// Target tick period (50 ms gives the nominal 20 Hz simulation rate).
    pub tick_interval: Duration,
    /// Gap between cycle starts beyond which a slow-tick warning is logged.
    pub slow_tick_threshold: Duration,
    /// Frame rate cap for the frame loop.
    pub target_fps: u32,
    /// How long shutdown waits for the tick thread before detaching it.
    pub tick_join_timeout: Duration,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(50),
            slow_tick_threshold: Duration::from_millis(80),
            target_fps: 60,
            tick_join_timeout: Duration::from_millis(250),
        }
    }
}

/// Monotonic millisecond clock anchored at context creation.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    epoch: Instant,
}

impl Clock {
    /// Create a clock anchored at "now".
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    /// Milliseconds elapsed since the clock was created.
    pub fn millis(&self) -> u64 {
        u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared runtime handle: running flag, clock, and configuration.
///
/// Clones share the same running flag and clock; `stop` on any clone is
/// observed by every loop's continuation predicate.
#[derive(Clone)]
pub struct EmulatorContext {
    running: Arc<AtomicBool>,
    clock: Clock,
    config: Arc<EmulatorConfig>,
}

impl EmulatorContext {
    /// Create a running context with the given configuration.
    pub fn new(config: EmulatorConfig) -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
            clock: Clock::new(),
            config: Arc::new(config),
        }
    }

    /// Whether the shell should keep running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Request a cooperative stop of every loop observing this context.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Monotonic milliseconds since the context was created.
    pub fn millis(&self) -> u64 {
        self.clock.millis()
    }

    /// The shell configuration.
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }
}

impl Default for EmulatorContext {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_visible_across_clones() {
        let ctx = EmulatorContext::default();
        let other = ctx.clone();

        assert!(other.is_running());
        ctx.stop();
        assert!(!other.is_running());
    }

    #[test]
    fn test_clock_monotonic() {
        let clock = Clock::new();
        let first = clock.millis();
        std::thread::sleep(Duration::from_millis(2));
        assert!(clock.millis() >= first);
    }
}
