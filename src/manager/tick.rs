//! Tick manager: the ticking set and its background scheduler.
//!
//! The scheduler owns a dedicated thread that runs one tick pass over every
//! registered [`Ticking`] entity at a bounded cadence (50 ms budget, 20 Hz
//! nominal), independent of the frame loop. The tick set lives behind a
//! mutex the scheduler holds for the full pass; registration calls from
//! other threads block until the in-flight pass releases it, so at most one
//! pass is ever running and no entity is ticked concurrently with its own
//! registration mutation.
//!
//! A pass is never batched to catch up after lag: if processing blows the
//! budget the scheduler simply skips its sleep and logs a slow-tick
//! warning. A panicking entity is contained, logged, and counted; the pass
//! moves on to the next entity.

use crate::entity::Ticking;
use crate::manager::registry::Registry;
use crate::runtime::report::panic_message;
use crate::runtime::EmulatorContext;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const TICK_THREAD_NAME: &str = "tickshell-tick";

/// Registry of ticking entities plus a per-entity advisory dirty flag.
///
/// The dirty flag is bookkeeping for callers that want to know "has this
/// entity ticked since I last flagged it"; it never gates scheduling. It
/// defaults to `false` on registration and is cleared right after the
/// entity's own callback returns each cycle.
pub struct TickSet {
    items: Registry<dyn Ticking>,
    dirty: Vec<bool>,
}

impl TickSet {
    /// Create an empty tick set.
    pub const fn new() -> Self {
        Self {
            items: Registry::new("Tick"),
            dirty: Vec::new(),
        }
    }

    /// Register an entity with a clear dirty flag.
    ///
    /// Duplicate registration warns and returns `false`.
    pub fn register(&mut self, entity: Arc<dyn Ticking>) -> bool {
        if self.items.register(entity) {
            self.dirty.push(false);
            return true;
        }
        false
    }

    /// Unregister an entity and discard its dirty flag.
    ///
    /// Unknown entities warn and return `false`.
    pub fn unregister(&mut self, entity: &Arc<dyn Ticking>) -> bool {
        match self.items.position(entity) {
            Some(index) => {
                self.items.unregister(entity);
                self.dirty.remove(index);
                true
            }
            // delegate for the symmetric warning
            None => self.items.unregister(entity),
        }
    }

    /// Set the dirty flag on a registered entity.
    ///
    /// Invalidating an unknown entity is reported as a warning but never
    /// fails the caller.
    pub fn invalidate(&mut self, entity: &Arc<dyn Ticking>) {
        match self.items.position(entity) {
            Some(index) => self.dirty[index] = true,
            None => log::warn!(
                "Attempting to invalidate {:p} with the Tick manager when it was not registered",
                Arc::as_ptr(entity)
            ),
        }
    }

    /// Read an entity's dirty flag; unknown entities read as clean.
    pub fn is_dirty(&self, entity: &Arc<dyn Ticking>) -> bool {
        self.items
            .position(entity)
            .is_some_and(|index| self.dirty[index])
    }

    /// Snapshot of registered entities in insertion order.
    pub fn registered(&self) -> Vec<Arc<dyn Ticking>> {
        self.items.registered()
    }

    /// Number of registered entities.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Tick every registered entity in insertion order.
    ///
    /// Each entity's dirty flag is cleared after (never before) its own
    /// callback returns. A panicking callback is logged and counted; the
    /// pass continues. Returns the number of contained faults.
    fn run_pass(&mut self) -> u64 {
        let mut faults = 0;
        for (index, entity) in self.items.iter().enumerate() {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| entity.on_tick())) {
                faults += 1;
                log::error!(
                    "Ticking entity {:p} panicked during tick: {}",
                    Arc::as_ptr(entity),
                    panic_message(payload.as_ref())
                );
            }
            self.dirty[index] = false;
        }
        faults
    }
}

impl Default for TickSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Lifecycle of the scheduler thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SchedulerState {
    /// Constructed, thread not yet running.
    Idle = 0,
    /// Tick loop in progress.
    Running = 1,
    /// Stop observed, final cycle winding down.
    Stopping = 2,
    /// Thread exited.
    Stopped = 3,
}

impl SchedulerState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Stopping,
            3 => Self::Stopped,
            _ => Self::Idle,
        }
    }
}

/// Counters describing scheduler behavior, for diagnostics and tests.
#[derive(Debug, Default)]
pub struct TickStats {
    cycles: AtomicU64,
    slow_cycles: AtomicU64,
    faults: AtomicU64,
}

impl TickStats {
    /// Completed tick cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Cycles whose start-to-start gap exceeded the slow-tick threshold.
    pub fn slow_cycles(&self) -> u64 {
        self.slow_cycles.load(Ordering::Relaxed)
    }

    /// Entity callbacks that panicked and were contained.
    pub fn faults(&self) -> u64 {
        self.faults.load(Ordering::Relaxed)
    }
}

/// Background scheduler driving the tick set at a fixed cadence.
pub struct TickScheduler {
    set: Arc<Mutex<TickSet>>,
    handle: Option<JoinHandle<()>>,
    state: Arc<AtomicU8>,
    stats: Arc<TickStats>,
}

impl TickScheduler {
    /// Spawn the scheduler thread.
    ///
    /// The loop runs while `ctx.is_running()` holds; flip the context's
    /// running flag and call [`TickScheduler::join`] to stop it.
    ///
    /// # Panics
    ///
    /// Panics if the OS fails to spawn the tick thread.
    pub fn spawn(ctx: EmulatorContext) -> Self {
        let set = Arc::new(Mutex::new(TickSet::new()));
        let state = Arc::new(AtomicU8::new(SchedulerState::Idle as u8));
        let stats = Arc::new(TickStats::default());

        let thread_set = Arc::clone(&set);
        let thread_state = Arc::clone(&state);
        let thread_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(TICK_THREAD_NAME.to_string())
            .spawn(move || {
                Self::run_loop(&thread_set, &ctx, &thread_state, &thread_stats);
            })
            .expect("Failed to spawn tick thread");

        Self {
            set,
            handle: Some(handle),
            state,
            stats,
        }
    }

    /// Register a ticking entity.
    ///
    /// Blocks until any in-flight tick pass releases the set, so a newly
    /// registered entity is never ticked mid-pass; it first runs in the
    /// next cycle.
    pub fn register(&self, entity: Arc<dyn Ticking>) -> bool {
        self.lock_set().register(entity)
    }

    /// Unregister a ticking entity. Blocks like [`TickScheduler::register`].
    pub fn unregister(&self, entity: &Arc<dyn Ticking>) -> bool {
        self.lock_set().unregister(entity)
    }

    /// Flag a registered entity dirty. Blocks like [`TickScheduler::register`].
    pub fn invalidate(&self, entity: &Arc<dyn Ticking>) {
        self.lock_set().invalidate(entity);
    }

    /// Read an entity's dirty flag.
    pub fn is_dirty(&self, entity: &Arc<dyn Ticking>) -> bool {
        self.lock_set().is_dirty(entity)
    }

    /// Current scheduler lifecycle state.
    pub fn state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.state.load(Ordering::Relaxed))
    }

    /// Scheduler counters.
    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    /// Wait for the scheduler thread to exit, up to `timeout`.
    ///
    /// The caller must have stopped the context first; the loop checks its
    /// continuation predicate once per cycle, so a healthy thread exits
    /// within one tick budget. Threads cannot be interrupted in Rust: on
    /// timeout the handle is detached with a warning instead. Subsequent
    /// calls are no-ops; state and stats stay readable after the join.
    pub fn join(&mut self, timeout: Duration) {
        // Leave a Stopped state alone if the thread already exited.
        let _ = self.state.compare_exchange(
            SchedulerState::Running as u8,
            SchedulerState::Stopping as u8,
            Ordering::Relaxed,
            Ordering::Relaxed,
        );
        if let Some(handle) = self.handle.take() {
            log::info!("Gracefully stopping the {TICK_THREAD_NAME} thread");
            let deadline = Instant::now() + timeout;
            while !handle.is_finished() && Instant::now() < deadline {
                thread::sleep(Duration::from_millis(5));
            }
            if handle.is_finished() {
                let _ = handle.join();
            } else {
                log::warn!(
                    "Failed to stop the {TICK_THREAD_NAME} thread gracefully - detaching it"
                );
                drop(handle);
            }
        }
    }

    fn lock_set(&self) -> std::sync::MutexGuard<'_, TickSet> {
        // A poisoning panic cannot leave the set half-mutated: entity
        // callbacks are contained inside the pass and set mutations are
        // single push/remove operations.
        self.set.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scheduler thread body.
    fn run_loop(
        set: &Arc<Mutex<TickSet>>,
        ctx: &EmulatorContext,
        state: &Arc<AtomicU8>,
        stats: &Arc<TickStats>,
    ) {
        state.store(SchedulerState::Running as u8, Ordering::Relaxed);
        let budget_ms = u64::try_from(ctx.config().tick_interval.as_millis()).unwrap_or(u64::MAX);
        let slow_ms =
            u64::try_from(ctx.config().slow_tick_threshold.as_millis()).unwrap_or(u64::MAX);
        let mut last_start: Option<u64> = None;

        while ctx.is_running() {
            let tick_start = ctx.millis();

            let faults = {
                let mut set = set.lock().unwrap_or_else(PoisonError::into_inner);
                set.run_pass()
            };

            let tick_end = ctx.millis();
            let proc_time = tick_end - tick_start;

            stats.cycles.fetch_add(1, Ordering::Relaxed);
            stats.faults.fetch_add(faults, Ordering::Relaxed);

            // Diagnostic only; the cycle that blew the budget already ran
            // and is never re-run to compensate.
            if let Some(previous) = last_start {
                if tick_start - previous > slow_ms {
                    stats.slow_cycles.fetch_add(1, Ordering::Relaxed);
                    log::warn!(
                        "Cannot keep up [cycle-time: {}ms, proc-time: {proc_time}ms]",
                        tick_end - previous
                    );
                }
            }
            last_start = Some(tick_start);

            if proc_time < budget_ms {
                thread::sleep(Duration::from_millis(budget_ms - proc_time));
            }
        }

        state.store(SchedulerState::Stopped as u8, Ordering::Relaxed);
        log::info!("Tick scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::EmulatorConfig;
    use std::sync::atomic::AtomicU32;
    use std::sync::mpsc;

    struct Counter {
        ticks: AtomicU32,
    }

    impl Counter {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                ticks: AtomicU32::new(0),
            })
        }

        fn count(&self) -> u32 {
            self.ticks.load(Ordering::Relaxed)
        }
    }

    impl Ticking for Counter {
        fn on_tick(&self) {
            self.ticks.fetch_add(1, Ordering::Relaxed);
        }
    }

    struct Panicking;

    impl Ticking for Panicking {
        fn on_tick(&self) {
            panic!("misbehaving entity");
        }
    }

    fn fast_context() -> EmulatorContext {
        EmulatorContext::new(EmulatorConfig {
            tick_interval: Duration::from_millis(5),
            ..EmulatorConfig::default()
        })
    }

    #[test]
    fn test_dirty_flag_lifecycle() {
        let mut set = TickSet::new();
        let counter = Counter::new();
        let entity: Arc<dyn Ticking> = counter;

        assert!(set.register(Arc::clone(&entity)));
        assert!(!set.is_dirty(&entity));

        set.invalidate(&entity);
        assert!(set.is_dirty(&entity));

        set.run_pass();
        assert!(!set.is_dirty(&entity));
    }

    #[test]
    fn test_invalidate_unknown_entity_is_harmless() {
        let mut set = TickSet::new();
        let stranger: Arc<dyn Ticking> = Counter::new();

        set.invalidate(&stranger);
        assert!(!set.is_dirty(&stranger));
        assert!(set.is_empty());
    }

    #[test]
    fn test_unregister_keeps_dirty_flags_aligned() {
        let mut set = TickSet::new();
        let first: Arc<dyn Ticking> = Counter::new();
        let second: Arc<dyn Ticking> = Counter::new();
        set.register(Arc::clone(&first));
        set.register(Arc::clone(&second));

        set.invalidate(&second);
        assert!(set.unregister(&first));
        assert!(set.is_dirty(&second));
    }

    #[test]
    fn test_tick_completeness() {
        let ctx = fast_context();
        let mut scheduler = TickScheduler::spawn(ctx.clone());
        let counter = Counter::new();
        let entity: Arc<dyn Ticking> = counter.clone();

        assert!(scheduler.register(entity));
        thread::sleep(Duration::from_millis(60));
        ctx.stop();
        scheduler.join(Duration::from_millis(250));

        // Registration may have landed mid-cycle, so the entity can miss
        // at most the cycles that completed before it was added.
        let cycles = scheduler.stats().cycles();
        assert!(counter.count() > 0);
        assert!(u64::from(counter.count()) <= cycles);
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
    }

    #[test]
    fn test_fault_isolation() {
        let ctx = fast_context();
        let mut scheduler = TickScheduler::spawn(ctx.clone());
        let counter = Counter::new();

        assert!(scheduler.register(Arc::new(Panicking)));
        let entity: Arc<dyn Ticking> = counter.clone();
        assert!(scheduler.register(entity));

        thread::sleep(Duration::from_millis(40));
        assert_eq!(scheduler.state(), SchedulerState::Running);
        ctx.stop();
        scheduler.join(Duration::from_millis(250));

        // The panicking entity never starved its sibling.
        assert!(counter.count() > 0);
        assert!(scheduler.stats().faults() > 0);
    }

    #[test]
    fn test_mutation_blocks_until_pass_completes() {
        struct SlowPass {
            started: mpsc::Sender<()>,
        }

        impl Ticking for SlowPass {
            fn on_tick(&self) {
                let _ = self.started.send(());
                thread::sleep(Duration::from_millis(80));
            }
        }

        let ctx = fast_context();
        let mut scheduler = TickScheduler::spawn(ctx.clone());
        let (started, in_pass) = mpsc::channel();
        assert!(scheduler.register(Arc::new(SlowPass { started })));

        // Wait until a pass is provably in flight, then try to mutate.
        in_pass
            .recv_timeout(Duration::from_millis(500))
            .expect("pass never started");
        let before = Instant::now();
        let late: Arc<dyn Ticking> = Counter::new();
        assert!(scheduler.register(late));
        assert!(before.elapsed() >= Duration::from_millis(40));

        ctx.stop();
        scheduler.join(Duration::from_millis(500));
    }

    #[test]
    fn test_slow_tick_warning_without_catchup() {
        struct SlowFirstTick {
            ticks: AtomicU32,
        }

        impl Ticking for SlowFirstTick {
            fn on_tick(&self) {
                if self.ticks.fetch_add(1, Ordering::Relaxed) == 0 {
                    thread::sleep(Duration::from_millis(90));
                }
            }
        }

        let ctx = EmulatorContext::new(EmulatorConfig {
            tick_interval: Duration::from_millis(50),
            slow_tick_threshold: Duration::from_millis(80),
            ..EmulatorConfig::default()
        });
        let mut scheduler = TickScheduler::spawn(ctx.clone());
        let slow = Arc::new(SlowFirstTick {
            ticks: AtomicU32::new(0),
        });
        let entity: Arc<dyn Ticking> = slow.clone();
        assert!(scheduler.register(entity));

        // First ticked cycle takes ~90 ms, following cycles are on budget.
        thread::sleep(Duration::from_millis(260));
        ctx.stop();
        scheduler.join(Duration::from_millis(500));

        assert_eq!(scheduler.stats().slow_cycles(), 1);
        // No catch-up ticking: at most one callback per completed cycle,
        // and the loop kept going after the slow one.
        let ticks = u64::from(slow.ticks.load(Ordering::Relaxed));
        assert!(ticks >= 3);
        assert!(ticks <= scheduler.stats().cycles());
    }
}
