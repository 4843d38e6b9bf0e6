//! The managers: registry foundation, tick scheduling, input dispatch,
//! and window coordination.
//!
//! Every manager is built on the same [`Registry`] contract; only the tick
//! manager is shared across threads (see [`TickScheduler`]). The input
//! dispatcher and window coordinator are frame-thread-only and need no
//! locking among themselves.

pub mod input;
pub mod registry;
pub mod tick;
pub mod window;

pub use input::InputDispatcher;
pub use registry::Registry;
pub use tick::{SchedulerState, TickScheduler, TickSet, TickStats};
pub use window::WindowCoordinator;
