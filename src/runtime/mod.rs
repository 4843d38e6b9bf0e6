//! Runtime plumbing: context, frame loop, resize handoff, fatal reports.

pub mod context;
pub mod frame;
pub mod report;
pub mod signal;

pub use context::{Clock, EmulatorConfig, EmulatorContext};
pub use frame::{Display, FrameOrchestrator};
pub use signal::ViewportResizeSignal;
