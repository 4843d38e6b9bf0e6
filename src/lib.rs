//! # Tickshell
//!
//! The runtime core of an interactive emulator shell: a fixed-rate
//! simulation clock ("tick") on a background thread, and a render/input
//! loop ("frame") on the calling thread, both operating over shared
//! registries of capability-typed entities.
//!
//! ## Core Concepts
//!
//! - **Registries**: insertion-ordered, duplicate-rejecting sets of entity
//!   handles; failed operations warn, never panic
//! - **Tick scheduler**: 20 Hz nominal, one locked pass per cycle, faults
//!   contained per entity, never batched to catch up
//! - **Frame orchestrator**: resize, clear, windows, overlays, present,
//!   input, pace; faults get a fatal report and an orderly shutdown
//! - **Host seams**: input arrives through [`event::InputSource`], output
//!   leaves through [`runtime::Display`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use tickshell::{EmulatorContext, FrameOrchestrator};
//!
//! let ctx = EmulatorContext::default();
//! let mut shell = FrameOrchestrator::new(ctx);
//! shell.windows().register(my_window);
//! shell.run(&mut display, &mut input);
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod entity;
pub mod event;
pub mod manager;
pub mod runtime;
pub mod terminal;

// Re-exports for convenience
pub use entity::{same_entity, InputConsumer, RenderContext, Rendered, Ticking, Window};
pub use event::{InputSource, KeyState, MouseButton, RawKeyEvent, RawMouseEvent};
pub use manager::{InputDispatcher, Registry, TickScheduler, TickSet, WindowCoordinator};
pub use runtime::{
    Display, EmulatorConfig, EmulatorContext, FrameOrchestrator, ViewportResizeSignal,
};
