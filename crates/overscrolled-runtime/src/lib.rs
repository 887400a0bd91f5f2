//! Runtime services for Overscrolled: frame scheduling and cooperative tasks.
//!
//! The overscroll engine is driven entirely by an external frame source (the
//! host UI loop). This crate provides the thin runtime that connects the two:
//! a queue of one-shot frame callbacks, a single-threaded future executor for
//! fire-and-forget work such as the content fling, and a `FrameClock` facade
//! that animation code registers against.

pub mod frame_clock;
pub mod platform;
pub mod runtime;

pub use frame_clock::{FrameCallbackRegistration, FrameClock, NextFrame};
pub use platform::RuntimeScheduler;
pub use runtime::{DefaultScheduler, FrameCallbackId, Runtime, RuntimeHandle, TaskHandle};
