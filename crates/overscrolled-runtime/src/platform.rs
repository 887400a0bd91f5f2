//! Platform abstraction for the Overscrolled runtime.
//!
//! The runtime never drives frames itself; it only records that a frame is
//! wanted and asks the host to schedule one. Hosts plug in by implementing
//! [`RuntimeScheduler`].

/// Schedules work for the runtime.
///
/// Implementations are responsible for triggering frame processing on behalf
/// of the runtime (e.g. requesting a redraw from the windowing system). They
/// must be safe to use from multiple threads.
pub trait RuntimeScheduler: Send + Sync {
    /// Request that the host schedule a new frame.
    fn schedule_frame(&self);
}
