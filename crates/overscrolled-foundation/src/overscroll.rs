//! Dampened overscroll engine.
//!
//! Consumes drag deltas past the content's scroll bounds, accumulates a
//! dampened offset, reports progress to the host, and springs the offset back
//! to rest when the gesture ends in a fling. The engine computes numbers only;
//! applying them to a visual layer is the host's job via
//! [`OverscrollHandler`].

use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;

use overscrolled_animation::{Animatable, SpringSpec};
use overscrolled_runtime::RuntimeHandle;

use crate::geometry::{Offset, Velocity};
use crate::scrollable::{Orientation, ScrollSource};

/// Multiplier applied to unconsumed drag delta before it accumulates as
/// overscroll, producing the drag resistance feel.
pub const DAMPENING_MULTIPLIER: f32 = 0.3;

/// Fraction of the configured threshold at which the one-shot
/// "threshold activated" notification fires (e.g. a haptic tick).
pub const ACTIVATION_FRACTION: f32 = 0.4;

/// Host-side sink for everything the engine computes.
///
/// Progress values are the main-axis offset divided by the configured
/// threshold. They are not clamped; clamp when mapping to visual effects.
pub trait OverscrollHandler {
    /// Per-change visual hook. Runs on every committed offset change, both
    /// while dragging and on each frame of the settle-back animation.
    fn apply_visual_effect(&self, progress: f32);

    /// Discrete event stream: fired at most once per `apply_to_scroll` call,
    /// when the offset actually changed (`is_settling == false`), and exactly
    /// once when a fling starts the settle-back animation
    /// (`is_settling == true`). Settle frames fire no further events.
    fn on_threshold_event(&self, progress: f32, is_settling: bool);

    /// Fired once when `|progress|` first exceeds [`ACTIVATION_FRACTION`].
    /// Re-armed only after `|progress|` drops back to or below it; oscillating
    /// above the fraction does not re-fire.
    fn on_threshold_activated(&self, progress: f32) {
        let _ = progress;
    }
}

/// Phase of the overscroll gesture state machine.
///
/// `apply_to_scroll` with a committed offset change enters `Dragging`,
/// `apply_to_fling` with a non-zero offset enters `Settling`, and the offset
/// reaching zero (by absorption or by the settle animation) returns to
/// `AtRest`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GesturePhase {
    AtRest,
    Dragging,
    Settling,
}

/// Stateful per-gesture-sequence overscroll engine.
///
/// One instance owns one gesture sequence at a time; callers must serialize
/// calls into it. `apply_to_scroll` is fully synchronous, `apply_to_fling`
/// schedules its work on the runtime and returns immediately.
pub struct OverscrollEffect {
    orientation: Orientation,
    threshold: f32,
    handler: Rc<dyn OverscrollHandler>,
    offset: Animatable<Offset>,
    reached_threshold: Rc<Cell<bool>>,
    phase: Rc<Cell<GesturePhase>>,
    settle_spring: SpringSpec,
    runtime: RuntimeHandle,
}

impl OverscrollEffect {
    pub fn new(
        orientation: Orientation,
        threshold: f32,
        handler: Rc<dyn OverscrollHandler>,
        runtime: RuntimeHandle,
    ) -> Self {
        debug_assert!(threshold > 0.0, "overscroll threshold must be positive");
        let offset = Animatable::new(Offset::ZERO, runtime.clone());
        let phase = Rc::new(Cell::new(GesturePhase::AtRest));
        let reached_threshold = Rc::new(Cell::new(false));
        {
            // The visual hook tracks every committed offset change, including
            // settle-back animation frames. Reaching zero from any phase is
            // the transition back to rest, and dropping back to or below the
            // activation fraction re-arms the latch even when the drop happens
            // during a settle animation.
            let handler = Rc::clone(&handler);
            let phase = Rc::clone(&phase);
            let reached_threshold = Rc::clone(&reached_threshold);
            offset.set_on_change(move |value: &Offset| {
                if *value == Offset::ZERO {
                    phase.set(GesturePhase::AtRest);
                }
                let progress = value.along(orientation) / threshold;
                if progress.abs() <= ACTIVATION_FRACTION {
                    reached_threshold.set(false);
                }
                handler.apply_visual_effect(progress);
            });
        }
        Self {
            orientation,
            threshold,
            handler,
            offset,
            reached_threshold,
            phase,
            settle_spring: SpringSpec::default_spring(),
            runtime,
        }
    }

    /// Replaces the spring used by the settle-back animation.
    pub fn with_settle_spring(mut self, spring: SpringSpec) -> Self {
        self.settle_spring = spring;
        self
    }

    /// Current overscroll displacement.
    pub fn offset(&self) -> Offset {
        self.offset.value()
    }

    /// Main-axis offset divided by the threshold. Unclamped.
    pub fn progress(&self) -> f32 {
        self.offset.value().along(self.orientation) / self.threshold
    }

    /// The offset is non-zero exactly while an overscroll gesture or its
    /// settle-back is in progress.
    pub fn is_in_progress(&self) -> bool {
        self.offset.value() != Offset::ZERO
    }

    /// Current phase of the gesture state machine.
    pub fn phase(&self) -> GesturePhase {
        self.phase.get()
    }

    /// Routes a scroll delta through the overscroll pipeline.
    ///
    /// `perform_scroll` is the underlying content's scroll consumer: it
    /// receives the portion of `delta` not already absorbed by overscroll and
    /// returns how much of it the content consumed.
    ///
    /// Returns the total delta accounted for: absorption toward zero, content
    /// consumption, and dampened accumulation of the rest. Component-wise,
    /// `consumed_by_overscroll + consumed_by_content + unconsumed == delta`
    /// always holds; nothing is silently dropped.
    pub fn apply_to_scroll(
        &self,
        delta: Offset,
        source: ScrollSource,
        mut perform_scroll: impl FnMut(Offset) -> Offset,
    ) -> Offset {
        if source != ScrollSource::UserInput {
            return perform_scroll(delta);
        }

        // 1. Release existing overscroll first: the part of the delta pointing
        //    back toward zero collapses the stored offset, axis by axis, and
        //    never overshoots past zero. The write is synchronous and also
        //    supersedes a settle animation still in flight.
        let current = self.offset.value();
        let consumed_by_overscroll = Offset::new(
            absorbed_toward_zero(current.x, delta.x),
            absorbed_toward_zero(current.y, delta.y),
        );
        if consumed_by_overscroll != Offset::ZERO {
            self.offset.snapTo(current + consumed_by_overscroll);
        }

        // 2. Offer the remainder to the content.
        let remaining = delta - consumed_by_overscroll;
        let consumed_by_content = perform_scroll(remaining);

        // 3. Accumulate what the content left over, dampened.
        let unconsumed = remaining - consumed_by_content;
        if unconsumed != Offset::ZERO {
            let basis = self.offset.value();
            self.offset.snapTo(basis + unconsumed * DAMPENING_MULTIPLIER);
        }

        // One discrete notification per call, even when both steps 1 and 3
        // wrote (a delta crossing through zero to the other side).
        if consumed_by_overscroll != Offset::ZERO || unconsumed != Offset::ZERO {
            if self.offset.value() != Offset::ZERO {
                self.phase.set(GesturePhase::Dragging);
            }
            let progress = self.progress();
            self.handler.on_threshold_event(progress, false);
            self.update_activation_latch(progress);
        }

        consumed_by_overscroll + consumed_by_content + unconsumed
    }

    /// Hands the fling off to the content and, when overscrolled, launches the
    /// settle-back animation. Both run concurrently on the runtime, started
    /// together so the two motions do not stutter; this call returns
    /// immediately.
    pub fn apply_to_fling<F, Fut>(&self, velocity: Velocity, perform_fling: F)
    where
        F: FnOnce(Velocity) -> Fut + 'static,
        Fut: Future<Output = Velocity> + 'static,
    {
        // Task A: the content performs its own fling with the full velocity.
        if self
            .runtime
            .spawn_ui(async move {
                let _ = perform_fling(velocity).await;
            })
            .is_none()
        {
            log::warn!("apply_to_fling on a dropped runtime; content fling skipped");
        }

        // Task B: spring the stored offset back to rest. A single settle-start
        // event fires here; settle frames drive only the visual hook.
        let current = self.offset.value();
        if current != Offset::ZERO {
            let progress = self.progress();
            log::trace!("overscroll settle start at progress {progress}");
            self.phase.set(GesturePhase::Settling);
            self.handler.on_threshold_event(progress, true);

            let axis = current.along(self.orientation);
            // Initial rate of change of the offset magnitude: the release
            // velocity projected onto the overscrolled side of the axis.
            let seed = if axis == 0.0 {
                0.0
            } else {
                velocity.along(self.orientation) * axis.signum()
            };
            self.offset.animateTo(Offset::ZERO, self.settle_spring, seed);
        }
    }

    fn update_activation_latch(&self, progress: f32) {
        if progress.abs() > ACTIVATION_FRACTION {
            if !self.reached_threshold.replace(true) {
                log::trace!("overscroll threshold activated at progress {progress}");
                self.handler.on_threshold_activated(progress);
            }
        } else {
            self.reached_threshold.set(false);
        }
    }
}

/// Portion of `delta` absorbed by an existing overscroll `offset` on one axis:
/// opposite-signed movement collapses the offset toward zero and is capped at
/// exactly reaching it.
fn absorbed_toward_zero(offset: f32, delta: f32) -> f32 {
    if offset == 0.0 || delta == 0.0 || offset.signum() == delta.signum() {
        0.0
    } else if delta.abs() > offset.abs() {
        -offset
    } else {
        delta
    }
}

#[cfg(test)]
#[path = "tests/overscroll_tests.rs"]
mod tests;
