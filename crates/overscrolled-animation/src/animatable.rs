//! Frame-clock-driven animatable value holder.

use std::cell::RefCell;
use std::rc::Rc;

use overscrolled_runtime::{FrameCallbackRegistration, RuntimeHandle};

use crate::spring::{SpringScalar, SpringSpec};

/// Fixed sub-step for spring integration. Small enough that the damping term
/// stays stable at default stiffness and a velocity seed shapes the early
/// trajectory instead of being swallowed by the first step.
const SPRING_TIMESTEP: f32 = 0.004;

/// Generic animatable value holder.
///
/// Holds a current value that is either assigned directly (`snapTo`) or moved
/// toward a target by a spring trajectory (`animateTo`) stepped on each frame
/// of the runtime's frame clock. A synchronous `snapTo` while an animation is
/// in flight supersedes it: the pending frame step is cancelled and any step
/// already extracted for this frame detects the stale generation and bails.
pub struct Animatable<T: SpringScalar + 'static> {
    inner: Rc<RefCell<AnimatableInner<T>>>,
}

struct AnimatableInner<T: SpringScalar + 'static> {
    runtime: RuntimeHandle,
    current: T,
    start: T,
    target: T,
    spec: SpringSpec,
    /// Spring velocity in progress units per second.
    velocity: f32,
    /// Bumped on every snapTo/animateTo; in-flight frame steps from an older
    /// generation must not commit.
    generation: u64,
    last_frame_nanos: Option<u64>,
    registration: Option<FrameCallbackRegistration>,
    on_change: Option<Rc<dyn Fn(&T)>>,
    running: bool,
}

impl<T: SpringScalar + 'static> Animatable<T> {
    /// Create a new animatable with the given initial value.
    pub fn new(initial: T, runtime: RuntimeHandle) -> Self {
        let inner = AnimatableInner {
            runtime,
            current: initial.clone(),
            start: initial.clone(),
            target: initial,
            spec: SpringSpec::default_spring(),
            velocity: 0.0,
            generation: 0,
            last_frame_nanos: None,
            registration: None,
            on_change: None,
            running: false,
        };
        Self {
            inner: Rc::new(RefCell::new(inner)),
        }
    }

    /// Get the current value.
    pub fn value(&self) -> T {
        self.inner.borrow().current.clone()
    }

    /// Return the current animation target.
    pub fn target(&self) -> T {
        self.inner.borrow().target.clone()
    }

    /// Whether an animation is currently in flight.
    pub fn is_running(&self) -> bool {
        self.inner.borrow().running
    }

    /// Registers the observer invoked after every committed value change.
    pub fn set_on_change(&self, observer: impl Fn(&T) + 'static) {
        self.inner.borrow_mut().on_change = Some(Rc::new(observer));
    }

    /// Snap immediately to the target value without animating.
    ///
    /// Cancels any in-flight animation; the assignment is fully committed
    /// before this returns.
    pub fn snapTo(&self, target: T) {
        let (observer, changed) = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            if let Some(registration) = inner.registration.take() {
                registration.cancel();
            }
            inner.running = false;
            inner.velocity = 0.0;
            inner.last_frame_nanos = None;
            let changed = inner.current != target;
            inner.current = target.clone();
            inner.start = target.clone();
            inner.target = target;
            (inner.on_change.clone(), changed)
        };
        if changed {
            if let Some(observer) = observer {
                observer(&self.value());
            }
        }
    }

    /// Animate to the target value with a spring seeded by `initial_velocity`,
    /// expressed in value units per second along the `to_f32` axis.
    pub fn animateTo(&self, target: T, spec: SpringSpec, initial_velocity: f32) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            if let Some(registration) = inner.registration.take() {
                registration.cancel();
            }
            if inner.current == target {
                inner.running = false;
                inner.start = target.clone();
                inner.target = target;
                return;
            }
            inner.start = inner.current.clone();
            let span = target.to_f32() - inner.start.to_f32();
            inner.velocity = if span.abs() < f32::EPSILON {
                0.0
            } else {
                initial_velocity / span
            };
            inner.target = target;
            inner.spec = spec;
            inner.last_frame_nanos = None;
            inner.running = true;
            log::trace!(
                "animateTo: span {:.3}, seed velocity {:.3}/s",
                span,
                inner.velocity
            );
        }
        Self::schedule_frame(&self.inner);
    }

    fn schedule_frame(this: &Rc<RefCell<AnimatableInner<T>>>) {
        let (clock, generation) = {
            let inner = this.borrow();
            if inner.registration.is_some() {
                return;
            }
            (inner.runtime.frame_clock(), inner.generation)
        };
        let weak = Rc::downgrade(this);
        let registration = clock.with_frame_nanos(move |time| {
            if let Some(strong) = weak.upgrade() {
                if strong.borrow().generation == generation {
                    Self::on_frame(&strong, time);
                }
            }
        });
        this.borrow_mut().registration = Some(registration);
    }

    fn on_frame(this: &Rc<RefCell<AnimatableInner<T>>>, frame_time_nanos: u64) {
        let mut schedule_next = false;
        let mut notify = None;
        {
            let mut inner = this.borrow_mut();
            inner.registration = None;
            if !inner.running {
                return;
            }

            let last = match inner.last_frame_nanos.replace(frame_time_nanos) {
                Some(last) => last,
                None => {
                    // First frame only establishes the time base.
                    drop(inner);
                    Self::schedule_frame(this);
                    return;
                }
            };
            let dt = frame_time_nanos.saturating_sub(last) as f32 / 1_000_000_000.0;

            // Semi-implicit Euler in progress space; the target sits at 1.0.
            let spec = inner.spec;
            let stiffness = spec.stiffness;
            let damping = 2.0 * spec.damping_ratio * stiffness.sqrt();

            let mut progress =
                <T as SpringScalar>::spring_progress(&inner.start, &inner.target, &inner.current);
            let mut elapsed = 0.0f32;
            while elapsed < dt {
                let step = SPRING_TIMESTEP.min(dt - elapsed);
                let displacement = progress - 1.0;
                let force = -stiffness * displacement - damping * inner.velocity;
                inner.velocity += force * step;
                progress += inner.velocity * step;
                elapsed += step;
            }
            // Progress below zero is a seeded excursion past the start value;
            // allow it, but keep runaway extrapolation bounded.
            inner.current = inner
                .start
                .lerp(&inner.target, progress.clamp(-1.0, 2.0));

            let at_rest = inner.velocity.abs() < spec.velocity_threshold;
            let near_target = <T as SpringScalar>::is_near_target(
                &inner.current,
                &inner.target,
                spec.position_threshold,
            );
            if at_rest && near_target {
                inner.current = inner.target.clone();
                inner.start = inner.target.clone();
                inner.velocity = 0.0;
                inner.last_frame_nanos = None;
                inner.running = false;
            } else {
                schedule_next = true;
            }

            if let Some(observer) = inner.on_change.clone() {
                notify = Some((observer, inner.current.clone()));
            }
        }

        // Invoke the observer outside the borrow; it typically reads back
        // through the public accessors.
        if let Some((observer, value)) = notify {
            observer(&value);
        }
        if schedule_next {
            Self::schedule_frame(this);
        }
    }
}

impl<T: SpringScalar + 'static> Clone for Animatable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

#[cfg(test)]
#[path = "tests/animatable_tests.rs"]
mod tests;
