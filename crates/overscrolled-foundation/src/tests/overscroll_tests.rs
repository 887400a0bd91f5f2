use super::*;
use overscrolled_runtime::{DefaultScheduler, Runtime, RuntimeHandle};
use std::cell::RefCell;
use std::sync::Arc;

const THRESHOLD: f32 = 100.0;
const FRAME_NANOS: u64 = 16_000_000;

#[derive(Default)]
struct RecordingHandler {
    visual: RefCell<Vec<f32>>,
    events: RefCell<Vec<(f32, bool)>>,
    activations: RefCell<Vec<f32>>,
}

impl OverscrollHandler for RecordingHandler {
    fn apply_visual_effect(&self, progress: f32) {
        self.visual.borrow_mut().push(progress);
    }

    fn on_threshold_event(&self, progress: f32, is_settling: bool) {
        self.events.borrow_mut().push((progress, is_settling));
    }

    fn on_threshold_activated(&self, progress: f32) {
        self.activations.borrow_mut().push(progress);
    }
}

fn horizontal_engine() -> (Runtime, Rc<RecordingHandler>, OverscrollEffect) {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let handler = Rc::new(RecordingHandler::default());
    let effect = OverscrollEffect::new(
        Orientation::Horizontal,
        THRESHOLD,
        Rc::clone(&handler) as Rc<dyn OverscrollHandler>,
        runtime.handle(),
    );
    (runtime, handler, effect)
}

fn consume_nothing(_: Offset) -> Offset {
    Offset::ZERO
}

fn drive_frames(handle: &RuntimeHandle, start_frame: u64, count: u64) -> u64 {
    for frame in start_frame..start_frame + count {
        handle.drain_frame_callbacks(frame * FRAME_NANOS);
    }
    start_frame + count
}

#[test]
fn programmatic_deltas_bypass_capture() {
    let (_runtime, handler, effect) = horizontal_engine();
    let delta = Offset::new(40.0, 0.0);
    let seen = Rc::new(RefCell::new(None));
    let seen_inner = Rc::clone(&seen);

    let consumed = effect.apply_to_scroll(delta, ScrollSource::SideEffect, |offered| {
        *seen_inner.borrow_mut() = Some(offered);
        offered
    });

    assert_eq!(*seen.borrow(), Some(delta), "content sees the full delta");
    assert_eq!(consumed, delta);
    assert_eq!(effect.offset(), Offset::ZERO);
    assert!(handler.events.borrow().is_empty());
}

#[test]
fn unconsumed_drag_accumulates_dampened_exactly() {
    let (_runtime, _handler, effect) = horizontal_engine();
    let delta = Offset::new(10.0, 0.0);

    let consumed = effect.apply_to_scroll(delta, ScrollSource::UserInput, consume_nothing);

    assert_eq!(effect.offset(), delta * DAMPENING_MULTIPLIER);
    assert_eq!(consumed, delta, "the full delta is accounted for");
    assert!(effect.is_in_progress());
}

#[test]
fn opposite_delta_absorbs_exactly_back_to_zero() {
    let (_runtime, _handler, effect) = horizontal_engine();
    effect.apply_to_scroll(Offset::new(10.0, 0.0), ScrollSource::UserInput, consume_nothing);
    let current = effect.offset();
    assert!(current.x > 0.0);

    let offered = Rc::new(RefCell::new(None));
    let offered_inner = Rc::clone(&offered);
    let consumed = effect.apply_to_scroll(-current, ScrollSource::UserInput, |remaining| {
        *offered_inner.borrow_mut() = Some(remaining);
        Offset::ZERO
    });

    assert_eq!(effect.offset(), Offset::ZERO, "absorption lands exactly on zero");
    assert!(!effect.is_in_progress());
    assert_eq!(consumed, -current, "the whole delta is consumed by overscroll");
    assert_eq!(
        *offered.borrow(),
        Some(Offset::ZERO),
        "nothing remains for the content"
    );
}

#[test]
fn absorption_never_overshoots_past_zero() {
    let (_runtime, _handler, effect) = horizontal_engine();
    effect.apply_to_scroll(Offset::new(10.0, 0.0), ScrollSource::UserInput, consume_nothing);
    let current = effect.offset();

    // A pull-back far larger than the stored offset: the axis stops at zero
    // and only the remainder reaches the content.
    let delta = Offset::new(-current.x - 50.0, 0.0);
    let offered = Rc::new(RefCell::new(None));
    let offered_inner = Rc::clone(&offered);
    effect.apply_to_scroll(delta, ScrollSource::UserInput, |remaining| {
        *offered_inner.borrow_mut() = Some(remaining);
        remaining
    });

    assert_eq!(offered.borrow().unwrap(), Offset::new(-50.0, 0.0));
}

#[test]
fn delta_is_conserved_component_wise() {
    let (_runtime, _handler, effect) = horizontal_engine();
    let delta = Offset::new(10.0, -8.0);

    let consumed = effect.apply_to_scroll(delta, ScrollSource::UserInput, |offered| offered * 0.5);

    // consumed_by_overscroll (zero here) + consumed_by_content + unconsumed
    // adds back up to the original delta on both axes.
    assert_eq!(consumed, delta);
    assert_eq!(effect.offset(), delta * 0.5 * DAMPENING_MULTIPLIER);
}

#[test]
fn no_events_when_content_consumes_everything() {
    let (_runtime, handler, effect) = horizontal_engine();

    effect.apply_to_scroll(Offset::new(30.0, 0.0), ScrollSource::UserInput, |offered| {
        offered
    });

    assert_eq!(effect.offset(), Offset::ZERO);
    assert!(handler.events.borrow().is_empty());
    assert!(handler.visual.borrow().is_empty());
}

#[test]
fn dragging_fires_one_event_per_offset_change() {
    let (_runtime, handler, effect) = horizontal_engine();

    effect.apply_to_scroll(Offset::new(10.0, 0.0), ScrollSource::UserInput, consume_nothing);
    effect.apply_to_scroll(Offset::new(10.0, 0.0), ScrollSource::UserInput, consume_nothing);

    let events = handler.events.borrow();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|&(_, is_settling)| !is_settling));
    let expected = effect.offset().x / THRESHOLD;
    assert!((events[1].0 - expected).abs() < 1e-6);
}

#[test]
fn small_drags_never_report_activation() {
    let (_runtime, handler, effect) = horizontal_engine();

    // Deltas summing to 0.39 * threshold on the axis; dampening keeps the
    // progress far below the activation fraction throughout.
    for _ in 0..13 {
        effect.apply_to_scroll(Offset::new(3.0, 0.0), ScrollSource::UserInput, consume_nothing);
    }

    assert!(handler.activations.borrow().is_empty());
    assert!(handler
        .events
        .borrow()
        .iter()
        .all(|&(progress, _)| progress.abs() <= ACTIVATION_FRACTION));
}

#[test]
fn activation_latch_fires_once_until_rearmed() {
    let (_runtime, handler, effect) = horizontal_engine();
    // Drives the stored offset to an exact value: accumulation divides by the
    // dampening multiplier, release uses plain absorption.
    let set_offset = |target: f32| {
        let current = effect.offset().x;
        let delta = if (target - current) * current.signum() < 0.0 && current != 0.0 {
            target - current
        } else {
            (target - current) / DAMPENING_MULTIPLIER
        };
        effect.apply_to_scroll(Offset::new(delta, 0.0), ScrollSource::UserInput, consume_nothing);
    };

    set_offset(41.0); // crosses 0.4 -> fires
    set_offset(50.0);
    set_offset(45.0); // still above 0.4, no re-fire
    set_offset(55.0);
    assert_eq!(handler.activations.borrow().len(), 1);

    set_offset(25.0); // drops below 0.4 -> re-armed
    assert_eq!(handler.activations.borrow().len(), 1);

    set_offset(45.0); // crosses again -> fires again
    assert_eq!(handler.activations.borrow().len(), 2);
}

#[test]
fn settling_back_to_rest_rearms_the_activation_latch() {
    let (runtime, handler, effect) = horizontal_engine();
    let handle = runtime.handle();

    effect.apply_to_scroll(Offset::new(200.0, 0.0), ScrollSource::UserInput, consume_nothing);
    assert_eq!(handler.activations.borrow().len(), 1);

    effect.apply_to_fling(Velocity::ZERO, |velocity| async move { velocity });
    drive_frames(&handle, 0, 240);
    assert_eq!(effect.offset(), Offset::ZERO);

    // The settle passed below the activation fraction without any drag
    // commit; the next gesture crossing it must fire again.
    effect.apply_to_scroll(Offset::new(200.0, 0.0), ScrollSource::UserInput, consume_nothing);
    assert_eq!(handler.activations.borrow().len(), 2);
}

#[test]
fn crossing_through_zero_fires_a_single_event() {
    let (_runtime, handler, effect) = horizontal_engine();
    effect.apply_to_scroll(Offset::new(10.0, 0.0), ScrollSource::UserInput, consume_nothing);
    let events_before = handler.events.borrow().len();
    let current = effect.offset();

    // Collapses the stored offset and re-accumulates on the other side in the
    // same call: one committed state for the caller, one event.
    let delta = Offset::new(-current.x - 22.0, 0.0);
    let consumed = effect.apply_to_scroll(delta, ScrollSource::UserInput, consume_nothing);

    assert_eq!(consumed, delta);
    assert_eq!(effect.offset(), Offset::new(-22.0 * DAMPENING_MULTIPLIER, 0.0));
    let events = handler.events.borrow();
    assert_eq!(events.len(), events_before + 1);
    let expected = effect.offset().x / THRESHOLD;
    assert!((events.last().unwrap().0 - expected).abs() < 1e-6);
}

#[test]
fn vertical_engine_reads_progress_from_the_y_axis() {
    let runtime = Runtime::new(Arc::new(DefaultScheduler));
    let handler = Rc::new(RecordingHandler::default());
    let effect = OverscrollEffect::new(
        Orientation::Vertical,
        THRESHOLD,
        Rc::clone(&handler) as Rc<dyn OverscrollHandler>,
        runtime.handle(),
    );

    effect.apply_to_scroll(Offset::new(5.0, 100.0), ScrollSource::UserInput, consume_nothing);

    assert_eq!(effect.offset(), Offset::new(5.0, 100.0) * DAMPENING_MULTIPLIER);
    let expected = 100.0 * DAMPENING_MULTIPLIER / THRESHOLD;
    assert!((effect.progress() - expected).abs() < 1e-6);
    let events = handler.events.borrow();
    assert_eq!(events.len(), 1);
    assert!(
        (events[0].0 - expected).abs() < 1e-6,
        "the x component must not leak into vertical progress"
    );
}

#[test]
fn fling_at_rest_fires_no_settle_event() {
    let (runtime, handler, effect) = horizontal_engine();
    let flung = Rc::new(RefCell::new(None));
    let flung_inner = Rc::clone(&flung);

    effect.apply_to_fling(Velocity::new(4000.0, 0.0), move |velocity| async move {
        *flung_inner.borrow_mut() = Some(velocity);
        velocity
    });
    runtime.handle().drain_ui();

    assert_eq!(*flung.borrow(), Some(Velocity::new(4000.0, 0.0)));
    assert!(handler.events.borrow().is_empty());
    assert!(!effect.is_in_progress());
}

#[test]
fn fling_settles_back_with_a_single_settle_event() {
    let (runtime, handler, effect) = horizontal_engine();
    let handle = runtime.handle();
    effect.apply_to_scroll(Offset::new(100.0, 0.0), ScrollSource::UserInput, consume_nothing);
    let pre_settle_progress = effect.progress();
    let events_before = handler.events.borrow().len();

    effect.apply_to_fling(Velocity::new(500.0, 0.0), |velocity| async move { velocity });

    // The settle-start event is emitted before the call returns.
    {
        let events = handler.events.borrow();
        assert_eq!(events.len(), events_before + 1);
        assert_eq!(events.last().unwrap(), &(pre_settle_progress, true));
    }

    handle.drain_ui();
    let visual_before_frames = handler.visual.borrow().len();
    drive_frames(&handle, 0, 240);

    assert_eq!(effect.offset(), Offset::ZERO);
    assert!(!effect.is_in_progress());
    assert!(
        handler.visual.borrow().len() > visual_before_frames,
        "settle frames drive the visual hook"
    );
    assert_eq!(
        handler.events.borrow().len(),
        events_before + 1,
        "no threshold events during the settle animation"
    );
}

#[test]
fn new_drag_supersedes_settle_animation() {
    let (runtime, _handler, effect) = horizontal_engine();
    let handle = runtime.handle();
    effect.apply_to_scroll(Offset::new(100.0, 0.0), ScrollSource::UserInput, consume_nothing);

    effect.apply_to_fling(Velocity::ZERO, |velocity| async move { velocity });
    let frame = drive_frames(&handle, 0, 4);
    let mid_settle = effect.offset();
    assert!(mid_settle.x > 0.0 && mid_settle.x < 30.0 + 1e-3);

    // The drag writes through the live value and stops the animation.
    effect.apply_to_scroll(Offset::new(10.0, 0.0), ScrollSource::UserInput, consume_nothing);
    let committed = effect.offset();
    assert_eq!(committed, mid_settle + Offset::new(10.0, 0.0) * DAMPENING_MULTIPLIER);

    drive_frames(&handle, frame, 120);
    assert_eq!(effect.offset(), committed, "stale settle frames must not move the offset");
}

#[test]
fn phase_walks_rest_dragging_settling_rest() {
    let (runtime, _handler, effect) = horizontal_engine();
    let handle = runtime.handle();
    assert_eq!(effect.phase(), GesturePhase::AtRest);

    effect.apply_to_scroll(Offset::new(50.0, 0.0), ScrollSource::UserInput, consume_nothing);
    assert_eq!(effect.phase(), GesturePhase::Dragging);

    effect.apply_to_fling(Velocity::ZERO, |velocity| async move { velocity });
    assert_eq!(effect.phase(), GesturePhase::Settling);

    drive_frames(&handle, 0, 240);
    assert_eq!(effect.phase(), GesturePhase::AtRest);
}

#[test]
fn releasing_the_drag_by_absorption_returns_to_rest() {
    let (_runtime, _handler, effect) = horizontal_engine();
    effect.apply_to_scroll(Offset::new(50.0, 0.0), ScrollSource::UserInput, consume_nothing);
    let current = effect.offset();

    effect.apply_to_scroll(-current, ScrollSource::UserInput, consume_nothing);
    assert_eq!(effect.phase(), GesturePhase::AtRest);
}

#[test]
fn absorbed_toward_zero_per_axis_rules() {
    // Same sign or rest: nothing absorbed.
    assert_eq!(absorbed_toward_zero(10.0, 5.0), 0.0);
    assert_eq!(absorbed_toward_zero(0.0, -5.0), 0.0);
    assert_eq!(absorbed_toward_zero(10.0, 0.0), 0.0);
    // Opposite sign within the offset: fully absorbed.
    assert_eq!(absorbed_toward_zero(10.0, -4.0), -4.0);
    assert_eq!(absorbed_toward_zero(-10.0, 4.0), 4.0);
    // Opposite sign beyond the offset: capped at reaching zero.
    assert_eq!(absorbed_toward_zero(10.0, -25.0), -10.0);
    assert_eq!(absorbed_toward_zero(-10.0, 25.0), 10.0);
}
