//! Frame clock facade over the runtime's frame-callback queue.
//!
//! Animation code registers one-shot callbacks through [`FrameClock`] and
//! keeps the returned [`FrameCallbackRegistration`] alive; dropping the
//! registration cancels the callback. Async code can instead `.await` the
//! [`NextFrame`] future.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::runtime::{FrameCallbackId, RuntimeHandle};

#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Registers `callback` to run on the next frame with the frame time in
    /// nanoseconds.
    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        match self.runtime.register_frame_callback(callback) {
            Some(id) => FrameCallbackRegistration {
                runtime: self.runtime.clone(),
                id: Some(id),
            },
            None => FrameCallbackRegistration {
                runtime: self.runtime.clone(),
                id: None,
            },
        }
    }

    /// Future resolving to the next frame's time in nanoseconds.
    pub fn next_frame(&self) -> NextFrame {
        NextFrame {
            clock: self.clone(),
            state: Rc::new(RefCell::new(NextFrameState {
                registration: None,
                time: None,
                waker: None,
            })),
        }
    }
}

/// Keeps a frame callback alive; dropping it cancels the callback.
pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

struct NextFrameState {
    registration: Option<FrameCallbackRegistration>,
    time: Option<u64>,
    waker: Option<Waker>,
}

/// Future returned by [`FrameClock::next_frame`].
pub struct NextFrame {
    clock: FrameClock,
    state: Rc<RefCell<NextFrameState>>,
}

impl Future for NextFrame {
    type Output = u64;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(time) = self.state.borrow().time {
            return Poll::Ready(time);
        }

        {
            let mut state = self.state.borrow_mut();
            state.waker = Some(cx.waker().clone());
            if state.registration.is_none() {
                drop(state);
                let weak = Rc::downgrade(&self.state);
                let registration = self.clock.with_frame_nanos(move |time| {
                    if let Some(state) = weak.upgrade() {
                        let mut state = state.borrow_mut();
                        state.time = Some(time);
                        state.registration.take();
                        if let Some(waker) = state.waker.take() {
                            waker.wake();
                        }
                    }
                });
                self.state.borrow_mut().registration = Some(registration);
            }
        }

        if let Some(time) = self.state.borrow().time {
            Poll::Ready(time)
        } else {
            Poll::Pending
        }
    }
}

impl Drop for NextFrame {
    fn drop(&mut self) {
        self.state.borrow_mut().registration.take();
    }
}
