//! Single-threaded runtime: frame callbacks, local tasks, and futures.
//!
//! One `Runtime` instance owns all mutable state behind an `Rc`; handles are
//! weak so that dropping the runtime cancels everything outstanding. The host
//! drives it by calling [`RuntimeHandle::drain_frame_callbacks`] once per
//! frame (with the frame time in nanoseconds) and [`RuntimeHandle::drain_ui`]
//! whenever queued work may be pending.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use crate::frame_clock::FrameClock;
use crate::platform::RuntimeScheduler;

/// Identifier for a registered one-shot frame callback.
pub type FrameCallbackId = u64;

struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<Box<dyn FnOnce(u64) + 'static>>,
}

struct TaskEntry {
    id: u64,
    future: Pin<Box<dyn Future<Output = ()> + 'static>>,
}

struct RuntimeInner {
    scheduler: Arc<dyn RuntimeScheduler>,
    needs_frame: Cell<bool>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
    next_frame_callback_id: Cell<u64>,
    local_tasks: RefCell<VecDeque<Box<dyn FnOnce() + 'static>>>,
    tasks: RefCell<Vec<TaskEntry>>,
    next_task_id: Cell<u64>,
    task_waker: RefCell<Option<Waker>>,
}

impl RuntimeInner {
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self {
            scheduler,
            needs_frame: Cell::new(false),
            frame_callbacks: RefCell::new(VecDeque::new()),
            next_frame_callback_id: Cell::new(1),
            local_tasks: RefCell::new(VecDeque::new()),
            tasks: RefCell::new(Vec::new()),
            next_task_id: Cell::new(1),
            task_waker: RefCell::new(None),
        }
    }

    fn init_task_waker(this: &Rc<Self>) {
        let waker = RuntimeTaskWaker::new(this.scheduler.clone()).into_waker();
        *this.task_waker.borrow_mut() = Some(waker);
    }

    fn schedule(&self) {
        self.needs_frame.set(true);
        self.scheduler.schedule_frame();
    }

    fn register_frame_callback(&self, callback: Box<dyn FnOnce(u64) + 'static>) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        self.schedule();
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let mut callbacks = self.frame_callbacks.borrow_mut();
        if let Some(index) = callbacks.iter().position(|entry| entry.id == id) {
            callbacks.remove(index);
        }
        let idle = callbacks.is_empty();
        drop(callbacks);
        if idle && !self.has_pending_work() {
            self.needs_frame.set(false);
        }
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        // Take the whole queue first: a callback may re-register (animation
        // frame loops) and must land in the next frame, not this one.
        let mut pending: Vec<Box<dyn FnOnce(u64) + 'static>> = Vec::new();
        {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            while let Some(mut entry) = callbacks.pop_front() {
                if let Some(callback) = entry.callback.take() {
                    pending.push(callback);
                }
            }
        }
        for callback in pending {
            callback(frame_time_nanos);
        }
        if self.frame_callbacks.borrow().is_empty() && !self.has_pending_work() {
            self.needs_frame.set(false);
        }
    }

    fn enqueue_local_task(&self, task: Box<dyn FnOnce() + 'static>) {
        self.local_tasks.borrow_mut().push_back(task);
        self.schedule();
    }

    fn spawn_task(&self, future: Pin<Box<dyn Future<Output = ()> + 'static>>) -> u64 {
        let id = self.next_task_id.get();
        self.next_task_id.set(id + 1);
        self.tasks.borrow_mut().push(TaskEntry { id, future });
        self.schedule();
        id
    }

    fn cancel_task(&self, id: u64) {
        self.tasks.borrow_mut().retain(|entry| entry.id != id);
    }

    fn poll_tasks(&self) -> bool {
        let waker = match self.task_waker.borrow().as_ref() {
            Some(waker) => waker.clone(),
            None => return false,
        };
        let mut cx = Context::from_waker(&waker);
        let entries = std::mem::take(&mut *self.tasks.borrow_mut());
        let mut made_progress = false;
        let mut still_pending = Vec::with_capacity(entries.len());
        for mut entry in entries {
            match entry.future.as_mut().poll(&mut cx) {
                Poll::Ready(()) => made_progress = true,
                Poll::Pending => still_pending.push(entry),
            }
        }
        if !still_pending.is_empty() {
            self.tasks.borrow_mut().extend(still_pending);
        }
        made_progress
    }

    fn drain_ui(&self) {
        loop {
            let mut executed = false;
            loop {
                let task = self.local_tasks.borrow_mut().pop_front();
                match task {
                    Some(task) => {
                        executed = true;
                        task();
                    }
                    None => break,
                }
            }
            if self.poll_tasks() {
                executed = true;
            }
            if !executed {
                break;
            }
        }
    }

    fn has_pending_work(&self) -> bool {
        let local_pending = self
            .local_tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        let async_pending = self
            .tasks
            .try_borrow()
            .map(|tasks| !tasks.is_empty())
            .unwrap_or(true);
        local_pending || async_pending
    }
}

/// Owner of the runtime state. Keep it alive for as long as handles are used;
/// a dropped runtime turns all handle operations into no-ops.
#[derive(Clone)]
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        let inner = Rc::new(RuntimeInner::new(scheduler));
        RuntimeInner::init_task_waker(&inner);
        Self { inner }
    }

    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Whether the host should schedule another frame.
    pub fn needs_frame(&self) -> bool {
        self.inner.needs_frame.get()
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.handle())
    }
}

/// No-op scheduler for hosts that poll the runtime themselves (and for tests).
#[derive(Default)]
pub struct DefaultScheduler;

impl RuntimeScheduler for DefaultScheduler {
    fn schedule_frame(&self) {}
}

/// Weak, cheaply clonable reference to a [`Runtime`].
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

/// Handle to a spawned future; cancelling drops the future without polling it
/// again. Dropping the handle leaves the task running.
pub struct TaskHandle {
    id: u64,
    runtime: RuntimeHandle,
}

impl RuntimeHandle {
    /// Registers a one-shot callback for the next frame. Returns `None` when
    /// the runtime is gone.
    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        self.inner
            .upgrade()
            .map(|inner| inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    /// Runs every callback registered for this frame, in registration order.
    /// Callbacks registered while draining run on the following frame.
    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    /// Schedules work that runs the next time the queue is drained.
    ///
    /// The closure never leaves the runtime thread, so it may capture
    /// `Rc`/`RefCell` values.
    pub fn enqueue_ui_task(&self, task: Box<dyn FnOnce() + 'static>) {
        if let Some(inner) = self.inner.upgrade() {
            inner.enqueue_local_task(task);
        } else {
            log::warn!("enqueue_ui_task on a dropped runtime; running inline");
            task();
        }
    }

    /// Spawns a future on the runtime's local executor.
    pub fn spawn_ui<F>(&self, fut: F) -> Option<TaskHandle>
    where
        F: Future<Output = ()> + 'static,
    {
        self.inner.upgrade().map(|inner| {
            let id = inner.spawn_task(Box::pin(fut));
            TaskHandle {
                id,
                runtime: self.clone(),
            }
        })
    }

    pub fn cancel_task(&self, id: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_task(id);
        }
    }

    /// Runs queued local tasks and polls spawned futures until quiescent.
    pub fn drain_ui(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_ui();
        }
    }

    pub fn has_frame_callbacks(&self) -> bool {
        self.inner
            .upgrade()
            .map(|inner| !inner.frame_callbacks.borrow().is_empty())
            .unwrap_or(false)
    }

    pub fn frame_clock(&self) -> FrameClock {
        FrameClock::new(self.clone())
    }
}

impl TaskHandle {
    pub fn cancel(self) {
        self.runtime.cancel_task(self.id);
    }
}

struct RuntimeTaskWaker {
    scheduler: Arc<dyn RuntimeScheduler>,
}

impl RuntimeTaskWaker {
    // Only the scheduler crosses into the waker; it is Send + Sync while the
    // runtime itself is not.
    fn new(scheduler: Arc<dyn RuntimeScheduler>) -> Self {
        Self { scheduler }
    }

    fn into_waker(self) -> Waker {
        futures_task::waker(Arc::new(self))
    }
}

impl futures_task::ArcWake for RuntimeTaskWaker {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.scheduler.schedule_frame();
    }
}
