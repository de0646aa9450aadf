//! Single-consumer task queue owned by the UI thread.
//!
//! Element handles are `Rc` and never cross threads. Background callers post
//! closures through a [`UiHandle`] and block until the UI thread has run them;
//! only `Send` results travel back.

use std::cell::RefCell;
use std::panic::AssertUnwindSafe;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use crossbeam_channel::RecvTimeoutError;
use crossbeam_channel::Sender;
use thiserror::Error;
use tracing::error;

use crate::element::ElementRef;

type Task = Box<dyn FnOnce(&Window) + Send>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("UI thread is no longer running")]
    Closed,
    #[error("UI task was dropped before completing")]
    Abandoned,
}

/// Top-level window. Its content is the root of the native tree.
#[derive(Debug, Default)]
pub struct Window {
    content: RefCell<Option<ElementRef>>,
}

impl Window {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> Option<ElementRef> {
        self.content.borrow().clone()
    }

    pub fn set_content(&self, content: Option<ElementRef>) {
        *self.content.borrow_mut() = content;
    }
}

/// The consuming end. Lives on, and is driven by, the UI thread.
pub struct UiDispatcher {
    window: Window,
    receiver: Receiver<Task>,
}

/// The posting end. Cheap to clone and safe to share across threads.
#[derive(Clone)]
pub struct UiHandle {
    sender: Sender<Task>,
}

impl UiDispatcher {
    pub fn new() -> (Self, UiHandle) {
        let (sender, receiver) = crossbeam_channel::unbounded();
        (
            Self {
                window: Window::new(),
                receiver,
            },
            UiHandle { sender },
        )
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Runs tasks until every [`UiHandle`] has been dropped.
    pub fn run(&self) {
        while let Ok(task) = self.receiver.recv() {
            self.run_task(task);
        }
    }

    /// Runs tasks for up to `timeout`. Returns false once all handles are gone.
    pub fn run_for(&self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            match self.receiver.recv_deadline(deadline) {
                Ok(task) => self.run_task(task),
                Err(RecvTimeoutError::Timeout) => return true,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    /// Runs whatever is queued without blocking. Returns the number of tasks run.
    pub fn pump(&self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.receiver.try_recv() {
            self.run_task(task);
            ran += 1;
        }
        ran
    }

    fn run_task(&self, task: Task) {
        // A panicking task drops its reply sender; the caller sees Abandoned.
        if std::panic::catch_unwind(AssertUnwindSafe(|| task(&self.window))).is_err() {
            error!("UI task panicked");
        }
    }
}

impl UiHandle {
    /// Runs `f` on the UI thread and waits for its result.
    pub fn invoke<T, F>(&self, f: F) -> Result<T, DispatchError>
    where
        F: FnOnce(&Window) -> T + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        let task: Task = Box::new(move |window| {
            let _ = reply_tx.send(f(window));
        });
        self.sender.send(task).map_err(|_| DispatchError::Closed)?;
        reply_rx.recv().map_err(|_| DispatchError::Abandoned)
    }
}

/// Spawns a dedicated UI thread, runs `setup` on it, then serves tasks until
/// every handle is dropped.
pub fn spawn_ui_thread<S>(setup: S) -> std::io::Result<(UiHandle, thread::JoinHandle<()>)>
where
    S: FnOnce(&Window) + Send + 'static,
{
    let (handle_tx, handle_rx) = crossbeam_channel::bounded(1);
    let join = thread::Builder::new()
        .name("ui".to_string())
        .spawn(move || {
            let (dispatcher, handle) = UiDispatcher::new();
            setup(dispatcher.window());
            if handle_tx.send(handle).is_err() {
                return;
            }
            dispatcher.run();
        })?;
    let handle = handle_rx
        .recv()
        .map_err(|_| std::io::Error::other("UI thread exited during setup"))?;
    Ok((handle, join))
}
