//! Cross-thread access to an engine.
//!
//! The engine only runs on its owning thread. Other threads hold an
//! [`EngineRemote`] and post closures to it; the owner runs them in posting
//! order when it calls [`SharedEngine::process_pending`](crate::SharedEngine::process_pending).
//!
//! ```
//! use accessid_core::{Configuration, SharedEngine};
//!
//! let engine = SharedEngine::new();
//! let remote = engine.remote();
//!
//! let depth = std::thread::spawn(move || {
//!     remote.post(|engine| engine.configure(&Configuration::new("Worker")));
//!     remote.request(|engine| engine.depth())
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(engine.process_pending(), 2);
//! assert_eq!(depth.recv().unwrap(), 0);
//! assert_eq!(engine.config().namespace, "Worker");
//! ```

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};

use crate::engine::IdentifierEngine;

/// A unit of work posted to the owning thread.
pub(crate) type EngineJob = Box<dyn FnOnce(&mut IdentifierEngine) + Send + 'static>;

/// Receiving end, owned by the engine handle.
#[derive(Debug)]
pub(crate) struct Mailbox {
    sender: Sender<EngineJob>,
    receiver: Receiver<EngineJob>,
}

impl Mailbox {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub(crate) fn remote(&self) -> EngineRemote {
        EngineRemote {
            sender: self.sender.clone(),
        }
    }

    /// Next queued job, if any.
    pub(crate) fn try_next(&self) -> Option<EngineJob> {
        self.receiver.try_recv().ok()
    }

    pub(crate) fn pending(&self) -> usize {
        self.receiver.len()
    }
}

/// A `Send` handle that queues work for an engine's owning thread.
///
/// Use it for configuration, generation and diagnostics. Breadcrumbs pushed
/// or popped by a job bypass the scope arena of any `ContextPropagator` over
/// the same engine; the propagator notices the depth mismatch on its next
/// scope operation and records a warning, but its scopes no longer pop the
/// segments they pushed.
#[derive(Debug, Clone)]
pub struct EngineRemote {
    sender: Sender<EngineJob>,
}

impl EngineRemote {
    /// Queue `job` to run on the owning thread.
    ///
    /// Returns `false` if the engine has been dropped. See the type docs
    /// before pushing or popping breadcrumbs from a job.
    pub fn post<F>(&self, job: F) -> bool
    where
        F: FnOnce(&mut IdentifierEngine) + Send + 'static,
    {
        self.sender.send(Box::new(job)).is_ok()
    }

    /// Queue `job` and receive its result once the owner has run it.
    ///
    /// The receiver reports disconnection if the engine is dropped before the
    /// job runs.
    pub fn request<F, R>(&self, job: F) -> Receiver<R>
    where
        F: FnOnce(&mut IdentifierEngine) -> R + Send + 'static,
        R: Send + 'static,
    {
        let (reply, result) = bounded(1);
        self.post(move |engine| {
            // The requester may have stopped waiting.
            let _ = reply.send(job(engine));
        });
        result
    }
}

static_assertions::assert_impl_all!(EngineRemote: Send, Sync, Clone);
