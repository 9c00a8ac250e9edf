//! Injectable, thread-confined engine handle.
//!
//! [`SharedEngine`] is a cheap, clonable handle to one [`IdentifierEngine`].
//! Test harnesses create one per test with [`SharedEngine::new`]; applications
//! that want process-wide state use [`global_engine`].
//!
//! Every call checks that it runs on the thread that created the handle (see
//! [`thread_check`](crate::thread_check)). Other threads go through
//! [`SharedEngine::remote`].

use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::breadcrumb::Breadcrumb;
use crate::composer::IdentifierRequest;
use crate::config::{Configuration, IdentifierConfig};
use crate::debug_log::{DebugEvent, Operation};
use crate::engine::IdentifierEngine;
use crate::mailbox::{EngineRemote, Mailbox};
use crate::thread_check::ThreadAffinity;

const WRONG_THREAD: &str = "identifier engine used outside its owning thread";

/// Process-wide engine (lazy initialized).
static GLOBAL_ENGINE: OnceLock<SharedEngine> = OnceLock::new();

/// The process-wide engine.
///
/// Created on first use and confined to the main thread registered with
/// [`set_main_thread`](crate::thread_check::set_main_thread), or to the
/// calling thread if none was registered.
pub fn global_engine() -> &'static SharedEngine {
    GLOBAL_ENGINE.get_or_init(|| {
        SharedEngine::with_affinity(IdentifierEngine::new(), ThreadAffinity::main_thread())
    })
}

/// A thread-confined handle to an [`IdentifierEngine`].
#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<IdentifierEngine>>,
    mailbox: Arc<Mailbox>,
    affinity: ThreadAffinity,
}

impl SharedEngine {
    /// Create a handle to a fresh engine owned by the current thread.
    pub fn new() -> Self {
        Self::from_engine(IdentifierEngine::new())
    }

    /// Wrap an existing engine, owned by the current thread.
    pub fn from_engine(engine: IdentifierEngine) -> Self {
        Self::with_affinity(engine, ThreadAffinity::current())
    }

    fn with_affinity(engine: IdentifierEngine, affinity: ThreadAffinity) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
            mailbox: Arc::new(Mailbox::new()),
            affinity,
        }
    }

    /// The thread this engine is confined to.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    /// Whether `self` and `other` refer to the same engine.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Run `f` with shared access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&IdentifierEngine) -> R) -> R {
        self.affinity.check(WRONG_THREAD);
        f(&self.inner.lock())
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut IdentifierEngine) -> R) -> R {
        self.affinity.check(WRONG_THREAD);
        f(&mut self.inner.lock())
    }

    // =========================================================================
    // Cross-thread marshalling
    // =========================================================================

    /// A `Send` handle other threads use to queue work for this engine.
    pub fn remote(&self) -> EngineRemote {
        self.mailbox.remote()
    }

    /// Run every job queued through [`remote`](Self::remote), oldest first.
    /// Returns how many ran.
    pub fn process_pending(&self) -> usize {
        self.affinity.check(WRONG_THREAD);
        let mut ran = 0;
        while let Some(job) = self.mailbox.try_next() {
            job(&mut *self.inner.lock());
            ran += 1;
        }
        ran
    }

    /// Number of jobs waiting for [`process_pending`](Self::process_pending).
    pub fn pending_jobs(&self) -> usize {
        self.mailbox.pending()
    }

    // =========================================================================
    // Forwarded engine operations
    // =========================================================================

    pub fn configure(&self, changes: &Configuration) {
        self.with_mut(|engine| engine.configure(changes))
    }

    pub fn reset_to_defaults(&self) {
        self.with_mut(IdentifierEngine::reset_to_defaults)
    }

    pub fn set_screen_context(&self, name: impl Into<String>) {
        self.with_mut(|engine| engine.set_screen_context(name))
    }

    pub fn clear_screen_context(&self) {
        self.with_mut(IdentifierEngine::clear_screen_context)
    }

    pub fn push_context(&self, name: impl Into<String>) -> bool {
        self.with_mut(|engine| engine.push_context(name))
    }

    pub fn pop_context(&self) -> Option<String> {
        self.with_mut(IdentifierEngine::pop_context)
    }

    /// Compose an identifier for `object_id` with `role`.
    pub fn generate_id(
        &self,
        object_id: impl Into<String>,
        role: impl Into<String>,
        context_override: Option<&str>,
    ) -> String {
        let mut request = IdentifierRequest::new(object_id, role);
        request.context_override = context_override.map(str::to_string);
        self.with_mut(|engine| engine.generate_id(&request))
    }

    pub fn generate(&self, request: &IdentifierRequest) -> String {
        self.with_mut(|engine| engine.generate_id(request))
    }

    pub fn automatic_identifier(&self, request: &IdentifierRequest) -> Option<String> {
        self.with_mut(|engine| engine.automatic_identifier(request))
    }

    pub fn resolve_identifier(
        &self,
        explicit: Option<&str>,
        request: &IdentifierRequest,
    ) -> Option<String> {
        self.with_mut(|engine| engine.resolve_identifier(explicit, request))
    }

    /// Snapshot of the configuration.
    pub fn config(&self) -> IdentifierConfig {
        self.with(|engine| engine.config().clone())
    }

    pub fn breadcrumb(&self) -> Breadcrumb {
        self.with(IdentifierEngine::breadcrumb)
    }

    pub fn depth(&self) -> usize {
        self.with(IdentifierEngine::depth)
    }

    pub fn session(&self) -> u64 {
        self.with(IdentifierEngine::session)
    }

    /// Snapshot of the debug log, oldest first.
    pub fn debug_log(&self) -> Vec<DebugEvent> {
        self.with(|engine| engine.debug_log().to_vec())
    }

    pub fn clear_debug_log(&self) {
        self.with_mut(IdentifierEngine::clear_debug_log)
    }

    pub fn formatted_debug_log(&self) -> String {
        self.with(IdentifierEngine::formatted_debug_log)
    }

    pub fn record_warning(&self, operation: Operation, message: impl Into<String>) {
        self.with_mut(|engine| engine.record_warning(operation, message))
    }
}

impl Default for SharedEngine {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(SharedEngine: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let engine = SharedEngine::new();
        let other = engine.clone();
        engine.push_context("Outer");

        assert!(engine.ptr_eq(&other));
        assert_eq!(other.depth(), 1);
    }

    #[test]
    fn test_generate_id_forwarding() {
        let engine = SharedEngine::new();
        engine.configure(&Configuration::new("CarManager").enabled(true));
        engine.set_screen_context("FuelView");

        let id = engine.generate_id("Odometer", "label", Some("TripView"));
        assert_eq!(id, "CarManager.TripView.label.odometer");
    }

    #[test]
    fn test_remote_work_runs_on_owner() {
        let engine = SharedEngine::new();
        let remote = engine.remote();

        std::thread::spawn(move || {
            remote.post(|engine| engine.set_screen_context("Settings"));
        })
        .join()
        .unwrap();

        assert_eq!(engine.pending_jobs(), 1);
        assert!(engine.config().screen_context.is_none());
        assert_eq!(engine.process_pending(), 1);
        assert_eq!(engine.config().screen_context.as_deref(), Some("Settings"));
    }

    #[cfg(debug_assertions)]
    #[test]
    fn test_wrong_thread_panics() {
        let engine = SharedEngine::new();
        let moved = engine.clone();

        let result = std::thread::spawn(move || moved.push_context("Elsewhere")).join();

        assert!(result.is_err());
        assert_eq!(engine.depth(), 0);
    }

    #[test]
    fn test_global_engine_is_singleton() {
        let a = global_engine();
        let b = global_engine();
        assert!(a.ptr_eq(b));
    }
}
