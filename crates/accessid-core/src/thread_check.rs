//! Thread confinement for the identifier engine.
//!
//! The breadcrumb stack must be mutated in the exact depth-first order of the
//! tree being decorated, so every engine operation runs on a single owning
//! thread. [`SharedEngine`](crate::SharedEngine) records a [`ThreadAffinity`]
//! when it is created and checks it on every access.
//!
//! Work that originates on another thread is marshalled onto the owning
//! thread through an [`EngineRemote`](crate::EngineRemote).
//!
//! # Thread Safety Checks
//!
//! Checks are enabled by default in debug builds and disabled in release
//! builds; [`set_thread_checks_enabled`] overrides the default.
//!
//! ```
//! use accessid_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! assert!(affinity.is_same_thread());
//! affinity.assert_same_thread();
//! ```

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

/// Global storage for the main thread ID.
static MAIN_THREAD_ID: OnceLock<ThreadId> = OnceLock::new();

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(cfg!(debug_assertions));

/// Register the current thread as the main (UI) thread.
///
/// The process-wide engine returned by [`global_engine`](crate::global_engine)
/// is confined to this thread. Call it once at startup, before the engine is
/// first used.
///
/// # Panics
///
/// Panics if a different thread was already registered.
pub fn set_main_thread() {
    let current = std::thread::current().id();
    if MAIN_THREAD_ID.set(current).is_err() && MAIN_THREAD_ID.get() != Some(&current) {
        panic!(
            "set_main_thread() called from different thread than original. \
             The main thread ID can only be set once."
        );
    }
}

/// Get the main thread ID if it has been set.
#[inline]
pub fn main_thread_id() -> Option<ThreadId> {
    MAIN_THREAD_ID.get().copied()
}

/// Enable or disable runtime thread checks.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Records the thread that owns a piece of engine state.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Bind to the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Bind to the registered main thread, or the current one if none is set.
    pub fn main_thread() -> Self {
        Self {
            thread_id: main_thread_id().unwrap_or_else(|| std::thread::current().id()),
        }
    }

    /// Get the thread ID this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Assert that we are on the owning thread.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message if called from a different thread.
    #[inline]
    pub fn assert_same_thread(&self) {
        self.assert_same_thread_with_msg("identifier engine accessed from wrong thread")
    }

    /// Assert that we are on the owning thread, with a custom message.
    ///
    /// # Panics
    ///
    /// Panics if called from a different thread.
    pub fn assert_same_thread_with_msg(&self, msg: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(msg);
        }
    }

    /// Assert only when runtime checks are enabled.
    #[inline]
    pub fn check(&self, msg: &str) {
        if are_thread_checks_enabled() {
            self.assert_same_thread_with_msg(msg);
        }
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, msg: &str) -> ! {
        let current = std::thread::current();
        let current_name = current.name().unwrap_or("<unnamed>");
        let current_id = current.id();

        panic!(
            "\n\
            ══════════════════════════════════════════════════════════════════════\n\
            ENGINE THREAD VIOLATION\n\
            ══════════════════════════════════════════════════════════════════════\n\
            \n\
            {msg}\n\
            \n\
            Engine is owned by thread: {:?}\n\
            Current thread: \"{current_name}\" (ID: {current_id:?})\n\
            \n\
            Breadcrumb pushes and pops must follow the depth-first order of the\n\
            tree being decorated, so the engine only accepts calls from the\n\
            thread that owns it.\n\
            \n\
            POSSIBLE SOLUTIONS:\n\
            \n\
            1. Obtain an EngineRemote on the owning thread and post the work:\n\
               let remote = engine.remote();\n\
               remote.post(|engine| engine.set_screen_context(\"Settings\"));\n\
            \n\
            2. Drain posted work on the owning thread:\n\
               engine.process_pending();\n\
            \n\
            ══════════════════════════════════════════════════════════════════════",
            self.thread_id
        )
    }
}
