//! Scoped context propagation.
//!
//! [`ContextPropagator`] is the bridge between a depth-first tree walk and
//! the engine's breadcrumb stack. Entering a decorated subtree returns a
//! [`ScopeHandle`]; dropping the handle closes the scope, so the push and the
//! pop always pair up on every exit path.
//!
//! Open scopes are kept in an arena keyed by [`ScopeId`]. Keys are versioned,
//! so a handle outliving its scope (after an out-of-order release or a reset)
//! can never close a newer scope that reused the slot.

use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use accessid_core::logging::{span_names, targets};
use accessid_core::{
    Breadcrumb, IdentifierRequest, Operation, PerfSpan, SharedEngine, global_engine,
};
use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::environment::{EnvironmentOverrides, IdentifierEnvironment, Propagated};

new_key_type! {
    /// Identifies one open scope.
    ///
    /// Becomes invalid when the scope is released or the engine is reset.
    pub struct ScopeId;
}

#[derive(Debug, Clone)]
pub(crate) struct ScopeFrame {
    pub(crate) parent: Option<ScopeId>,
    /// Breadcrumb name, `None` for environment-only scopes.
    pub(crate) name: Option<String>,
    pub(crate) overrides: EnvironmentOverrides,
    /// Breadcrumb and depth right after the scope was entered.
    pub(crate) breadcrumb: Breadcrumb,
    pub(crate) depth: usize,
}

/// The chain of open scopes. Every frame is an ancestor of `current`, so the
/// arena always holds a single path from the outermost scope inward.
#[derive(Debug, Default)]
pub(crate) struct ScopeTree {
    frames: SlotMap<ScopeId, ScopeFrame>,
    current: Option<ScopeId>,
    session: u64,
}

impl ScopeTree {
    /// Drop every frame if the engine was reset since they were opened.
    fn sync_session(&mut self, session: u64) {
        if self.session != session {
            if !self.frames.is_empty() {
                tracing::debug!(
                    target: targets::PROPAGATOR,
                    dropped = self.frames.len(),
                    "engine reset, discarding open scopes"
                );
            }
            self.frames.clear();
            self.current = None;
            self.session = session;
        }
    }

    /// Frames from `from` outward to the outermost scope.
    pub(crate) fn ancestry(
        &self,
        from: Option<ScopeId>,
    ) -> impl Iterator<Item = (ScopeId, &ScopeFrame)> + Clone + '_ {
        let lookup = move |id: ScopeId| self.frames.get(id).map(|frame| (id, frame));
        std::iter::successors(from.and_then(lookup), move |(_, frame)| {
            frame.parent.and_then(lookup)
        })
    }

    pub(crate) fn current(&self) -> Option<ScopeId> {
        self.current
    }

    pub(crate) fn len(&self) -> usize {
        self.frames.len()
    }
}

/// Opens and closes subtree scopes against a [`SharedEngine`].
///
/// Clones share both the engine and the open scopes. Every operation must
/// run on the engine's owning thread.
#[derive(Debug, Clone)]
pub struct ContextPropagator {
    engine: SharedEngine,
    scopes: Arc<Mutex<ScopeTree>>,
}

static GLOBAL_PROPAGATOR: OnceLock<ContextPropagator> = OnceLock::new();

impl ContextPropagator {
    /// Create a propagator with its own scope arena over `engine`.
    ///
    /// The arena is not shared with other propagators over the same engine.
    /// Decorators that nest scopes inside each other must use clones of one
    /// propagator; interleaving scopes from independent propagators is
    /// detected and recorded as a warning.
    pub fn new(engine: SharedEngine) -> Self {
        let session = engine.session();
        Self {
            engine,
            scopes: Arc::new(Mutex::new(ScopeTree {
                session,
                ..ScopeTree::default()
            })),
        }
    }

    /// The process-wide propagator over [`global_engine`].
    ///
    /// Every call returns a clone of the same propagator, so scopes opened
    /// through one handle are visible to all of them.
    pub fn global() -> Self {
        GLOBAL_PROPAGATOR
            .get_or_init(|| Self::new(global_engine().clone()))
            .clone()
    }

    pub fn engine(&self) -> &SharedEngine {
        &self.engine
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Enter the subtree named `name`. Its name becomes the innermost
    /// breadcrumb segment until the returned handle is dropped.
    pub fn enter_subtree(&self, name: impl Into<String>) -> ScopeHandle {
        self.open(Some(name.into()), EnvironmentOverrides::default())
    }

    /// Enter the subtree named `name` and apply `overrides` to it.
    pub fn enter_subtree_with(
        &self,
        name: impl Into<String>,
        overrides: EnvironmentOverrides,
    ) -> ScopeHandle {
        self.open(Some(name.into()), overrides)
    }

    /// Apply `overrides` to a subtree without adding a breadcrumb segment.
    pub fn enter_environment(&self, overrides: EnvironmentOverrides) -> ScopeHandle {
        self.open(None, overrides)
    }

    fn open(&self, name: Option<String>, overrides: EnvironmentOverrides) -> ScopeHandle {
        let _span =
            tracing::trace_span!(target: targets::PROPAGATOR, "scope", operation = span_names::SCOPE)
                .entered();

        self.check_in_sync(Operation::PushContext);
        if let Some(name) = &name {
            self.engine.push_context(name.clone());
        }
        let (session, breadcrumb, depth) = self
            .engine
            .with(|engine| (engine.session(), engine.breadcrumb(), engine.depth()));

        let mut tree = self.scopes.lock();
        tree.sync_session(session);
        let parent = tree.current;
        let id = tree.frames.insert(ScopeFrame {
            parent,
            name,
            overrides,
            breadcrumb,
            depth,
        });
        tree.current = Some(id);
        tracing::trace!(target: targets::PROPAGATOR, ?id, depth, "scope entered");

        ScopeHandle {
            propagator: self.clone(),
            id,
            released: false,
            _not_send: PhantomData,
        }
    }

    /// Close the scope `id`. Scopes opened inside it and still open are
    /// closed first. Unknown or stale ids are ignored.
    fn release(&self, id: ScopeId) {
        self.check_in_sync(Operation::PopContext);
        let session = self.engine.session();
        let mut tree = self.scopes.lock();
        tree.sync_session(session);

        let Some(released_name) = tree.frames.get(id).map(|frame| frame.name.clone()) else {
            tracing::trace!(target: targets::PROPAGATOR, ?id, "stale scope released, ignoring");
            return;
        };

        let mut pops = 0;
        let mut dangling = 0;
        while let Some(top) = tree.current {
            let Some(frame) = tree.frames.remove(top) else {
                break;
            };
            tree.current = frame.parent;
            if frame.name.is_some() {
                pops += 1;
            }
            if top == id {
                break;
            }
            dangling += 1;
        }
        drop(tree);

        for _ in 0..pops {
            self.engine.pop_context();
        }

        if dangling > 0 {
            let label = released_name.as_deref().unwrap_or("<environment>");
            tracing::warn!(
                target: targets::PROPAGATOR,
                scope = label,
                dangling,
                "scope released while inner scopes were still open"
            );
            self.engine.record_warning(
                Operation::PopContext,
                format!("{label} released out of order, closed {dangling} inner scope(s)"),
            );
        }
    }

    /// Warn when the engine stack no longer matches the innermost open scope,
    /// meaning something pushed or popped it outside this propagator.
    fn check_in_sync(&self, operation: Operation) {
        let (session, depth) = self
            .engine
            .with(|engine| (engine.session(), engine.depth()));
        let expected = {
            let mut tree = self.scopes.lock();
            tree.sync_session(session);
            tree.current
                .and_then(|id| tree.frames.get(id))
                .map(|frame| frame.depth)
        };
        let Some(expected) = expected.filter(|&expected| expected != depth) else {
            return;
        };
        tracing::warn!(
            target: targets::PROPAGATOR,
            expected,
            depth,
            "breadcrumb stack changed outside this propagator"
        );
        self.engine.record_warning(
            operation,
            format!("breadcrumb depth {depth} does not match innermost scope depth {expected}"),
        );
    }

    fn update_overrides(&self, id: ScopeId, update: impl FnOnce(&mut EnvironmentOverrides)) {
        let session = self.engine.session();
        let mut tree = self.scopes.lock();
        tree.sync_session(session);
        if let Some(frame) = tree.frames.get_mut(id) {
            update(&mut frame.overrides);
        }
    }

    /// The environment for `id`, or `None` once the scope is gone.
    fn environment_at(&self, id: ScopeId) -> Option<IdentifierEnvironment> {
        let (session, config) = self
            .engine
            .with(|engine| (engine.session(), engine.config().clone()));
        let mut tree = self.scopes.lock();
        tree.sync_session(session);
        let frame = tree.frames.get(id)?;
        let (breadcrumb, depth) = (frame.breadcrumb.clone(), frame.depth);
        let chain = tree.ancestry(Some(id)).map(|(_, frame)| &frame.overrides);
        Some(IdentifierEnvironment::resolve(&config, chain, breadcrumb, depth))
    }

    /// Number of scopes currently open through this propagator.
    pub fn open_scopes(&self) -> usize {
        let session = self.engine.session();
        let mut tree = self.scopes.lock();
        tree.sync_session(session);
        tree.len()
    }

    pub(crate) fn with_scopes<R>(&self, f: impl FnOnce(&ScopeTree) -> R) -> R {
        let session = self.engine.session();
        let mut tree = self.scopes.lock();
        tree.sync_session(session);
        f(&tree)
    }

    // =========================================================================
    // Environment and generation
    // =========================================================================

    /// The environment visible at the innermost open scope.
    pub fn current(&self) -> IdentifierEnvironment {
        let (session, config, breadcrumb, depth) = self.engine.with(|engine| {
            (
                engine.session(),
                engine.config().clone(),
                engine.breadcrumb(),
                engine.depth(),
            )
        });
        let mut tree = self.scopes.lock();
        tree.sync_session(session);
        let current = tree.current;
        let chain = tree.ancestry(current).map(|(_, frame)| &frame.overrides);
        IdentifierEnvironment::resolve(&config, chain, breadcrumb, depth)
    }

    /// Compose an identifier for an element at the current position, using
    /// the screen context propagated to it.
    pub fn generate_id(&self, object_id: impl Into<String>, role: impl Into<String>) -> String {
        let env = self.current();
        self.generate_in(&env, object_id, role)
    }

    /// Like [`generate_id`](Self::generate_id), but only when automatic
    /// identifiers are enabled at the current position.
    pub fn automatic_identifier(
        &self,
        object_id: impl Into<String>,
        role: impl Into<String>,
    ) -> Option<String> {
        let env = self.current();
        env.auto_ids_enabled
            .then(|| self.generate_in(&env, object_id, role))
    }

    /// Use `explicit` verbatim when present, otherwise fall back to
    /// [`automatic_identifier`](Self::automatic_identifier).
    pub fn resolve_identifier(
        &self,
        explicit: Option<&str>,
        object_id: impl Into<String>,
        role: impl Into<String>,
    ) -> Option<String> {
        match explicit {
            Some(explicit) => Some(explicit.to_string()),
            None => self.automatic_identifier(object_id, role),
        }
    }

    fn generate_in(
        &self,
        env: &IdentifierEnvironment,
        object_id: impl Into<String>,
        role: impl Into<String>,
    ) -> String {
        let _perf = PerfSpan::new(span_names::GENERATE);
        let mut request = IdentifierRequest::new(object_id, role);
        request.context_override = env.screen_context.clone();
        self.engine.generate(&request)
    }

    /// Reset the engine and forget every open scope. Handles still alive
    /// become inert.
    pub fn reset_to_defaults(&self) {
        self.engine.reset_to_defaults();
        let session = self.engine.session();
        self.scopes.lock().sync_session(session);
    }
}

impl Default for ContextPropagator {
    fn default() -> Self {
        Self::new(SharedEngine::new())
    }
}

/// An open subtree scope. Dropping it closes the scope.
///
/// Handles stay on the thread that opened them.
#[must_use = "dropping a ScopeHandle immediately closes its scope"]
#[derive(Debug)]
pub struct ScopeHandle {
    propagator: ContextPropagator,
    id: ScopeId,
    released: bool,
    _not_send: PhantomData<*const ()>,
}

impl ScopeHandle {
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// The breadcrumb name of this scope, `None` for environment-only scopes
    /// or once the scope is gone.
    pub fn name(&self) -> Option<String> {
        self.propagator
            .with_scopes(|tree| tree.frames.get(self.id).and_then(|frame| frame.name.clone()))
    }

    /// Whether the scope is still open.
    pub fn is_open(&self) -> bool {
        self.propagator
            .with_scopes(|tree| tree.frames.contains_key(self.id))
    }

    /// Turn automatic identifiers on or off for this scope's subtree.
    pub fn set_auto_ids(&self, enabled: bool) {
        self.propagator
            .update_overrides(self.id, |overrides| overrides.auto_ids = Propagated::Set(enabled));
    }

    /// Change the screen context for this scope's subtree.
    pub fn set_screen_context(&self, name: impl Into<String>) {
        let name = name.into();
        self.propagator.update_overrides(self.id, |overrides| {
            overrides.screen_context = Propagated::Set(name)
        });
    }

    /// The environment as seen from this scope.
    pub fn environment(&self) -> Option<IdentifierEnvironment> {
        self.propagator.environment_at(self.id)
    }

    /// Close the scope now.
    pub fn release(mut self) {
        self.propagator.release(self.id);
        self.released = true;
    }
}

impl Drop for ScopeHandle {
    fn drop(&mut self) {
        if !self.released {
            self.propagator.release(self.id);
        }
    }
}

static_assertions::assert_impl_all!(ContextPropagator: Send, Sync, Clone);
static_assertions::assert_not_impl_any!(ScopeHandle: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use accessid_core::{Configuration, EventLevel};

    fn propagator() -> ContextPropagator {
        let engine = SharedEngine::new();
        engine.configure(&Configuration::new("CarManager").enabled(true));
        engine.set_screen_context("FuelView");
        ContextPropagator::new(engine)
    }

    #[test]
    fn test_scopes_push_and_pop() {
        let p = propagator();
        {
            let _nav = p.enter_subtree("NavigationView");
            let _section = p.enter_subtree("FuelSection");
            assert_eq!(p.current().breadcrumb.to_string(), "NavigationView.FuelSection");
            assert_eq!(p.open_scopes(), 2);
        }
        assert_eq!(p.engine().depth(), 0);
        assert_eq!(p.open_scopes(), 0);
    }

    #[test]
    fn test_generate_id_at_position() {
        let p = propagator();
        let _nav = p.enter_subtree("NavigationView");
        let _section = p.enter_subtree("FuelSection");
        assert_eq!(
            p.generate_id("AddFuelButton", "button"),
            "CarManager.FuelView.NavigationView.FuelSection.button.addfuelbutton"
        );
    }

    #[test]
    fn test_out_of_order_release_closes_inner_scopes() {
        let p = propagator();
        let outer = p.enter_subtree("Outer");
        let inner = p.enter_subtree("Inner");

        outer.release();
        assert_eq!(p.engine().depth(), 0);
        assert!(!inner.is_open());

        let warning = p.engine().debug_log().into_iter().find(|e| e.level == EventLevel::Warning);
        assert!(warning.is_some());

        // The inner handle is now stale and must not pop anything.
        let _other = p.enter_subtree("Other");
        drop(inner);
        assert_eq!(p.engine().depth(), 1);
    }

    #[test]
    fn test_reset_makes_handles_inert() {
        let p = propagator();
        let scope = p.enter_subtree("Outer");
        p.reset_to_defaults();
        assert_eq!(p.open_scopes(), 0);

        p.engine().push_context("Fresh");
        drop(scope);
        assert_eq!(p.engine().depth(), 1);
        assert!(p.engine().debug_log().is_empty());
    }

    #[test]
    fn test_engine_reset_outside_propagator() {
        let p = propagator();
        let scope = p.enter_subtree("Outer");
        p.engine().reset_to_defaults();

        assert_eq!(p.open_scopes(), 0);
        drop(scope);
        assert_eq!(p.engine().depth(), 0);
    }

    #[test]
    fn test_environment_scope_adds_no_segment() {
        let p = propagator();
        let _env = p.enter_environment(EnvironmentOverrides::new().auto_ids(false));
        let env = p.current();
        assert!(!env.auto_ids_enabled);
        assert_eq!(env.depth, 0);
        assert!(p.automatic_identifier("x", "label").is_none());
    }

    #[test]
    fn test_handle_updates_overrides() {
        let p = propagator();
        let scope = p.enter_subtree("Settings");
        scope.set_screen_context("SettingsView");
        assert_eq!(
            p.generate_id("Save", "button"),
            "CarManager.SettingsView.Settings.button.save"
        );

        scope.set_auto_ids(false);
        assert!(p.automatic_identifier("Save", "button").is_none());
        assert_eq!(scope.name().as_deref(), Some("Settings"));
    }

    #[test]
    fn test_handle_environment_snapshot() {
        let p = propagator();
        let outer = p.enter_subtree_with("Outer", EnvironmentOverrides::new().screen_context("Trip"));
        let _inner = p.enter_subtree("Inner");

        let env = outer.environment().unwrap();
        assert_eq!(env.depth, 1);
        assert_eq!(env.breadcrumb.to_string(), "Outer");
        assert_eq!(env.screen_context.as_deref(), Some("Trip"));
    }

    #[test]
    fn test_clones_share_open_scopes() {
        let p = propagator();
        let q = p.clone();
        let outer = p.enter_subtree_with("Outer", EnvironmentOverrides::new().auto_ids(false));
        assert!(q.automatic_identifier("Save", "button").is_none());

        let inner = q.enter_subtree("Inner");
        assert_eq!(p.current().breadcrumb.to_string(), "Outer.Inner");
        assert_eq!(p.open_scopes(), 2);

        drop(outer);
        assert!(!inner.is_open());
        assert_eq!(q.engine().depth(), 0);
        drop(inner);
        assert_eq!(p.engine().depth(), 0);
    }

    #[test]
    fn test_independent_propagators_interleaving_is_recorded() {
        let first = propagator();
        let second = ContextPropagator::new(first.engine().clone());

        let _outer = first.enter_subtree("Outer");
        let _other = second.enter_subtree("Other");
        let _inner = first.enter_subtree("Inner");

        let warning = first
            .engine()
            .debug_log()
            .into_iter()
            .find(|e| e.level == EventLevel::Warning);
        assert_eq!(warning.map(|e| e.operation), Some(Operation::PushContext));
    }

    #[test]
    fn test_in_sync_scopes_record_no_warning() {
        let p = propagator();
        {
            let _a = p.enter_subtree("Section");
            let _env = p.enter_environment(EnvironmentOverrides::new().screen_context("Trip"));
            let _b = p.enter_subtree("Section");
            let _c = p.enter_subtree("Row");
        }
        assert!(p.engine().debug_log().is_empty());
    }

    #[test]
    fn test_repeated_name_stays_balanced() {
        let p = propagator();
        {
            let _a = p.enter_subtree("Container");
            let _b = p.enter_subtree("Container");
            assert_eq!(p.current().breadcrumb.to_string(), "Container");
        }
        assert_eq!(p.engine().depth(), 0);
    }
}
