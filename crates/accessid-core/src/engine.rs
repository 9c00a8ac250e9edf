//! The identifier engine: configuration, breadcrumb stack and debug log under
//! a single owner.
//!
//! [`IdentifierEngine`] takes `&mut self` for every mutation; sharing it
//! across the decoration layer goes through [`SharedEngine`](crate::SharedEngine),
//! which confines it to one thread.
//!
//! No engine operation fails. Empty namespaces and screen contexts fall back
//! to fixed literals, pops on an empty stack are ignored with a warning, and
//! overlong identifiers are digested.

use std::collections::HashMap;

use crate::breadcrumb::{Breadcrumb, BreadcrumbStack};
use crate::composer::{self, IdentifierRequest};
use crate::config::{Configuration, IdentifierConfig};
use crate::debug_log::{DebugEvent, DebugLog, Operation};
use crate::logging::targets;

/// Single-owner identifier state.
#[derive(Debug)]
pub struct IdentifierEngine {
    config: IdentifierConfig,
    stack: BreadcrumbStack,
    log: DebugLog,
    /// Identifiers issued this session, with issue counts. Holds at most
    /// `debug_log_capacity` distinct identifiers.
    issued: HashMap<String, usize>,
    session: u64,
}

impl IdentifierEngine {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(IdentifierConfig::default())
    }

    /// Create an engine with the given configuration.
    pub fn with_config(config: IdentifierConfig) -> Self {
        let log = DebugLog::with_capacity(config.debug_log_capacity);
        Self {
            config,
            stack: BreadcrumbStack::new(),
            log,
            issued: HashMap::new(),
            session: 0,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn config(&self) -> &IdentifierConfig {
        &self.config
    }

    /// Apply configuration changes. The breadcrumb stack and the log are kept.
    pub fn configure(&mut self, changes: &Configuration) {
        self.config.apply(changes);
        self.log.set_capacity(self.config.debug_log_capacity);
        tracing::debug!(
            target: targets::ENGINE,
            namespace = %self.config.namespace,
            mode = ?self.config.mode,
            enabled = self.config.enabled,
            "engine configured"
        );
        self.record_info(
            Operation::Configure,
            format!(
                "namespace={:?} mode={:?} enabled={}",
                self.config.namespace, self.config.mode, self.config.enabled
            ),
            None,
        );
    }

    /// Return every field to its default and empty the stack, the log and the
    /// issued-identifier registry. Starts a new session.
    pub fn reset_to_defaults(&mut self) {
        self.config = IdentifierConfig::default();
        self.stack.clear();
        self.log = DebugLog::with_capacity(self.config.debug_log_capacity);
        self.issued.clear();
        self.session += 1;
        tracing::debug!(target: targets::ENGINE, session = self.session, "engine reset to defaults");
    }

    /// Counter that changes on every reset. Scopes opened in an earlier
    /// session must not pop the current stack.
    pub fn session(&self) -> u64 {
        self.session
    }

    /// Replace the current screen context.
    pub fn set_screen_context(&mut self, name: impl Into<String>) {
        let name = name.into();
        tracing::trace!(target: targets::ENGINE, screen = %name, "screen context set");
        self.record_info(Operation::SetScreenContext, name.clone(), None);
        self.config.screen_context = Some(name);
    }

    pub fn clear_screen_context(&mut self) {
        self.config.screen_context = None;
        self.record_info(Operation::SetScreenContext, "<none>", None);
    }

    // =========================================================================
    // Breadcrumbs
    // =========================================================================

    /// Open a subtree scope. Returns `false` if the push was absorbed because
    /// `name` is already the innermost scope.
    pub fn push_context(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        let appended = self.stack.push(name.clone());
        tracing::trace!(
            target: targets::BREADCRUMB,
            name = %name,
            appended,
            depth = self.stack.depth(),
            "push"
        );
        self.record_info(
            Operation::PushContext,
            name,
            Some(self.stack.snapshot().to_string()),
        );
        appended
    }

    /// Close the innermost scope. On an empty stack this does nothing and
    /// records a warning.
    pub fn pop_context(&mut self) -> Option<String> {
        match self.stack.pop() {
            Some(name) => {
                tracing::trace!(
                    target: targets::BREADCRUMB,
                    name = %name,
                    depth = self.stack.depth(),
                    "pop"
                );
                self.record_info(
                    Operation::PopContext,
                    name.clone(),
                    Some(self.stack.snapshot().to_string()),
                );
                Some(name)
            }
            None => {
                tracing::warn!(target: targets::BREADCRUMB, "pop_context on an empty breadcrumb stack");
                self.log
                    .record(DebugEvent::warning(Operation::PopContext, "unbalanced pop on empty stack"));
                None
            }
        }
    }

    /// Current breadcrumb path.
    pub fn breadcrumb(&self) -> Breadcrumb {
        self.stack.snapshot()
    }

    /// Number of open scopes.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Compose an identifier for `request`, whatever the enable flag and mode.
    pub fn generate_id(&mut self, request: &IdentifierRequest) -> String {
        let breadcrumb = self.stack.snapshot();
        let composed = composer::compose(&self.config, &breadcrumb, request);

        if composed.namespace_fallback {
            tracing::info!(
                target: targets::COMPOSER,
                fallback = crate::config::FALLBACK_NAMESPACE,
                "empty namespace, using fallback"
            );
        }
        if composed.screen_fallback {
            tracing::info!(
                target: targets::COMPOSER,
                fallback = crate::config::FALLBACK_SCREEN_CONTEXT,
                "no screen context, using fallback"
            );
        }
        if composed.truncated {
            tracing::debug!(
                target: targets::COMPOSER,
                depth = breadcrumb.len(),
                "identifier exceeded length bound, digested"
            );
        }
        tracing::trace!(target: targets::COMPOSER, id = %composed.value, "generated");

        self.record_info(
            Operation::Generate,
            format!(
                "object={:?} role={:?} context={:?} path={}",
                request.object_id, request.role, request.context_override, breadcrumb
            ),
            Some(composed.value.clone()),
        );

        if self.config.ui_test_integration {
            self.register_issued(&composed.value);
        }

        composed.value
    }

    /// Compose an identifier only when automatic generation is enabled and
    /// the engine is in automatic mode.
    pub fn automatic_identifier(&mut self, request: &IdentifierRequest) -> Option<String> {
        if self.config.generates_automatically() {
            Some(self.generate_id(request))
        } else {
            None
        }
    }

    /// Use `explicit` verbatim when present, otherwise fall back to
    /// [`automatic_identifier`](Self::automatic_identifier).
    pub fn resolve_identifier(
        &mut self,
        explicit: Option<&str>,
        request: &IdentifierRequest,
    ) -> Option<String> {
        match explicit {
            Some(explicit) => Some(explicit.to_string()),
            None => self.automatic_identifier(request),
        }
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    pub fn debug_log(&self) -> &DebugLog {
        &self.log
    }

    /// Empty the debug log, leaving all other state alone.
    pub fn clear_debug_log(&mut self) {
        self.log.clear();
    }

    pub fn formatted_debug_log(&self) -> String {
        self.log.format()
    }

    /// Record a warning. Warnings are kept whether or not debug logging is on.
    pub fn record_warning(&mut self, operation: Operation, message: impl Into<String>) {
        self.log.record(DebugEvent::warning(operation, message));
    }

    /// Emit the formatted debug log through `tracing`.
    pub fn log_debug_output(&self) {
        tracing::info!(target: targets::ENGINE, "\n{}", self.log.format());
    }

    /// Identifiers issued this session with their issue counts. Only
    /// populated while UI test integration is on.
    ///
    /// The registry is bounded by `debug_log_capacity`. Once it is full, new
    /// identifiers go untracked for the rest of the session, so a collision
    /// between two of them is not reported.
    pub fn issued_identifiers(&self) -> impl Iterator<Item = (&str, usize)> {
        self.issued.iter().map(|(id, count)| (id.as_str(), *count))
    }

    pub fn issued_count(&self, identifier: &str) -> usize {
        self.issued.get(identifier).copied().unwrap_or(0)
    }

    fn register_issued(&mut self, identifier: &str) {
        let (tracked, capacity) = (self.issued.len(), self.config.debug_log_capacity);
        let count = match self.issued.get_mut(identifier) {
            Some(count) => {
                *count += 1;
                *count
            }
            None if tracked >= capacity => {
                tracing::trace!(
                    target: targets::COMPOSER,
                    id = identifier,
                    capacity,
                    "issued-identifier registry full, not tracking"
                );
                return;
            }
            None => {
                self.issued.insert(identifier.to_string(), 1);
                1
            }
        };
        if count > 1 {
            tracing::warn!(
                target: targets::COMPOSER,
                id = identifier,
                count,
                "identifier issued more than once"
            );
            self.log.record(DebugEvent::warning(
                Operation::Collision,
                format!("{identifier} issued {count} times"),
            ));
        }
    }

    fn record_info(&mut self, operation: Operation, inputs: impl Into<String>, output: Option<String>) {
        if self.config.debug_logging {
            self.log.record(DebugEvent::info(operation, inputs, output));
        }
    }
}

impl Default for IdentifierEngine {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(IdentifierEngine: Send);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IdentifierMode;
    use crate::debug_log::EventLevel;

    fn car_manager() -> IdentifierEngine {
        let mut engine = IdentifierEngine::new();
        engine.configure(&Configuration::new("CarManager").enabled(true));
        engine.set_screen_context("FuelView");
        engine
    }

    #[test]
    fn test_generate_uses_stack() {
        let mut engine = car_manager();
        engine.push_context("NavigationView");
        engine.push_context("FuelSection");

        let id = engine.generate_id(&IdentifierRequest::new("AddFuelButton", "button"));
        assert_eq!(id, "CarManager.FuelView.NavigationView.FuelSection.button.addfuelbutton");
    }

    #[test]
    fn test_generate_is_deterministic() {
        let mut engine = car_manager();
        engine.push_context("List");
        let request = IdentifierRequest::new("Row", "cell");
        assert_eq!(engine.generate_id(&request), engine.generate_id(&request));
    }

    #[test]
    fn test_configure_keeps_stack() {
        let mut engine = car_manager();
        engine.push_context("Outer");
        engine.configure(&Configuration::new("Other"));
        assert_eq!(engine.depth(), 1);
        assert_eq!(engine.config().screen_context.as_deref(), Some("FuelView"));
    }

    #[test]
    fn test_unbalanced_pop_records_warning() {
        let mut engine = IdentifierEngine::new();
        assert!(engine.pop_context().is_none());

        let last = engine.debug_log().last().unwrap();
        assert_eq!(last.level, EventLevel::Warning);
        assert_eq!(last.operation, Operation::PopContext);
        assert_eq!(engine.depth(), 0);
    }

    #[test]
    fn test_info_events_need_debug_logging() {
        let mut engine = car_manager();
        engine.generate_id(&IdentifierRequest::new("a", "label"));
        assert!(engine.debug_log().is_empty());

        engine.configure(&Configuration::unchanged().debug_logging(true));
        let id = engine.generate_id(&IdentifierRequest::new("a", "label"));

        let last = engine.debug_log().last().unwrap();
        assert_eq!(last.operation, Operation::Generate);
        assert_eq!(last.output.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_clear_debug_log_keeps_state() {
        let mut engine = car_manager();
        engine.configure(&Configuration::unchanged().debug_logging(true));
        engine.push_context("Outer");
        engine.clear_debug_log();

        assert!(engine.debug_log().is_empty());
        assert_eq!(engine.depth(), 1);
        assert!(engine.config().debug_logging);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut engine = car_manager();
        engine.configure(&Configuration::unchanged().debug_logging(true).ui_test_integration(true));
        engine.push_context("Outer");
        engine.generate_id(&IdentifierRequest::new("a", "label"));

        engine.reset_to_defaults();
        let once = (engine.config().clone(), engine.breadcrumb(), engine.debug_log().len());
        engine.reset_to_defaults();
        let twice = (engine.config().clone(), engine.breadcrumb(), engine.debug_log().len());

        assert_eq!(once, twice);
        assert_eq!(engine.config(), &IdentifierConfig::default());
        assert_eq!(engine.depth(), 0);
        assert_eq!(engine.issued_identifiers().count(), 0);
    }

    #[test]
    fn test_reset_starts_new_session() {
        let mut engine = IdentifierEngine::new();
        let before = engine.session();
        engine.reset_to_defaults();
        assert_ne!(engine.session(), before);
    }

    #[test]
    fn test_automatic_identifier_respects_flag_and_mode() {
        let mut engine = IdentifierEngine::new();
        let request = IdentifierRequest::new("x", "label");
        assert!(engine.automatic_identifier(&request).is_none());

        engine.configure(&Configuration::new("App").enabled(true));
        assert!(engine.automatic_identifier(&request).is_some());

        engine.configure(&Configuration::unchanged().mode(IdentifierMode::Manual));
        assert!(engine.automatic_identifier(&request).is_none());
    }

    #[test]
    fn test_explicit_identifier_passes_through() {
        let mut engine = car_manager();
        engine.configure(&Configuration::unchanged().mode(IdentifierMode::Manual));
        let request = IdentifierRequest::new("ignored", "button");

        let explicit = "  Weird ID.with/Chars  ";
        assert_eq!(
            engine.resolve_identifier(Some(explicit), &request).as_deref(),
            Some(explicit)
        );
        assert!(engine.resolve_identifier(None, &request).is_none());
    }

    #[test]
    fn test_collisions_are_reported() {
        let mut engine = car_manager();
        engine.configure(&Configuration::unchanged().ui_test_integration(true));
        let request = IdentifierRequest::new("Save", "button");

        let id = engine.generate_id(&request);
        assert_eq!(engine.issued_count(&id), 1);
        assert_eq!(engine.debug_log().warnings().count(), 0);

        engine.generate_id(&request);
        assert_eq!(engine.issued_count(&id), 2);
        let warning = engine.debug_log().warnings().next().unwrap();
        assert_eq!(warning.operation, Operation::Collision);
    }

    #[test]
    fn test_registry_bounded_by_log_capacity() {
        let mut engine = car_manager();
        engine.configure(
            &Configuration::unchanged()
                .ui_test_integration(true)
                .debug_log_capacity(2),
        );

        let save = engine.generate_id(&IdentifierRequest::new("Save", "button"));
        engine.generate_id(&IdentifierRequest::new("Cancel", "button"));
        let done = engine.generate_id(&IdentifierRequest::new("Done", "button"));
        engine.generate_id(&IdentifierRequest::new("Done", "button"));

        assert_eq!(engine.issued_identifiers().count(), 2);
        assert_eq!(engine.issued_count(&done), 0);
        assert_eq!(engine.debug_log().warnings().count(), 0);

        // Identifiers already tracked keep counting.
        engine.generate_id(&IdentifierRequest::new("Save", "button"));
        assert_eq!(engine.issued_count(&save), 2);
        assert_eq!(engine.debug_log().warnings().count(), 1);
    }

    #[test]
    fn test_registry_off_by_default() {
        let mut engine = car_manager();
        let id = engine.generate_id(&IdentifierRequest::new("Save", "button"));
        assert_eq!(engine.issued_count(&id), 0);
    }

    #[test]
    fn test_formatted_debug_log() {
        let mut engine = car_manager();
        engine.configure(&Configuration::unchanged().debug_logging(true));
        engine.push_context("Outer");
        let output = engine.formatted_debug_log();
        assert!(output.contains("push_context: Outer -> Outer"));
        engine.log_debug_output();
    }
}
