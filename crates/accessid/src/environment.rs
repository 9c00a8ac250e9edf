//! Values propagated from decorated subtrees to their descendants.
//!
//! Each open scope may set, inherit or reset the automatic-identifier flag
//! and the screen context. A descendant sees the value of its nearest
//! ancestor scope that set one, the same way inheritable style properties
//! resolve against their parent. Values never flow sideways or upward: once
//! a scope is released, later siblings resolve against the parent again.

use accessid_core::{Breadcrumb, IdentifierConfig};

/// How a scope treats one propagated value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Propagated<T> {
    /// Use the value visible at the parent scope.
    #[default]
    Inherit,
    /// Use this value for the scope and its descendants.
    Set(T),
    /// Use the engine's configured value, ignoring ancestor scopes.
    Initial,
}

impl<T> Propagated<T> {
    pub fn is_inherit(&self) -> bool {
        matches!(self, Self::Inherit)
    }
}

/// Resolve a value against the chain of enclosing scopes, innermost first.
pub(crate) fn resolve_chain<'a, T, I>(chain: I, initial: T) -> T
where
    T: Clone + 'a,
    I: IntoIterator<Item = &'a Propagated<T>>,
{
    for value in chain {
        match value {
            Propagated::Set(v) => return v.clone(),
            Propagated::Initial => return initial,
            Propagated::Inherit => {}
        }
    }
    initial
}

/// The values a scope sets for its subtree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvironmentOverrides {
    pub auto_ids: Propagated<bool>,
    pub screen_context: Propagated<String>,
}

impl EnvironmentOverrides {
    /// Inherit everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn automatic identifiers on or off for the subtree.
    pub fn auto_ids(mut self, enabled: bool) -> Self {
        self.auto_ids = Propagated::Set(enabled);
        self
    }

    /// Use `name` as the screen context for the subtree.
    pub fn screen_context(mut self, name: impl Into<String>) -> Self {
        self.screen_context = Propagated::Set(name.into());
        self
    }

    /// Go back to the configured screen context for the subtree.
    pub fn initial_screen_context(mut self) -> Self {
        self.screen_context = Propagated::Initial;
        self
    }

    /// Whether this scope changes nothing.
    pub fn is_empty(&self) -> bool {
        self.auto_ids.is_inherit() && self.screen_context.is_inherit()
    }
}

/// Read-only view of the identifier state visible at a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierEnvironment {
    /// Whether elements here receive automatic identifiers.
    pub auto_ids_enabled: bool,
    /// The screen context elements here are composed with.
    pub screen_context: Option<String>,
    /// Breadcrumb path at this scope.
    pub breadcrumb: Breadcrumb,
    /// Number of open breadcrumb scopes at this scope.
    pub depth: usize,
}

impl IdentifierEnvironment {
    /// The environment outside every scope.
    pub fn root(config: &IdentifierConfig, breadcrumb: Breadcrumb, depth: usize) -> Self {
        Self {
            auto_ids_enabled: config.generates_automatically(),
            screen_context: config.screen_context.clone(),
            breadcrumb,
            depth,
        }
    }

    /// Resolve the propagated values for a scope chain, innermost first.
    pub(crate) fn resolve<'a, I>(
        config: &IdentifierConfig,
        chain: I,
        breadcrumb: Breadcrumb,
        depth: usize,
    ) -> Self
    where
        I: IntoIterator<Item = &'a EnvironmentOverrides> + Clone,
    {
        let auto_ids = resolve_chain(
            chain.clone().into_iter().map(|overrides| &overrides.auto_ids),
            config.enabled,
        );
        let screen_context = resolve_chain(
            chain.into_iter().map(|overrides| &overrides.screen_context),
            config.screen_context.clone().unwrap_or_default(),
        );

        Self {
            // Manual mode suppresses composition whatever a scope asks for.
            auto_ids_enabled: auto_ids && config.mode == accessid_core::IdentifierMode::Automatic,
            screen_context: Some(screen_context).filter(|s| !s.is_empty()),
            breadcrumb,
            depth,
        }
    }
}
