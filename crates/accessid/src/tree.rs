//! Decorated element trees.
//!
//! A [`UiNode`] is a minimal description of a UI element: what it is called,
//! its role, an optional explicit identifier and the decorators applied to
//! it. [`assign_identifiers`] walks such a tree depth-first, opening a scope
//! for every decorator on the way down and closing it on the way back up,
//! and reports the identifier each element receives.

use accessid_core::logging::{span_names, targets};
use accessid_core::{Breadcrumb, PerfSpan};

use crate::environment::EnvironmentOverrides;
use crate::propagator::{ContextPropagator, ScopeHandle};

/// A decoration applied to an element and everything below it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decorator {
    /// Adds a breadcrumb segment.
    Named(String),
    /// Turns automatic identifiers on or off.
    AutoIds(bool),
    /// Replaces the screen context.
    ScreenContext(String),
}

impl Decorator {
    fn enter(&self, propagator: &ContextPropagator) -> ScopeHandle {
        match self {
            Decorator::Named(name) => propagator.enter_subtree(name.as_str()),
            Decorator::AutoIds(enabled) => {
                propagator.enter_environment(EnvironmentOverrides::new().auto_ids(*enabled))
            }
            Decorator::ScreenContext(name) => {
                propagator.enter_environment(EnvironmentOverrides::new().screen_context(name.as_str()))
            }
        }
    }
}

/// An element in a decorated tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiNode {
    pub object_id: String,
    pub role: String,
    /// Identifier supplied by the developer, used verbatim.
    pub explicit: Option<String>,
    /// Decorators, outermost first.
    pub decorators: Vec<Decorator>,
    pub children: Vec<UiNode>,
}

impl UiNode {
    pub fn new(object_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            role: role.into(),
            explicit: None,
            decorators: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Apply a decorator. Later decorators are nested inside earlier ones.
    pub fn decorate(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Shorthand for [`Decorator::Named`].
    pub fn named(self, name: impl Into<String>) -> Self {
        self.decorate(Decorator::Named(name.into()))
    }

    /// Give the element an exact identifier.
    pub fn exact_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.explicit = Some(identifier.into());
        self
    }

    pub fn child(mut self, child: UiNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = UiNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of elements in this subtree, including this one.
    pub fn element_count(&self) -> usize {
        1 + self.children.iter().map(UiNode::element_count).sum::<usize>()
    }
}

/// The identifier an element received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub object_id: String,
    pub role: String,
    /// Breadcrumb path at the element, its own named decorators included.
    pub path: Breadcrumb,
    /// `None` when automatic identifiers were off and no explicit one was set.
    pub identifier: Option<String>,
    pub explicit: bool,
}

enum Visit<'a> {
    Enter(&'a UiNode),
    Exit(Vec<ScopeHandle>),
}

/// Walk `root` depth-first and compute the identifier of every element, in
/// pre-order. Each element's decorators apply to the element itself and to
/// its descendants, never to its siblings.
pub fn assign_identifiers(propagator: &ContextPropagator, root: &UiNode) -> Vec<Assignment> {
    let _perf = PerfSpan::new(span_names::ASSIGN);
    let mut assignments = Vec::with_capacity(root.element_count());
    let mut stack = vec![Visit::Enter(root)];

    while let Some(visit) = stack.pop() {
        match visit {
            Visit::Enter(node) => {
                let scopes: Vec<ScopeHandle> = node
                    .decorators
                    .iter()
                    .map(|decorator| decorator.enter(propagator))
                    .collect();

                let path = propagator.current().breadcrumb;
                let identifier = propagator.resolve_identifier(
                    node.explicit.as_deref(),
                    node.object_id.as_str(),
                    node.role.as_str(),
                );
                assignments.push(Assignment {
                    object_id: node.object_id.clone(),
                    role: node.role.clone(),
                    path,
                    identifier,
                    explicit: node.explicit.is_some(),
                });

                stack.push(Visit::Exit(scopes));
                // Reverse so children come off the stack in order.
                for child in node.children.iter().rev() {
                    stack.push(Visit::Enter(child));
                }
            }
            Visit::Exit(mut scopes) => {
                while let Some(scope) = scopes.pop() {
                    scope.release();
                }
            }
        }
    }

    tracing::debug!(
        target: targets::PROPAGATOR,
        elements = assignments.len(),
        "identifiers assigned"
    );
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use accessid_core::{Configuration, SharedEngine};

    fn propagator() -> ContextPropagator {
        let engine = SharedEngine::new();
        engine.configure(&Configuration::new("CarManager").enabled(true));
        engine.set_screen_context("FuelView");
        ContextPropagator::new(engine)
    }

    #[test]
    fn test_preorder_assignment() {
        let p = propagator();
        let root = UiNode::new("Root", "navigation")
            .named("NavigationView")
            .child(UiNode::new("Title", "label"))
            .child(UiNode::new("Save", "button"));

        let result = assign_identifiers(&p, &root);
        let ids: Vec<_> = result.iter().map(|a| a.object_id.as_str()).collect();
        assert_eq!(ids, ["Root", "Title", "Save"]);
        assert_eq!(
            result[2].identifier.as_deref(),
            Some("CarManager.FuelView.NavigationView.button.save")
        );
        assert_eq!(p.engine().depth(), 0);
    }

    #[test]
    fn test_decorators_apply_to_own_node() {
        let p = propagator();
        let root = UiNode::new("Section", "group").named("FuelSection");

        let result = assign_identifiers(&p, &root);
        assert_eq!(result[0].path.to_string(), "FuelSection");
    }

    #[test]
    fn test_explicit_identifier_wins() {
        let p = propagator();
        let root = UiNode::new("Save", "button")
            .decorate(Decorator::AutoIds(false))
            .exact_identifier("save-button");

        let result = assign_identifiers(&p, &root);
        assert_eq!(result[0].identifier.as_deref(), Some("save-button"));
        assert!(result[0].explicit);
    }

    #[test]
    fn test_element_count_covers_subtree() {
        let root = UiNode::new("a", "group")
            .child(UiNode::new("b", "label").child(UiNode::new("c", "label")))
            .child(UiNode::new("d", "label"));
        assert_eq!(root.element_count(), 4);
    }
}
