//! Debug rendering of the open scopes.
//!
//! ```
//! use accessid::{ContextPropagator, EnvironmentOverrides, ScopeTreeDebug};
//!
//! let propagator = ContextPropagator::default();
//! let _nav = propagator.enter_subtree("NavigationView");
//! let _off = propagator.enter_environment(EnvironmentOverrides::new().auto_ids(false));
//!
//! let output = ScopeTreeDebug::new().format(&propagator);
//! assert!(output.contains("NavigationView"));
//! assert!(output.contains("auto_ids=off"));
//! ```

use std::fmt::Write as FmtWrite;

use crate::environment::{EnvironmentOverrides, Propagated};
use crate::propagator::{ContextPropagator, ScopeFrame, ScopeId};

/// Style options for scope visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// One line, segments joined with ` > `.
    Compact,
}

/// Configuration for scope debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    pub style: TreeStyle,
    /// Whether to show scope ids.
    pub show_ids: bool,
    /// Whether to show the values each scope sets.
    pub show_overrides: bool,
    /// Maximum depth to render (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_overrides: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Everything on.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            ..Default::default()
        }
    }

    /// Names only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_overrides: false,
            ..Default::default()
        }
    }
}

/// Renders the chain of open scopes of a [`ContextPropagator`].
#[derive(Debug, Clone, Default)]
pub struct ScopeTreeDebug {
    options: TreeFormatOptions,
}

impl ScopeTreeDebug {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Render the open scopes, outermost first.
    pub fn format(&self, propagator: &ContextPropagator) -> String {
        let depth = propagator.engine().depth();
        propagator.with_scopes(|tree| {
            let mut chain: Vec<(ScopeId, &ScopeFrame)> = tree.ancestry(tree.current()).collect();
            chain.reverse();

            let mut output = String::new();
            let _ = writeln!(
                output,
                "Open scopes ({}, breadcrumb depth {}):",
                chain.len(),
                depth
            );
            if chain.is_empty() {
                output.push_str("  (none)\n");
                return output;
            }

            if self.options.style == TreeStyle::Compact {
                let labels: Vec<String> = chain
                    .iter()
                    .take(self.options.max_depth.map_or(usize::MAX, |max| max + 1))
                    .map(|(id, frame)| self.label(*id, frame))
                    .collect();
                output.push_str(&labels.join(" > "));
                output.push('\n');
                return output;
            }

            for (level, (id, frame)) in chain.iter().enumerate() {
                if self.options.max_depth.is_some_and(|max| level > max) {
                    break;
                }
                output.push_str(&self.build_prefix(level));
                output.push_str(&self.label(*id, frame));
                output.push('\n');
            }
            output
        })
    }

    fn label(&self, id: ScopeId, frame: &ScopeFrame) -> String {
        let mut label = frame
            .name
            .clone()
            .unwrap_or_else(|| "(environment)".to_string());
        if self.options.show_ids {
            let _ = write!(label, " [{id:?}]");
        }
        if self.options.show_overrides {
            if let Some(overrides) = describe_overrides(&frame.overrides) {
                let _ = write!(label, " {{{overrides}}}");
            }
        }
        label
    }

    /// Every scope is the only child of its parent, so ancestors never need
    /// a continuing branch line.
    fn build_prefix(&self, level: usize) -> String {
        if level == 0 {
            return String::new();
        }
        let connector = match self.options.style {
            TreeStyle::Ascii => "`-- ",
            TreeStyle::Unicode | TreeStyle::Compact => "\u{2514}\u{2500}\u{2500} ",
        };
        let mut prefix = " ".repeat((level - 1) * (self.options.indent_size + 2));
        prefix.push_str(connector);
        prefix
    }
}

fn describe_overrides(overrides: &EnvironmentOverrides) -> Option<String> {
    let mut parts = Vec::new();
    match overrides.auto_ids {
        Propagated::Set(true) => parts.push("auto_ids=on".to_string()),
        Propagated::Set(false) => parts.push("auto_ids=off".to_string()),
        Propagated::Initial => parts.push("auto_ids=initial".to_string()),
        Propagated::Inherit => {}
    }
    match &overrides.screen_context {
        Propagated::Set(name) => parts.push(format!("screen={name}")),
        Propagated::Initial => parts.push("screen=initial".to_string()),
        Propagated::Inherit => {}
    }
    (!parts.is_empty()).then(|| parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tree() {
        let propagator = ContextPropagator::default();
        let output = ScopeTreeDebug::new().format(&propagator);
        assert!(output.starts_with("Open scopes (0, breadcrumb depth 0):"));
        assert!(output.contains("(none)"));
    }

    #[test]
    fn test_unicode_layout() {
        let propagator = ContextPropagator::default();
        let _a = propagator.enter_subtree("NavigationView");
        let _b = propagator.enter_subtree_with(
            "FuelSection",
            EnvironmentOverrides::new().screen_context("Trip"),
        );

        let output = ScopeTreeDebug::new().format(&propagator);
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[1], "NavigationView");
        assert_eq!(lines[2], "\u{2514}\u{2500}\u{2500} FuelSection {screen=Trip}");
    }

    #[test]
    fn test_compact_and_minimal() {
        let propagator = ContextPropagator::default();
        let _a = propagator.enter_subtree("A");
        let _b = propagator.enter_environment(EnvironmentOverrides::new().auto_ids(true));
        let _c = propagator.enter_subtree("C");

        let options = TreeFormatOptions {
            style: TreeStyle::Compact,
            ..TreeFormatOptions::minimal()
        };
        let output = ScopeTreeDebug::with_options(options).format(&propagator);
        assert!(output.ends_with("A > (environment) > C\n"));
    }

    #[test]
    fn test_max_depth() {
        let propagator = ContextPropagator::default();
        let _a = propagator.enter_subtree("A");
        let _b = propagator.enter_subtree("B");
        let _c = propagator.enter_subtree("C");

        let options = TreeFormatOptions {
            max_depth: Some(1),
            style: TreeStyle::Ascii,
            ..TreeFormatOptions::default()
        };
        let output = ScopeTreeDebug::with_options(options).format(&propagator);
        assert!(output.contains("`-- B"));
        assert!(!output.contains('C'));
    }
}
