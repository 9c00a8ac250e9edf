//! accessid - hierarchy-aware accessibility identifiers.
//!
//! Decorate subtrees of a UI with names, and every element inside receives a
//! stable, readable identifier built from the app namespace, the screen, the
//! path of decorated subtrees and the element itself:
//!
//! ```text
//! CarManager.FuelView.NavigationView.FuelSection.button.addfuelbutton
//! ```
//!
//! This is the umbrella crate. It re-exports the engine from `accessid-core`
//! and adds scoped traversal on top of it.
//!
//! # Example
//!
//! ```
//! use accessid::prelude::*;
//!
//! let propagator = ContextPropagator::default();
//! propagator.engine().configure(&Configuration::new("CarManager").enabled(true));
//! propagator.engine().set_screen_context("FuelView");
//!
//! let screen = UiNode::new("Root", ElementRole::Navigation)
//!     .named("NavigationView")
//!     .child(
//!         UiNode::new("Section", ElementRole::Group)
//!             .named("FuelSection")
//!             .child(UiNode::new("AddFuelButton", ElementRole::Button)),
//!     );
//!
//! let assignments = assign_identifiers(&propagator, &screen);
//! assert_eq!(
//!     assignments[2].identifier.as_deref(),
//!     Some("CarManager.FuelView.NavigationView.FuelSection.button.addfuelbutton")
//! );
//! ```

pub use accessid_core::*;

mod environment;
pub mod prelude;
mod propagator;
mod role;
mod scope_debug;
mod tree;

pub use environment::{EnvironmentOverrides, IdentifierEnvironment, Propagated};
pub use propagator::{ContextPropagator, ScopeHandle, ScopeId};
pub use role::ElementRole;
pub use scope_debug::{ScopeTreeDebug, TreeFormatOptions, TreeStyle};
pub use tree::{Assignment, Decorator, UiNode, assign_identifiers};
