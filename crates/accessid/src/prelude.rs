//! Prelude module for accessid.
//!
//! ```ignore
//! use accessid::prelude::*;
//! ```

// ============================================================================
// Engine
// ============================================================================

pub use crate::{
    Configuration, IdentifierConfig, IdentifierEngine, IdentifierMode, IdentifierRequest,
    SharedEngine, global_engine,
};

// ============================================================================
// Scopes and propagation
// ============================================================================

pub use crate::{
    ContextPropagator, EnvironmentOverrides, IdentifierEnvironment, Propagated, ScopeHandle,
};

// ============================================================================
// Trees
// ============================================================================

pub use crate::{Assignment, Decorator, ElementRole, UiNode, assign_identifiers};
