//! Core engine for accessid.
//!
//! This crate owns the state behind automatic accessibility identifiers:
//!
//! - **Configuration**: namespace, mode and feature toggles ([`IdentifierConfig`])
//! - **Breadcrumbs**: the stack of decorated subtrees currently open ([`BreadcrumbStack`])
//! - **Composition**: the pure, length-bounded identifier algorithm ([`composer`])
//! - **Debug log**: a bounded trace of engine operations ([`DebugLog`])
//! - **Engine**: the single-writer owner of all of the above ([`IdentifierEngine`])
//! - **Handles**: thread-confined sharing and cross-thread marshalling
//!   ([`SharedEngine`], [`EngineRemote`])
//! - **Settings**: TOML configuration files ([`IdentifierSettings`])
//!
//! Scoped traversal and environment propagation live in the `accessid` crate.
//!
//! # Example
//!
//! ```
//! use accessid_core::{Configuration, SharedEngine};
//!
//! let engine = SharedEngine::new();
//! engine.configure(&Configuration::new("CarManager").enabled(true));
//! engine.set_screen_context("FuelView");
//!
//! engine.push_context("NavigationView");
//! engine.push_context("FuelSection");
//! let id = engine.generate_id("AddFuelButton", "button", None);
//! engine.pop_context();
//! engine.pop_context();
//!
//! assert_eq!(id, "CarManager.FuelView.NavigationView.FuelSection.button.addfuelbutton");
//! ```

pub mod breadcrumb;
pub mod composer;
mod config;
mod debug_log;
mod engine;
mod error;
pub mod logging;
mod mailbox;
mod settings;
mod shared;
pub mod thread_check;

pub use breadcrumb::{Breadcrumb, BreadcrumbStack};
pub use composer::{ComposedIdentifier, IdentifierRequest, MAX_IDENTIFIER_LENGTH};
pub use config::{
    Configuration, DEFAULT_DEBUG_LOG_CAPACITY, FALLBACK_NAMESPACE, FALLBACK_SCREEN_CONTEXT,
    IdentifierConfig, IdentifierMode,
};
pub use debug_log::{DebugEvent, DebugLog, EventLevel, Operation};
pub use engine::IdentifierEngine;
pub use error::{Error, Result};
pub use logging::PerfSpan;
pub use mailbox::EngineRemote;
pub use settings::IdentifierSettings;
pub use shared::{SharedEngine, global_engine};
