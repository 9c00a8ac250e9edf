//! Logging facilities for accessid.
//!
//! accessid uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the host application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Build the UI...
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`], so the engine's
//! chatter can be filtered per subsystem, for example with
//! `RUST_LOG=accessid_core::breadcrumb=warn`.
//!
//! The in-memory [`DebugLog`](crate::DebugLog) is a separate, bounded trace
//! of engine operations that tests can inspect; it does not depend on a
//! subscriber being installed.

/// Span names used throughout accessid for tracing.
pub mod span_names {
    /// Identifier generation span.
    pub const GENERATE: &str = "accessid::generate";
    /// Subtree scope span.
    pub const SCOPE: &str = "accessid::scope";
    /// Tree decoration pass span.
    pub const ASSIGN: &str = "accessid::assign";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "accessid_core";
    /// Engine state and lifecycle.
    pub const ENGINE: &str = "accessid_core::engine";
    /// Breadcrumb push/pop.
    pub const BREADCRUMB: &str = "accessid_core::breadcrumb";
    /// Identifier composition.
    pub const COMPOSER: &str = "accessid_core::composer";
    /// Scope propagation in the `accessid` crate.
    pub const PROPAGATOR: &str = "accessid::propagator";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to time a full decoration pass or a single generation.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "accessid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}
