//! Engine configuration.
//!
//! [`IdentifierConfig`] is the mutable state that shapes identifier
//! composition. It is owned by an [`IdentifierEngine`](crate::IdentifierEngine)
//! and changed through [`Configuration`] values, which only touch the fields
//! they name.

use serde::{Deserialize, Serialize};

/// Fallback namespace used when the configured namespace is empty.
pub const FALLBACK_NAMESPACE: &str = "app";

/// Fallback screen context used when none is set or overridden.
pub const FALLBACK_SCREEN_CONTEXT: &str = "main";

/// Default bound of the debug log.
pub const DEFAULT_DEBUG_LOG_CAPACITY: usize = 500;

/// How identifiers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierMode {
    /// Identifiers are composed from namespace, screen, breadcrumb, role and id.
    #[default]
    Automatic,
    /// Callers supply identifiers verbatim; nothing is composed.
    Manual,
}

/// Process-wide identifier configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierConfig {
    /// Master switch for automatic generation.
    pub enabled: bool,
    /// Root identifier segment.
    pub namespace: String,
    /// Automatic or manual identifiers.
    pub mode: IdentifierMode,
    /// Include the breadcrumb path in composed identifiers.
    pub track_hierarchy: bool,
    /// Record issued identifiers and report collisions.
    pub ui_test_integration: bool,
    /// Record info-level events in the debug log.
    pub debug_logging: bool,
    /// Include the element role segment in composed identifiers.
    pub include_element_types: bool,
    /// Current logical screen or page.
    pub screen_context: Option<String>,
    /// Maximum number of retained debug events.
    pub debug_log_capacity: usize,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            namespace: String::new(),
            mode: IdentifierMode::Automatic,
            track_hierarchy: true,
            ui_test_integration: false,
            debug_logging: false,
            include_element_types: true,
            screen_context: None,
            debug_log_capacity: DEFAULT_DEBUG_LOG_CAPACITY,
        }
    }
}

impl IdentifierConfig {
    /// Whether automatic identifiers should be produced at all.
    #[inline]
    pub fn generates_automatically(&self) -> bool {
        self.enabled && self.mode == IdentifierMode::Automatic
    }

    /// Apply a set of changes. Fields the configuration leaves unset keep
    /// their current value.
    pub fn apply(&mut self, changes: &Configuration) {
        if let Some(namespace) = &changes.namespace {
            self.namespace = namespace.clone();
        }
        if let Some(mode) = changes.mode {
            self.mode = mode;
        }
        if let Some(enabled) = changes.enabled {
            self.enabled = enabled;
        }
        if let Some(track) = changes.track_hierarchy {
            self.track_hierarchy = track;
        }
        if let Some(ui_test) = changes.ui_test_integration {
            self.ui_test_integration = ui_test;
        }
        if let Some(debug) = changes.debug_logging {
            self.debug_logging = debug;
        }
        if let Some(types) = changes.include_element_types {
            self.include_element_types = types;
        }
        if let Some(capacity) = changes.debug_log_capacity {
            self.debug_log_capacity = capacity.max(1);
        }
    }
}

/// A set of configuration changes.
///
/// ```
/// use accessid_core::{Configuration, IdentifierMode};
///
/// let changes = Configuration::new("CarManager")
///     .mode(IdentifierMode::Automatic)
///     .enabled(true)
///     .debug_logging(true);
/// assert_eq!(changes.namespace.as_deref(), Some("CarManager"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub namespace: Option<String>,
    pub mode: Option<IdentifierMode>,
    pub enabled: Option<bool>,
    pub track_hierarchy: Option<bool>,
    pub ui_test_integration: Option<bool>,
    pub debug_logging: Option<bool>,
    pub include_element_types: Option<bool>,
    pub debug_log_capacity: Option<usize>,
}

impl Configuration {
    /// Start a configuration that sets the namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            ..Default::default()
        }
    }

    /// Start a configuration that leaves the namespace untouched.
    pub fn unchanged() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: IdentifierMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn track_hierarchy(mut self, track: bool) -> Self {
        self.track_hierarchy = Some(track);
        self
    }

    pub fn ui_test_integration(mut self, enabled: bool) -> Self {
        self.ui_test_integration = Some(enabled);
        self
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = Some(enabled);
        self
    }

    pub fn include_element_types(mut self, include: bool) -> Self {
        self.include_element_types = Some(include);
        self
    }

    /// Bound the debug log. Zero is raised to one.
    pub fn debug_log_capacity(mut self, capacity: usize) -> Self {
        self.debug_log_capacity = Some(capacity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IdentifierConfig::default();
        assert!(!config.enabled);
        assert!(config.namespace.is_empty());
        assert_eq!(config.mode, IdentifierMode::Automatic);
        assert!(config.track_hierarchy);
        assert!(config.screen_context.is_none());
        assert!(!config.generates_automatically());
    }

    #[test]
    fn test_apply_only_touches_named_fields() {
        let mut config = IdentifierConfig::default();
        config.screen_context = Some("FuelView".into());

        config.apply(&Configuration::new("CarManager").enabled(true));
        assert_eq!(config.namespace, "CarManager");
        assert!(config.enabled);
        assert_eq!(config.screen_context.as_deref(), Some("FuelView"));
        assert!(config.track_hierarchy);

        config.apply(&Configuration::unchanged().debug_logging(true));
        assert_eq!(config.namespace, "CarManager");
        assert!(config.debug_logging);
    }

    #[test]
    fn test_manual_mode_disables_generation() {
        let mut config = IdentifierConfig::default();
        config.apply(&Configuration::new("App").enabled(true).mode(IdentifierMode::Manual));
        assert!(!config.generates_automatically());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut config = IdentifierConfig::default();
        config.apply(&Configuration::unchanged().debug_log_capacity(0));
        assert_eq!(config.debug_log_capacity, 1);
    }
}
