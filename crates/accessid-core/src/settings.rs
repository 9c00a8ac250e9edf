//! Identifier settings files.
//!
//! Settings are plain TOML, with every key optional:
//!
//! ```toml
//! namespace = "CarManager"
//! mode = "automatic"
//! enabled = true
//! track_hierarchy = true
//! ui_test_integration = false
//! debug_logging = false
//! include_element_types = true
//! debug_log_capacity = 500
//! screen_context = "FuelView"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{Configuration, DEFAULT_DEBUG_LOG_CAPACITY, IdentifierConfig, IdentifierMode};
use crate::error::{Error, Result};

/// Serializable engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentifierSettings {
    pub namespace: String,
    pub mode: IdentifierMode,
    pub enabled: bool,
    pub track_hierarchy: bool,
    pub ui_test_integration: bool,
    pub debug_logging: bool,
    pub include_element_types: bool,
    pub debug_log_capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen_context: Option<String>,
}

impl Default for IdentifierSettings {
    fn default() -> Self {
        Self::from(&IdentifierConfig::default())
    }
}

impl From<&IdentifierConfig> for IdentifierSettings {
    fn from(config: &IdentifierConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            mode: config.mode,
            enabled: config.enabled,
            track_hierarchy: config.track_hierarchy,
            ui_test_integration: config.ui_test_integration,
            debug_logging: config.debug_logging,
            include_element_types: config.include_element_types,
            debug_log_capacity: config.debug_log_capacity,
            screen_context: config.screen_context.clone(),
        }
    }
}

impl IdentifierSettings {
    /// Parse settings from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let settings: Self = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        tracing::debug!(
            target: crate::logging::targets::ENGINE,
            path = %path.display(),
            "loading identifier settings"
        );
        Self::from_toml_str(&source)
    }

    /// Render the settings as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let contents = self.to_toml_string()?;
        std::fs::write(path, contents).map_err(|e| Error::io(path, e))
    }

    /// The configuration changes these settings describe. The screen context
    /// is not part of it; apply it with `set_screen_context`.
    pub fn into_configuration(self) -> Configuration {
        Configuration::new(self.namespace)
            .mode(self.mode)
            .enabled(self.enabled)
            .track_hierarchy(self.track_hierarchy)
            .ui_test_integration(self.ui_test_integration)
            .debug_logging(self.debug_logging)
            .include_element_types(self.include_element_types)
            .debug_log_capacity(self.debug_log_capacity)
    }

    /// A full engine configuration built from these settings.
    pub fn to_config(&self) -> IdentifierConfig {
        let mut config = IdentifierConfig::default();
        config.apply(&self.clone().into_configuration());
        config.screen_context = self.screen_context.clone();
        config
    }

    fn validate(&self) -> Result<()> {
        if self.debug_log_capacity == 0 {
            return Err(Error::invalid_value(
                "debug_log_capacity",
                format!("must be at least 1 (default is {DEFAULT_DEBUG_LOG_CAPACITY})"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let settings = IdentifierSettings::from_toml_str("").unwrap();
        assert_eq!(settings, IdentifierSettings::default());
        assert_eq!(settings.to_config(), IdentifierConfig::default());
    }

    #[test]
    fn test_parse_full_document() {
        let settings = IdentifierSettings::from_toml_str(
            r#"
            namespace = "CarManager"
            mode = "manual"
            enabled = true
            debug_logging = true
            screen_context = "FuelView"
            "#,
        )
        .unwrap();

        assert_eq!(settings.namespace, "CarManager");
        assert_eq!(settings.mode, IdentifierMode::Manual);
        assert!(settings.enabled);
        assert!(settings.track_hierarchy);

        let config = settings.to_config();
        assert_eq!(config.screen_context.as_deref(), Some("FuelView"));
        assert!(config.debug_logging);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = IdentifierSettings::from_toml_str("debug_log_capacity = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidValue { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = IdentifierSettings::from_toml_str("namespaec = \"typo\"").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn test_bad_mode_rejected() {
        assert!(IdentifierSettings::from_toml_str("mode = \"semantic\"").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("identifiers.toml");

        let mut settings = IdentifierSettings::default();
        settings.namespace = "CarManager".into();
        settings.enabled = true;
        settings.save(&path).unwrap();

        let loaded = IdentifierSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = IdentifierSettings::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
