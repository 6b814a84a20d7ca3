//! Engine configuration
//!
//! Knobs shared by the lexer driver, the parser driver and the fixed-point resolver.
//! Configurations can be written by hand or loaded from YAML / JSON files.

use crate::language::fixed_point::DEFAULT_MAX_ITERATIONS;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported config extension '{0}' (expected yaml, yml or json)")]
    UnsupportedExtension(String),
    #[error("{field} must be at least 1")]
    Zero { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Columns a tab expands to when measuring indentation
    pub tab_width: usize,
    /// Full evaluation passes allowed before a cyclic rule is declared non-convergent
    pub max_fixed_point_iterations: usize,
    /// Times the parser may restart at the start rule after a rejection
    pub max_restarts: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tab_width: 8,
            max_fixed_point_iterations: DEFAULT_MAX_ITERATIONS,
            max_restarts: 8,
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(source)?;
        config.validate()
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(source)?;
        config.validate()
    }

    /// Load a config file, picking the format from its extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&source),
            "json" => Self::from_json_str(&source),
            other => Err(ConfigError::UnsupportedExtension(other.to_string())),
        }
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.tab_width == 0 {
            return Err(ConfigError::Zero { field: "tab_width" });
        }
        if self.max_fixed_point_iterations == 0 {
            return Err(ConfigError::Zero {
                field: "max_fixed_point_iterations",
            });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = EngineConfig::from_yaml_str("tab_width: 4\n").unwrap();
        assert_eq!(
            config,
            EngineConfig {
                tab_width: 4,
                ..EngineConfig::default()
            }
        );
    }

    #[test]
    fn test_json_config() {
        let config =
            EngineConfig::from_json_str(r#"{"max_restarts": 0, "max_fixed_point_iterations": 10}"#)
                .unwrap();
        assert_eq!(config.max_restarts, 0);
        assert_eq!(config.max_fixed_point_iterations, 10);
        assert_eq!(config.tab_width, 8);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(matches!(
            EngineConfig::from_yaml_str("tabwidth: 4\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_rejects_zero_tab_width() {
        assert!(matches!(
            EngineConfig::from_yaml_str("tab_width: 0\n"),
            Err(ConfigError::Zero { field: "tab_width" })
        ));
    }

    #[test]
    fn test_load_unknown_extension() {
        let path = std::env::temp_dir().join("deriv-config-test.toml");
        std::fs::write(&path, "tab_width = 4").unwrap();
        assert!(matches!(
            EngineConfig::load(&path),
            Err(ConfigError::UnsupportedExtension(ext)) if ext == "toml"
        ));
        let _ = std::fs::remove_file(path);
    }
}
