//! Viewer configuration, read from TOML.
//!
//! ```toml
//! [diagram]
//! grammar = "mermaid"
//!
//! [viewport]
//! zoom_in_factor = 1.2
//! zoom_out_factor = 0.8
//! wheel_in_factor = 1.1
//! wheel_out_factor = 0.9
//! close_key = "Escape"
//! ```

use crate::serializer::Grammar;
use crate::viewport::ZoomSteps;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{name} must be a positive finite number, got {value}")]
    InvalidFactor { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub diagram: DiagramConfig,
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    pub grammar: Grammar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    #[serde(alias = "zoomInFactor")]
    pub zoom_in_factor: f64,
    #[serde(alias = "zoomOutFactor")]
    pub zoom_out_factor: f64,
    #[serde(alias = "wheelInFactor")]
    pub wheel_in_factor: f64,
    #[serde(alias = "wheelOutFactor")]
    pub wheel_out_factor: f64,
    /// `KeyboardEvent.key` value that closes the viewer.
    #[serde(alias = "closeKey")]
    pub close_key: String,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        let steps = ZoomSteps::default();
        Self {
            zoom_in_factor: steps.zoom_in,
            zoom_out_factor: steps.zoom_out,
            wheel_in_factor: steps.wheel_in,
            wheel_out_factor: steps.wheel_out,
            close_key: "Escape".to_string(),
        }
    }
}

impl ViewportConfig {
    pub fn steps(&self) -> ZoomSteps {
        ZoomSteps {
            zoom_in: self.zoom_in_factor,
            zoom_out: self.zoom_out_factor,
            wheel_in: self.wheel_in_factor,
            wheel_out: self.wheel_out_factor,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&input)
    }

    /// Zoom factors must keep the scale strictly positive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.viewport;
        let factors = [
            ("zoom_in_factor", v.zoom_in_factor),
            ("zoom_out_factor", v.zoom_out_factor),
            ("wheel_in_factor", v.wheel_in_factor),
            ("wheel_out_factor", v.wheel_out_factor),
        ];

        for (name, value) in factors {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::InvalidFactor { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();

        assert_eq!(config.diagram.grammar, Grammar::Mermaid);
        assert_eq!(config.viewport.steps(), ZoomSteps::default());
        assert_eq!(config.viewport.close_key, "Escape");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(ViewerConfig::from_toml("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = ViewerConfig::from_toml(
            r#"
            [diagram]
            grammar = "erd"

            [viewport]
            wheel_in_factor = 1.25
            "#,
        )
        .unwrap();

        assert_eq!(config.diagram.grammar, Grammar::Erd);
        assert_eq!(config.viewport.wheel_in_factor, 1.25);
        assert_eq!(config.viewport.zoom_in_factor, 1.2);
    }

    #[test]
    fn test_rejects_non_positive_factor() {
        let err = ViewerConfig::from_toml("[viewport]\nzoom_out_factor = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidFactor {
                name: "zoom_out_factor",
                ..
            }
        ));

        let err = ViewerConfig::from_toml("[viewport]\nwheel_out_factor = -0.9\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidFactor { .. }));
    }

    #[test]
    fn test_rejects_unknown_grammar() {
        let err = ViewerConfig::from_toml("[diagram]\ngrammar = \"dot\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ViewerConfig::load(Path::new("/nonexistent/schemaview.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
