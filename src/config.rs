use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::FormDepsError;

/// Default evaluation budget per rule body.
pub const DEFAULT_MAX_STEPS: usize = 10_000;

/// Default maximum length of a rule source, in bytes.
pub const DEFAULT_MAX_SOURCE_LEN: usize = 8_192;

/// Default nesting limit for rule expressions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Engine limits, loadable from JSON:
///
/// ```json
/// { "maxSteps": 5000, "maxSourceLen": 4096, "maxDepth": 32 }
/// ```
///
/// Missing keys take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Evaluation steps one rule body may take before it fails.
    pub max_steps: usize,
    /// Longer rule sources are rejected at compile time.
    pub max_source_len: usize,
    /// Rule sources nesting deeper than this are rejected at compile time.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            max_source_len: DEFAULT_MAX_SOURCE_LEN,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EngineConfig {
    /// # Errors
    ///
    /// Returns [`FormDepsError::Json`] if `input` is not a valid config object.
    pub fn from_json(input: &str) -> Result<Self, FormDepsError> {
        Ok(serde_json::from_str(input)?)
    }

    /// # Errors
    ///
    /// Returns [`FormDepsError::Io`] if the file cannot be read, or
    /// [`FormDepsError::Json`] if it is not a valid config object.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FormDepsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_defaults() {
        let config = EngineConfig::from_json(r#"{ "maxSteps": 50 }"#).unwrap();
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.max_source_len, DEFAULT_MAX_SOURCE_LEN);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn depth_limit_from_json() {
        let config = EngineConfig::from_json(r#"{ "maxDepth": 16 }"#).unwrap();
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.max_steps, DEFAULT_MAX_STEPS);
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "maxSteps": "lots" }"#),
            Err(FormDepsError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            EngineConfig::from_file("/nonexistent/formdeps.json"),
            Err(FormDepsError::Io(_))
        ));
    }
}
