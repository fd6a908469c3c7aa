//! Engine configuration.
//!
//! A config is plain data with builder setters. Tools usually keep it in a
//! TOML file next to their own settings:
//!
//! ```toml
//! max_iteration_count = 256
//! random_seed = 7
//! default_iteration_offset = { x = 150.0, y = 0.0, z = 0.0 }
//! ```

use crate::core::error::EngineResult;
use crate::graph::structure::Position;
use serde::{Deserialize, Serialize};

/// Default upper bound on the generation count of one iteration.
pub const DEFAULT_MAX_ITERATION_COUNT: usize = 1024;

/// Configuration shared by every graph created with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest generation count accepted by pattern iteration.
    pub max_iteration_count: usize,
    /// Seed for random seed re-rolls; `None` draws from OS entropy.
    pub random_seed: Option<u64>,
    /// Layout offset between successive generations when the caller gives none.
    pub default_iteration_offset: Position,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_iteration_count: DEFAULT_MAX_ITERATION_COUNT,
            random_seed: None,
            default_iteration_offset: Position::new(150.0, 0.0, 0.0),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> EngineResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Set the iteration limit.
    pub fn with_max_iteration_count(mut self, count: usize) -> Self {
        self.max_iteration_count = count;
        self
    }

    /// Make seed re-rolls reproducible.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Set the default offset between generations.
    pub fn with_default_iteration_offset(mut self, offset: Position) -> Self {
        self.default_iteration_offset = offset;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::new();
        assert_eq!(config.max_iteration_count, DEFAULT_MAX_ITERATION_COUNT);
        assert!(config.random_seed.is_none());
    }

    #[test]
    fn test_from_toml() {
        let config = EngineConfig::from_toml_str(
            "max_iteration_count = 8\nrandom_seed = 42\n",
        )
        .unwrap();
        assert_eq!(config.max_iteration_count, 8);
        assert_eq!(config.random_seed, Some(42));
        assert_eq!(
            config.default_iteration_offset,
            EngineConfig::default().default_iteration_offset
        );

        let config = EngineConfig::from_toml_str(
            "default_iteration_offset = { x = 0.0, y = 96.0, z = 0.0 }",
        )
        .unwrap();
        assert_eq!(config.default_iteration_offset, Position::new(0.0, 96.0, 0.0));
    }

    #[test]
    fn test_invalid_toml() {
        let result = EngineConfig::from_toml_str("max_iteration_count = \"many\"");
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new()
            .with_max_iteration_count(3)
            .with_random_seed(9);
        assert_eq!(config.max_iteration_count, 3);
        assert_eq!(config.random_seed, Some(9));
    }
}
