//! Engine configuration
//!
//! Copyright (c) 2025 Fieldcast Team
//! Licensed under the Apache-2.0 license

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Behaviour switches for a [`MappingEngine`](crate::MappingEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Register the built-in default transformers when the engine is built
    pub default_transformers: bool,

    /// Reject values whose runtime type does not fit the target field's
    /// declared type before calling the entity setter
    pub check_write_types: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_transformers: true,
            check_write_types: true,
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON; missing keys keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Configuration {
            message: format!("Invalid engine configuration: {}", e),
            source: Some(e.into()),
        })
    }

    pub fn with_default_transformers(mut self, enabled: bool) -> Self {
        self.default_transformers = enabled;
        self
    }

    pub fn with_check_write_types(mut self, enabled: bool) -> Self {
        self.check_write_types = enabled;
        self
    }
}
