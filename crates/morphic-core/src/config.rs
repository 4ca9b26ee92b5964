//! Engine configuration
//!
//! Settings are plain serde structures with defaults for every field, so a
//! partial document (or none at all) yields a usable configuration.

use crate::codegen::{is_identifier, Synthesizer, DEFAULT_CLOSURE_NAME};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration of the resolution engine and the synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub resolution: ResolutionConfig,
    pub synthesis: SynthesisConfig,
}

/// Chain walk settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Maximum nesting of requests resolved from inside providers
    pub max_depth: usize,

    /// Keep refusal reasons for `NoProviderFound` reports
    pub collect_refusals: bool,
}

/// Code synthesis settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Name of emitted closures
    pub closure_name: String,

    /// Names emitted code must never bind
    pub reserved_names: Vec<String>,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            max_depth: 64,
            collect_refusals: true,
        }
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            closure_name: DEFAULT_CLOSURE_NAME.to_string(),
            reserved_names: vec!["getattr".to_string()],
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resolution.max_depth == 0 {
            return Err(Error::configuration("resolution.max_depth must be at least 1"));
        }
        self.synthesis.validate()
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.closure_name) {
            return Err(Error::configuration(format!(
                "synthesis.closure_name '{}' is not an identifier",
                self.closure_name
            )));
        }
        if let Some(name) = self.reserved_names.iter().find(|n| !is_identifier(n)) {
            return Err(Error::configuration(format!(
                "synthesis.reserved_names entry '{}' is not an identifier",
                name
            )));
        }
        Ok(())
    }

    /// Build the synthesizer these settings describe
    pub fn synthesizer(&self) -> Result<Synthesizer> {
        self.validate()?;
        let synthesizer = Synthesizer::new()
            .with_closure_name(self.closure_name.as_str())?
            .with_reserved_names(self.reserved_names.iter().cloned());
        Ok(synthesizer)
    }
}
