//! Top-level entry point of capability resolution
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::error::ResolveError;
use super::essential::Answer;
use super::mediator::{walk, ProviderChain};
use super::request::{ConversionRequest, Request};
use crate::codegen::{Closure, Loader, Plan, Synthesizer};
use crate::config::EngineConfig;
use crate::function::Function;
use crate::Result;
use std::sync::Arc;

/// Owns an immutable provider chain and the engine configuration.
///
/// Resolvers are cheap to clone and can be shared across threads; every
/// resolution call walks the chain independently.
#[derive(Debug, Clone)]
pub struct Resolver {
    chain: Arc<ProviderChain>,
    config: EngineConfig,
    synthesizer: Synthesizer,
}

impl Resolver {
    /// Resolver with the default configuration
    pub fn new(chain: ProviderChain) -> Self {
        Self {
            chain: Arc::new(chain),
            config: EngineConfig::default(),
            synthesizer: Synthesizer::new(),
        }
    }

    /// Resolver with a validated configuration
    pub fn with_config(chain: ProviderChain, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let synthesizer = config.synthesis.synthesizer()?;
        Ok(Self {
            chain: Arc::new(chain),
            config,
            synthesizer,
        })
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Walk the chain from the first provider
    pub fn resolve(&self, request: &Request) -> std::result::Result<Answer, ResolveError> {
        walk(&self.chain, request, 0, 0, &self.config.resolution)
    }

    pub fn resolve_function(&self, request: &Request) -> std::result::Result<Function, ResolveError> {
        Ok(self.resolve(request)?.into_function()?)
    }

    pub fn resolve_plan(&self, request: &Request) -> std::result::Result<Plan, ResolveError> {
        Ok(self.resolve(request)?.into_plan()?)
    }

    pub fn resolve_name(&self, request: &Request) -> std::result::Result<String, ResolveError> {
        Ok(self.resolve(request)?.into_name()?)
    }

    /// Resolve a conversion plan, synthesize it against the requested
    /// signature and load the result
    pub fn produce_converter(&self, request: ConversionRequest) -> Result<Closure> {
        let signature = request.signature.clone();
        let plan = self.resolve_plan(&Request::Conversion(request))?;
        let unit = self.synthesizer.synthesize(&plan, &signature)?;
        tracing::debug!(source = %unit.source(), "produced converter");
        Ok(Loader::new().load(unit)?)
    }
}
