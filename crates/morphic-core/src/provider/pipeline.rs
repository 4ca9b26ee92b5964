//! Sequential pipelines of providers
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license
//!
//! Every stage of a [`Pipeline`] answers the same request in registration
//! order. A refusal from any stage is a refusal of the whole pipeline; the
//! collected answers are folded into one by the pipeline's reducer.

use super::error::{ProvideError, ProvideResult};
use super::essential::{Answer, Provider};
use super::mediator::Mediator;
use super::request::Request;
use crate::function::Function;
use anyhow::Context;
use std::sync::Arc;

/// Folds the answers of every stage into the pipeline's answer
pub trait PipelineReducer: Send + Sync {
    fn reduce(&self, request: &Request, answers: Vec<Answer>) -> ProvideResult;
}

impl<F> PipelineReducer for F
where
    F: Fn(&Request, Vec<Answer>) -> ProvideResult + Send + Sync,
{
    fn reduce(&self, request: &Request, answers: Vec<Answer>) -> ProvideResult {
        self(request, answers)
    }
}

/// Chains function answers left to right into a single function
#[derive(Debug, Clone, Copy, Default)]
pub struct ComposeFunctions;

impl PipelineReducer for ComposeFunctions {
    fn reduce(&self, request: &Request, answers: Vec<Answer>) -> ProvideResult {
        let functions = answers
            .into_iter()
            .map(Answer::into_function)
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("composing pipeline answers for {}", request))?;
        Ok(Answer::Function(Function::compose(functions)))
    }
}

/// Returns every stage answer as [`Answer::Many`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectAnswers;

impl PipelineReducer for CollectAnswers {
    fn reduce(&self, _request: &Request, answers: Vec<Answer>) -> ProvideResult {
        Ok(Answer::Many(answers))
    }
}

/// Provider evaluating its stages in order and reducing their answers
#[derive(Clone)]
pub struct Pipeline {
    name: String,
    stages: Vec<Arc<dyn Provider>>,
    reducer: Arc<dyn PipelineReducer>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, reducer: impl PipelineReducer + 'static) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            reducer: Arc::new(reducer),
        }
    }

    /// Pipeline composing function answers
    pub fn composing(name: impl Into<String>) -> Self {
        Self::new(name, ComposeFunctions)
    }

    /// Append a stage
    pub fn stage(mut self, provider: impl Provider + 'static) -> Self {
        self.stages.push(Arc::new(provider));
        self
    }

    pub fn shared_stage(mut self, provider: Arc<dyn Provider>) -> Self {
        self.stages.push(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Provider for Pipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, mediator: &Mediator<'_>, request: &Request) -> ProvideResult {
        if self.stages.is_empty() {
            return Err(ProvideError::refuse("pipeline has no stages"));
        }
        let mut answers = Vec::with_capacity(self.stages.len());
        for (index, stage) in self.stages.iter().enumerate() {
            match stage.provide(mediator, request) {
                Ok(answer) => answers.push(answer),
                Err(ProvideError::CannotProvide(rejection)) => {
                    return Err(ProvideError::refuse(format!(
                        "stage {} ({}) refused: {}",
                        index,
                        stage.name(),
                        rejection
                    )))
                }
                Err(other) => return Err(other),
            }
        }
        self.reducer.reduce(request, answers)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stages: Vec<&str> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &stages)
            .finish()
    }
}
