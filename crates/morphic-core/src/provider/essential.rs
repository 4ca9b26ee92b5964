//! Answers and the provider trait
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::error::{ProvideResult, UnexpectedAnswer};
use super::mediator::Mediator;
use super::request::Request;
use crate::codegen::Plan;
use crate::function::Function;
use std::fmt;
use std::sync::Arc;

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Function(Function),
    Plan(Plan),
    /// An external name, e.g. the result of a name mapping
    Name(String),
    /// Answers collected by a pipeline
    Many(Vec<Answer>),
}

impl Answer {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Answer::Function(_) => "function",
            Answer::Plan(_) => "plan",
            Answer::Name(_) => "name",
            Answer::Many(_) => "many",
        }
    }

    fn unexpected(&self, expected: &'static str) -> UnexpectedAnswer {
        UnexpectedAnswer {
            expected,
            found: self.kind_name(),
        }
    }

    pub fn into_function(self) -> Result<Function, UnexpectedAnswer> {
        match self {
            Answer::Function(function) => Ok(function),
            other => Err(other.unexpected("function")),
        }
    }

    pub fn into_plan(self) -> Result<Plan, UnexpectedAnswer> {
        match self {
            Answer::Plan(plan) => Ok(plan),
            other => Err(other.unexpected("plan")),
        }
    }

    pub fn into_name(self) -> Result<String, UnexpectedAnswer> {
        match self {
            Answer::Name(name) => Ok(name),
            other => Err(other.unexpected("name")),
        }
    }

    pub fn into_many(self) -> Result<Vec<Answer>, UnexpectedAnswer> {
        match self {
            Answer::Many(answers) => Ok(answers),
            other => Err(other.unexpected("many")),
        }
    }
}

impl From<Function> for Answer {
    fn from(function: Function) -> Self {
        Answer::Function(function)
    }
}

impl From<Plan> for Answer {
    fn from(plan: Plan) -> Self {
        Answer::Plan(plan)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Function(function) => write!(f, "{}", function),
            Answer::Plan(plan) => write!(f, "<plan of {} nodes>", plan.node_count()),
            Answer::Name(name) => write!(f, "'{}'", name),
            Answer::Many(answers) => write!(f, "<{} answers>", answers.len()),
        }
    }
}

/// A unit offering capabilities.
///
/// `provide` either answers the request, refuses it with
/// [`ProvideError::CannotProvide`](super::ProvideError::CannotProvide), or
/// reports a defect. The mediator gives access to nested resolution and to
/// the rest of the chain.
pub trait Provider: Send + Sync {
    /// Name used in logs and refusal reports
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn provide(&self, mediator: &Mediator<'_>, request: &Request) -> ProvideResult;
}

impl<P: Provider + ?Sized> Provider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn provide(&self, mediator: &Mediator<'_>, request: &Request) -> ProvideResult {
        (**self).provide(mediator, request)
    }
}

impl<P: Provider + ?Sized> Provider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn provide(&self, mediator: &Mediator<'_>, request: &Request) -> ProvideResult {
        (**self).provide(mediator, request)
    }
}

/// Provider backed by a closure
pub struct FnProvider<F> {
    name: String,
    body: F,
}

impl<F> FnProvider<F>
where
    F: Fn(&Mediator<'_>, &Request) -> ProvideResult + Send + Sync,
{
    pub fn new(name: impl Into<String>, body: F) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

impl<F> Provider for FnProvider<F>
where
    F: Fn(&Mediator<'_>, &Request) -> ProvideResult + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, mediator: &Mediator<'_>, request: &Request) -> ProvideResult {
        (self.body)(mediator, request)
    }
}

impl<F> fmt::Debug for FnProvider<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProvider").field("name", &self.name).finish()
    }
}
