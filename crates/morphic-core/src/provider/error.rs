//! Error types for capability resolution
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::request::Request;
use std::fmt;
use thiserror::Error;

/// A provider's refusal to answer a request. Refusals are recoverable: the
/// chain moves on to the next provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct CannotProvide {
    pub reason: String,
}

impl CannotProvide {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A refusal recorded during a chain walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refusal {
    pub provider: String,
    pub position: usize,
    pub reason: String,
}

impl fmt::Display for Refusal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}: {}", self.position, self.provider, self.reason)
    }
}

/// Outcome of a single provider invocation other than an answer
#[derive(Error, Debug)]
pub enum ProvideError {
    /// The provider refuses; the chain continues
    #[error("Cannot provide: {0}")]
    CannotProvide(#[from] CannotProvide),

    /// Delegation reached the end of the chain without an answer
    #[error("Rest of the provider chain refused ({} refusals)", .refusals.len())]
    RestExhausted { refusals: Vec<Refusal> },

    /// The provider is defective; resolution stops
    #[error(transparent)]
    Failed(#[from] anyhow::Error),

    /// A nested resolution failed terminally
    #[error(transparent)]
    Resolve(Box<ResolveError>),
}

impl ProvideError {
    /// Shorthand for a refusal
    pub fn refuse(reason: impl Into<String>) -> Self {
        ProvideError::CannotProvide(CannotProvide::new(reason))
    }
}

/// Nested requests that nobody can satisfy turn into a refusal of the
/// asking provider; every other failure propagates unchanged.
impl From<ResolveError> for ProvideError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoProviderFound { request, .. } => {
                ProvideError::CannotProvide(CannotProvide::new(format!(
                    "nested {} is not satisfied",
                    request
                )))
            }
            other => ProvideError::Resolve(Box::new(other)),
        }
    }
}

/// Terminal failures of a resolution
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Every applicable provider refused
    #[error("No provider found for {request}{}", format_refusals(.refusals))]
    NoProviderFound {
        request: Request,
        refusals: Vec<Refusal>,
    },

    /// A provider reported a defect
    #[error("Provider '{provider}' failed on {request}: {source}")]
    ProviderFailed {
        provider: String,
        request: Request,
        #[source]
        source: anyhow::Error,
    },

    /// Nested resolution went deeper than allowed
    #[error("Resolution depth limit {limit} exceeded at {request}")]
    DepthLimitExceeded { request: Request, limit: usize },

    /// The answer does not have the requested shape
    #[error(transparent)]
    UnexpectedAnswer(#[from] UnexpectedAnswer),
}

fn format_refusals(refusals: &[Refusal]) -> String {
    if refusals.is_empty() {
        return String::new();
    }
    let listed: Vec<String> = refusals.iter().map(Refusal::to_string).collect();
    format!(" ({})", listed.join("; "))
}

/// Typed access to an [`Answer`](super::Answer) of another shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Expected a {expected} answer, got {found}")]
pub struct UnexpectedAnswer {
    pub expected: &'static str,
    pub found: &'static str,
}

/// Result of a single provider invocation
pub type ProvideResult = Result<super::Answer, ProvideError>;
