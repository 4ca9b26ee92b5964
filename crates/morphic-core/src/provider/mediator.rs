//! Provider chains and the mediator driving a chain walk
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license
//!
//! A [`ProviderChain`] is an ordered, immutable list of providers, each
//! optionally guarded by a [`RequestChecker`]. Resolving a request walks the
//! chain from a start position: entries whose checker rejects are skipped,
//! the first provider that answers wins, refusals move on to the next entry.
//!
//! Every provider invocation receives a [`Mediator`] that knows where in the
//! chain the walk currently is, so a provider can continue the walk past
//! itself ([`Mediator::provide_from_next`]) or start a nested resolution
//! ([`Mediator::resolve`]).

use super::checker::RequestChecker;
use super::error::{ProvideError, ProvideResult, Refusal, ResolveError};
use super::essential::{Answer, Provider};
use super::request::Request;
use crate::config::ResolutionConfig;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// One provider of a chain with its optional guard
#[derive(Clone)]
pub struct ChainEntry {
    checker: Option<RequestChecker>,
    provider: Arc<dyn Provider>,
}

impl ChainEntry {
    pub fn name(&self) -> &str {
        self.provider.name()
    }

    pub fn checker(&self) -> Option<&RequestChecker> {
        self.checker.as_ref()
    }

    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }
}

impl fmt::Debug for ChainEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEntry")
            .field("provider", &self.name())
            .field("checker", &self.checker)
            .finish()
    }
}

/// Ordered list of providers; earlier entries take precedence
#[derive(Debug, Clone, Default)]
pub struct ProviderChain {
    entries: Vec<ChainEntry>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an unconditional provider
    pub fn with(self, provider: impl Provider + 'static) -> Self {
        self.with_entry(None, Arc::new(provider))
    }

    /// Append a provider that is only invoked when `checker` accepts
    pub fn with_checked(
        self,
        checker: impl Into<RequestChecker>,
        provider: impl Provider + 'static,
    ) -> Self {
        self.with_entry(Some(checker.into()), Arc::new(provider))
    }

    /// Append a shared provider
    pub fn with_shared(self, checker: Option<RequestChecker>, provider: Arc<dyn Provider>) -> Self {
        self.with_entry(checker, provider)
    }

    fn with_entry(mut self, checker: Option<RequestChecker>, provider: Arc<dyn Provider>) -> Self {
        if let Some(last) = self.entries.last() {
            if last.checker.is_none() {
                warn!(
                    provider = last.name(),
                    position = self.entries.len() - 1,
                    next = provider.name(),
                    "unconditional provider is not last; later providers are only reached by delegation"
                );
            }
        }
        self.entries.push(ChainEntry { checker, provider });
        self
    }

    pub fn entries(&self) -> &[ChainEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Context handed to a provider for the duration of one invocation
pub struct Mediator<'a> {
    chain: &'a ProviderChain,
    request: &'a Request,
    position: usize,
    depth: usize,
    config: &'a ResolutionConfig,
}

impl<'a> Mediator<'a> {
    /// The request being answered
    pub fn request(&self) -> &Request {
        self.request
    }

    /// Position of the invoked provider in the chain
    pub fn position(&self) -> usize {
        self.position
    }

    /// Nesting depth; top-level resolution is depth 0
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Resolve another request against the whole chain
    pub fn resolve(&self, request: &Request) -> Result<Answer, ResolveError> {
        let depth = self.depth + 1;
        if depth > self.config.max_depth {
            return Err(ResolveError::DepthLimitExceeded {
                request: request.clone(),
                limit: self.config.max_depth,
            });
        }
        walk(self.chain, request, 0, depth, self.config)
    }

    /// Continue the current walk with the providers after this one.
    ///
    /// If none of them answers, the result is
    /// [`ProvideError::RestExhausted`]; returning it unchanged ends the
    /// outer walk with `NoProviderFound`.
    pub fn provide_from_next(&self) -> ProvideResult {
        match walk(self.chain, self.request, self.position + 1, self.depth, self.config) {
            Ok(answer) => Ok(answer),
            Err(ResolveError::NoProviderFound { refusals, .. }) => {
                Err(ProvideError::RestExhausted { refusals })
            }
            Err(other) => Err(ProvideError::Resolve(Box::new(other))),
        }
    }
}

/// Walk `chain` from `start` until a provider answers `request`
pub(crate) fn walk(
    chain: &ProviderChain,
    request: &Request,
    start: usize,
    depth: usize,
    config: &ResolutionConfig,
) -> Result<Answer, ResolveError> {
    let mut refusals = Vec::new();
    let refuse = |refusals: &mut Vec<Refusal>, entry: &ChainEntry, position: usize, reason: String| {
        trace!(provider = entry.name(), position, %reason, "provider refused");
        if config.collect_refusals {
            refusals.push(Refusal {
                provider: entry.name().to_string(),
                position,
                reason,
            });
        }
    };

    for (position, entry) in chain.entries.iter().enumerate().skip(start) {
        if let Some(checker) = &entry.checker {
            if let Err(rejection) = checker.check(request) {
                refuse(&mut refusals, entry, position, format!("not applicable: {}", rejection));
                continue;
            }
        }

        let mediator = Mediator {
            chain,
            request,
            position,
            depth,
            config,
        };
        match entry.provider.provide(&mediator, request) {
            Ok(answer) => {
                debug!(provider = entry.name(), position, depth, %request, "request answered");
                return Ok(answer);
            }
            Err(ProvideError::CannotProvide(rejection)) => {
                refuse(&mut refusals, entry, position, rejection.reason);
            }
            Err(ProvideError::RestExhausted { refusals: rest }) => {
                refusals.extend(rest);
                debug!(provider = entry.name(), position, %request, "delegation exhausted the chain");
                return Err(ResolveError::NoProviderFound {
                    request: request.clone(),
                    refusals,
                });
            }
            Err(ProvideError::Failed(source)) => {
                debug!(provider = entry.name(), position, %request, "provider failed");
                return Err(ResolveError::ProviderFailed {
                    provider: entry.name().to_string(),
                    request: request.clone(),
                    source,
                });
            }
            Err(ProvideError::Resolve(err)) => return Err(*err),
        }
    }

    debug!(%request, start, depth, "no provider found");
    Err(ResolveError::NoProviderFound {
        request: request.clone(),
        refusals,
    })
}
