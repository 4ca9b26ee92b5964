//! Delegating and constraining proxies
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::checker::RequestChecker;
use super::error::{ProvideError, ProvideResult};
use super::essential::Provider;
use super::mediator::Mediator;
use super::request::Request;
use std::sync::Arc;

/// Answers by continuing the chain after itself. Usually registered behind
/// a checker to redirect matching requests to later providers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextProvider;

impl Provider for NextProvider {
    fn name(&self) -> &str {
        "NextProvider"
    }

    fn provide(&self, mediator: &Mediator<'_>, _request: &Request) -> ProvideResult {
        mediator.provide_from_next()
    }
}

/// Invokes the inner provider only when the checker accepts the request
#[derive(Clone)]
pub struct ConstrainingProxyProvider {
    checker: RequestChecker,
    inner: Arc<dyn Provider>,
    name: String,
}

impl ConstrainingProxyProvider {
    pub fn new(checker: impl Into<RequestChecker>, inner: impl Provider + 'static) -> Self {
        Self::shared(checker, Arc::new(inner))
    }

    pub fn shared(checker: impl Into<RequestChecker>, inner: Arc<dyn Provider>) -> Self {
        let checker = checker.into();
        let name = format!("{} if {}", inner.name(), checker);
        Self {
            checker,
            inner,
            name,
        }
    }

    pub fn checker(&self) -> &RequestChecker {
        &self.checker
    }
}

impl Provider for ConstrainingProxyProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, mediator: &Mediator<'_>, request: &Request) -> ProvideResult {
        self.checker
            .check(request)
            .map_err(ProvideError::CannotProvide)?;
        self.inner.provide(mediator, request)
    }
}

impl std::fmt::Debug for ConstrainingProxyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstrainingProxyProvider")
            .field("checker", &self.checker)
            .field("inner", &self.inner.name())
            .finish()
    }
}
