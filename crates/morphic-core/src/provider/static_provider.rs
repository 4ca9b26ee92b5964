//! Providers built from per-request-kind actions
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::error::{ProvideError, ProvideResult};
use super::essential::Provider;
use super::mediator::Mediator;
use super::request::{Request, RequestKind};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

type Action = dyn Fn(&Mediator<'_>, &Request) -> ProvideResult + Send + Sync;

/// A provider answering a fixed set of request kinds, one action per kind.
/// Requests of other kinds are refused.
#[derive(Clone)]
pub struct StaticProvider {
    name: String,
    actions: BTreeMap<RequestKind, Arc<Action>>,
}

impl StaticProvider {
    pub fn builder(name: impl Into<String>) -> StaticProviderBuilder {
        StaticProviderBuilder {
            name: name.into(),
            actions: BTreeMap::new(),
            duplicates: Vec::new(),
        }
    }

    /// Kinds this provider has an action for
    pub fn kinds(&self) -> impl Iterator<Item = RequestKind> + '_ {
        self.actions.keys().copied()
    }
}

impl Provider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, mediator: &Mediator<'_>, request: &Request) -> ProvideResult {
        match self.actions.get(&request.kind()) {
            Some(action) => action(mediator, request),
            None => Err(ProvideError::refuse(format!(
                "no action for {} requests",
                request.kind()
            ))),
        }
    }
}

impl std::fmt::Debug for StaticProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticProvider")
            .field("name", &self.name)
            .field("kinds", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`StaticProvider`]
pub struct StaticProviderBuilder {
    name: String,
    actions: BTreeMap<RequestKind, Arc<Action>>,
    duplicates: Vec<RequestKind>,
}

impl StaticProviderBuilder {
    /// Register the action answering `kind` requests
    pub fn action<F>(mut self, kind: RequestKind, action: F) -> Self
    where
        F: Fn(&Mediator<'_>, &Request) -> ProvideResult + Send + Sync + 'static,
    {
        if self.actions.insert(kind, Arc::new(action)).is_some() {
            self.duplicates.push(kind);
        }
        self
    }

    /// Finish the provider; registering two actions for one kind is a
    /// configuration error
    pub fn build(self) -> Result<StaticProvider> {
        if let Some(kind) = self.duplicates.first() {
            return Err(Error::configuration(format!(
                "static provider '{}' declares more than one action for {} requests",
                self.name, kind
            )));
        }
        Ok(StaticProvider {
            name: self.name,
            actions: self.actions,
        })
    }
}
