//! Dispatch tables keyed by type
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::error::{ProvideError, ProvideResult};
use super::essential::{Answer, Provider};
use super::mediator::Mediator;
use super::request::{Request, RequestKind};
use crate::types::TypeRef;

/// Maps types to values; lookups fall back along the subject's MRO so the
/// most specific registered type wins
#[derive(Debug, Clone)]
pub struct ClassDispatcher<V> {
    entries: Vec<(TypeRef, V)>,
}

impl<V> Default for ClassDispatcher<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> ClassDispatcher<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` for `key`, returning the value it replaces
    pub fn insert(&mut self, key: TypeRef, value: V) -> Option<V> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => Some(std::mem::replace(&mut slot.1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn with(mut self, key: TypeRef, value: V) -> Self {
        self.insert(key, value);
        self
    }

    /// Exact lookup without MRO fallback
    pub fn get(&self, key: &TypeRef) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Value registered for the first type of `subject`'s MRO that has one
    pub fn dispatch(&self, subject: &TypeRef) -> Option<&V> {
        subject.mro().iter().find_map(|t| self.get(t))
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypeRef> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeRef, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> FromIterator<(TypeRef, V)> for ClassDispatcher<V> {
    fn from_iter<I: IntoIterator<Item = (TypeRef, V)>>(iter: I) -> Self {
        let mut dispatcher = Self::new();
        for (key, value) in iter {
            dispatcher.insert(key, value);
        }
        dispatcher
    }
}

/// Answers one request kind from a type dispatch table
#[derive(Debug, Clone)]
pub struct TypeDispatchProvider {
    name: String,
    kind: RequestKind,
    table: ClassDispatcher<Answer>,
}

impl TypeDispatchProvider {
    pub fn new(name: impl Into<String>, kind: RequestKind, table: ClassDispatcher<Answer>) -> Self {
        Self {
            name: name.into(),
            kind,
            table,
        }
    }

    pub fn table(&self) -> &ClassDispatcher<Answer> {
        &self.table
    }
}

impl Provider for TypeDispatchProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn provide(&self, _mediator: &Mediator<'_>, request: &Request) -> ProvideResult {
        if request.kind() != self.kind {
            return Err(ProvideError::refuse(format!(
                "only {} requests are handled",
                self.kind
            )));
        }
        self.table
            .dispatch(request.subject())
            .cloned()
            .ok_or_else(|| ProvideError::refuse(format!("no entry for {}", request.subject())))
    }
}
