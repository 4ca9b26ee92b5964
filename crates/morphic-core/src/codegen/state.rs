//! Hygienic name allocation
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::namespace::Namespace;
use crate::value::Value;
use std::collections::HashMap;

/// Per-pass generator state: the namespace plus one counter per prefix.
///
/// Every name handed out is unique within the pass and never equal to an
/// occupied name.
#[derive(Debug)]
pub struct GenState {
    namespace: Namespace,
    counters: HashMap<String, usize>,
}

impl GenState {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            counters: HashMap::new(),
        }
    }

    /// Bind `value` under the next `prefix_N` name
    pub fn allocate(&mut self, prefix: &str, value: Value) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        let number = *counter;
        *counter += 1;
        self.bind_exact(&format!("{}_{}", prefix, number), value)
    }

    /// Bind `value` under `preferred` when it is free, otherwise under the
    /// first free `preferred_1`, `preferred_2`, ...
    pub fn bind_exact(&mut self, preferred: &str, value: Value) -> String {
        let mut name = preferred.to_string();
        let mut suffix = 0usize;
        while self.namespace.contains(&name) {
            suffix += 1;
            name = format!("{}_{}", preferred, suffix);
        }
        self.namespace.bind_vacant(name.clone(), value);
        tracing::trace!(name = %name, "bound capture");
        name
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn into_namespace(self) -> Namespace {
        self.namespace
    }
}
