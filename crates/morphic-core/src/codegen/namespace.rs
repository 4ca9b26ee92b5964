//! Symbol namespace of a single synthesis pass
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::error::CodegenError;
use crate::value::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Names bound to captured runtime objects, plus names that are occupied by
/// the surrounding code and may never be bound.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    bindings: BTreeMap<String, Value>,
    occupied: BTreeSet<String>,
}

impl Namespace {
    pub fn new<I, S>(occupied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            bindings: BTreeMap::new(),
            occupied: occupied.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether `name` is bound or occupied
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name) || self.occupied.contains(name)
    }

    pub fn is_occupied(&self, name: &str) -> bool {
        self.occupied.contains(name)
    }

    /// Bind `name` to `value`. Rebinding and binding an occupied name are
    /// both collisions.
    pub fn add(&mut self, name: impl Into<String>, value: Value) -> Result<(), CodegenError> {
        let name = name.into();
        if self.contains(&name) {
            return Err(CodegenError::NameCollision { name });
        }
        self.bindings.insert(name, value);
        Ok(())
    }

    /// Bind a name the caller has already checked to be free
    pub(crate) fn bind_vacant(&mut self, name: String, value: Value) {
        debug_assert!(!self.contains(&name), "'{}' is not vacant", name);
        self.bindings.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Number of bound names
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn into_captures(self) -> CaptureTable {
        CaptureTable(self.bindings)
    }
}

/// Mapping from every name the emitted code binds to the exact runtime
/// object it refers to
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureTable(BTreeMap<String, Value>);

impl CaptureTable {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occupied_names_cannot_be_bound() {
        let mut ns = Namespace::new(["x", "getattr"]);
        assert!(ns.contains("x"));
        assert!(ns.is_occupied("getattr"));
        assert_eq!(
            ns.add("x", Value::from(1)),
            Err(CodegenError::NameCollision { name: "x".to_string() })
        );
        assert!(ns.is_empty());
    }

    #[test]
    fn test_rebinding_is_a_collision() {
        let mut ns = Namespace::new(Vec::<String>::new());
        ns.add("constant_0", Value::from(1)).unwrap();
        assert!(ns.add("constant_0", Value::from(2)).is_err());
        assert_eq!(ns.get("constant_0"), Some(&Value::from(1)));

        let captures = ns.into_captures();
        assert_eq!(captures.len(), 1);
        assert_eq!(captures.names().collect::<Vec<_>>(), ["constant_0"]);
    }
}
