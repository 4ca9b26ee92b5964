//! Named type descriptors used by request matching
//!
//! Requests carry a subject type. Checkers and dispatchers only need a name,
//! an ordered list of bases and a subtype relation, so `TypeRef` models
//! exactly that and nothing more.
//!
//! Types compare by identity: two descriptors created separately are
//! different types even when they share a name.

use std::fmt;
use std::sync::{Arc, OnceLock};

static INT: OnceLock<TypeRef> = OnceLock::new();
static BOOL: OnceLock<TypeRef> = OnceLock::new();
static FLOAT: OnceLock<TypeRef> = OnceLock::new();
static STR: OnceLock<TypeRef> = OnceLock::new();
static NONE: OnceLock<TypeRef> = OnceLock::new();

/// Shared handle to a named type with ordered base types
#[derive(Clone)]
pub struct TypeRef(Arc<TypeInfo>);

struct TypeInfo {
    name: String,
    bases: Vec<TypeRef>,
}

impl TypeRef {
    /// Create a type deriving from the given bases, in declaration order
    pub fn new(name: impl Into<String>, bases: impl IntoIterator<Item = TypeRef>) -> Self {
        Self(Arc::new(TypeInfo {
            name: name.into(),
            bases: bases.into_iter().collect(),
        }))
    }

    /// Create a root type without bases
    pub fn named(name: impl Into<String>) -> Self {
        Self::new(name, [])
    }

    /// The shared `int` type
    pub fn int() -> Self {
        INT.get_or_init(|| Self::named("int")).clone()
    }

    /// The shared `bool` type, a subtype of `int`
    pub fn bool() -> Self {
        BOOL.get_or_init(|| Self::new("bool", [Self::int()])).clone()
    }

    pub fn float() -> Self {
        FLOAT.get_or_init(|| Self::named("float")).clone()
    }

    pub fn str() -> Self {
        STR.get_or_init(|| Self::named("str")).clone()
    }

    pub fn none() -> Self {
        NONE.get_or_init(|| Self::named("NoneType")).clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn bases(&self) -> &[TypeRef] {
        &self.0.bases
    }

    /// Reflexive, transitive subtype test
    pub fn is_subtype_of(&self, other: &TypeRef) -> bool {
        self == other || self.bases().iter().any(|base| base.is_subtype_of(other))
    }

    /// Depth-first, left-to-right linearization starting with `self`.
    /// A type reachable through several bases appears once, at its first visit.
    pub fn mro(&self) -> Vec<TypeRef> {
        let mut order = Vec::new();
        self.collect_mro(&mut order);
        order
    }

    fn collect_mro(&self, order: &mut Vec<TypeRef>) {
        if order.contains(self) {
            return;
        }
        order.push(self.clone());
        for base in self.bases() {
            base.collect_mro(order);
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for TypeRef {}

impl std::hash::Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.name())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtype_is_reflexive_and_transitive() {
        let int = TypeRef::int();
        let small = TypeRef::new("SmallInt", [int.clone()]);
        let tiny = TypeRef::new("TinyInt", [small.clone()]);

        assert!(int.is_subtype_of(&int));
        assert!(tiny.is_subtype_of(&small));
        assert!(tiny.is_subtype_of(&int));
        assert!(!int.is_subtype_of(&tiny));
        assert!(TypeRef::bool().is_subtype_of(&TypeRef::int()));
        assert!(!TypeRef::str().is_subtype_of(&TypeRef::int()));
    }

    #[test]
    fn test_builtin_types_are_shared() {
        assert_eq!(TypeRef::int(), TypeRef::int());
        assert_eq!(TypeRef::bool().bases(), &[TypeRef::int()]);
        assert_ne!(TypeRef::int(), TypeRef::named("int"));
    }

    #[test]
    fn test_same_name_types_are_distinct() {
        let base = TypeRef::named("Base");
        let plain = TypeRef::named("Model");
        let derived = TypeRef::new("Model", [base.clone()]);

        assert_ne!(plain, derived);
        assert!(!plain.is_subtype_of(&derived));
        assert!(!derived.is_subtype_of(&plain));
        assert!(!plain.is_subtype_of(&base));
        assert!(derived.is_subtype_of(&base));

        let mut set = std::collections::HashSet::new();
        set.insert(plain.clone());
        set.insert(derived.clone());
        set.insert(plain.clone());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_mro_keeps_same_name_types_apart() {
        let left = TypeRef::named("Mixin");
        let right = TypeRef::named("Mixin");
        let child = TypeRef::new("Child", [left, right]);
        assert_eq!(child.mro().len(), 3);
    }

    #[test]
    fn test_mro_deduplicates_diamond() {
        let base = TypeRef::named("Base");
        let left = TypeRef::new("Left", [base.clone()]);
        let right = TypeRef::new("Right", [base.clone()]);
        let child = TypeRef::new("Child", [left, right]);

        let names: Vec<_> = child.mro().iter().map(|t| t.name().to_string()).collect();
        assert_eq!(names, ["Child", "Left", "Base", "Right"]);
    }
}
