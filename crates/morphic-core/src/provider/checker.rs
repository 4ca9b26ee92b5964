//! Request checkers: predicates deciding whether a provider applies
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use super::error::CannotProvide;
use super::request::{Request, RequestKind};
use crate::types::TypeRef;
use std::fmt;

/// Composable predicate over requests. A rejection is reported as a
/// [`CannotProvide`] carrying the reason.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestChecker {
    /// Subject type is the given type or one of its subtypes
    Subclass(TypeRef),
    /// Request is about a field with exactly this name
    FieldName(String),
    /// Request is of the given kind
    Kind(RequestKind),
    /// Every inner checker accepts; an empty list accepts everything
    And(Vec<RequestChecker>),
    /// At least one inner checker accepts; an empty list rejects everything
    Or(Vec<RequestChecker>),
    /// The inner checker rejects
    Not(Box<RequestChecker>),
}

impl RequestChecker {
    pub fn subclass(expected: TypeRef) -> Self {
        RequestChecker::Subclass(expected)
    }

    pub fn field_name(name: impl Into<String>) -> Self {
        RequestChecker::FieldName(name.into())
    }

    pub fn kind(kind: RequestKind) -> Self {
        RequestChecker::Kind(kind)
    }

    /// Conjunction, flattening nested conjunctions
    pub fn and(self, other: impl Into<RequestChecker>) -> Self {
        match (self, other.into()) {
            (RequestChecker::And(mut left), RequestChecker::And(right)) => {
                left.extend(right);
                RequestChecker::And(left)
            }
            (RequestChecker::And(mut left), right) => {
                left.push(right);
                RequestChecker::And(left)
            }
            (left, right) => RequestChecker::And(vec![left, right]),
        }
    }

    /// Disjunction, flattening nested disjunctions
    pub fn or(self, other: impl Into<RequestChecker>) -> Self {
        match (self, other.into()) {
            (RequestChecker::Or(mut left), RequestChecker::Or(right)) => {
                left.extend(right);
                RequestChecker::Or(left)
            }
            (RequestChecker::Or(mut left), right) => {
                left.push(right);
                RequestChecker::Or(left)
            }
            (left, right) => RequestChecker::Or(vec![left, right]),
        }
    }

    pub fn negate(self) -> Self {
        match self {
            RequestChecker::Not(inner) => *inner,
            other => RequestChecker::Not(Box::new(other)),
        }
    }

    pub fn check(&self, request: &Request) -> Result<(), CannotProvide> {
        match self {
            RequestChecker::Subclass(expected) => {
                if request.subject().is_subtype_of(expected) {
                    Ok(())
                } else {
                    Err(CannotProvide::new(format!(
                        "{} is not a subclass of {}",
                        request.subject(),
                        expected
                    )))
                }
            }
            RequestChecker::FieldName(name) => match request.field_name() {
                Some(field) if field == name => Ok(()),
                Some(field) => Err(CannotProvide::new(format!(
                    "field '{}' does not match '{}'",
                    field, name
                ))),
                None => Err(CannotProvide::new(format!(
                    "{} requests carry no field name",
                    request.kind()
                ))),
            },
            RequestChecker::Kind(kind) => {
                if request.kind() == *kind {
                    Ok(())
                } else {
                    Err(CannotProvide::new(format!(
                        "expected a {} request, got {}",
                        kind,
                        request.kind()
                    )))
                }
            }
            RequestChecker::And(checkers) => checkers.iter().try_for_each(|c| c.check(request)),
            RequestChecker::Or(checkers) => {
                let mut reasons = Vec::with_capacity(checkers.len());
                for checker in checkers {
                    match checker.check(request) {
                        Ok(()) => return Ok(()),
                        Err(rejection) => reasons.push(rejection.reason),
                    }
                }
                Err(CannotProvide::new(format!("none matched: {}", reasons.join("; "))))
            }
            RequestChecker::Not(inner) => match inner.check(request) {
                Ok(()) => Err(CannotProvide::new(format!("request matches {}", inner))),
                Err(_) => Ok(()),
            },
        }
    }

    pub fn accepts(&self, request: &Request) -> bool {
        self.check(request).is_ok()
    }
}

impl From<TypeRef> for RequestChecker {
    fn from(expected: TypeRef) -> Self {
        RequestChecker::Subclass(expected)
    }
}

impl From<&str> for RequestChecker {
    fn from(name: &str) -> Self {
        RequestChecker::FieldName(name.to_string())
    }
}

impl From<RequestKind> for RequestChecker {
    fn from(kind: RequestKind) -> Self {
        RequestChecker::Kind(kind)
    }
}

impl fmt::Display for RequestChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestChecker::Subclass(expected) => write!(f, "subclass of {}", expected),
            RequestChecker::FieldName(name) => write!(f, "field '{}'", name),
            RequestChecker::Kind(kind) => write!(f, "{} request", kind),
            RequestChecker::And(checkers) => write_joined(f, checkers, " and "),
            RequestChecker::Or(checkers) => write_joined(f, checkers, " or "),
            RequestChecker::Not(inner) => write!(f, "not {}", inner),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, checkers: &[RequestChecker], sep: &str) -> fmt::Result {
    f.write_str("(")?;
    for (i, checker) in checkers.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", checker)?;
    }
    f.write_str(")")
}
