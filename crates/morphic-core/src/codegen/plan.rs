//! Plan model: the expression tree describing a conversion
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use crate::function::Function;
use crate::value::Value;
use std::collections::BTreeSet;

/// A conversion plan. Plans are pure expression trees: every node lowers to
/// exactly one expression of the emitted body.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Reference to a formal parameter of the target signature
    Parameter(ParameterElement),
    /// Value embedded as a literal or captured by reference
    Constant(ConstantElement),
    /// Call of a function with ordered argument slots
    Function(FunctionElement),
    /// Member, item or getter access on a sub-plan
    Accessor(AccessorElement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterElement {
    pub name: String,
}

/// Constant node. Equality follows [`Value`] equality, so two distinct
/// objects with equal contents are different constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantElement {
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionElement {
    pub func: Function,
    pub args: Vec<PlanArg>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AccessorElement {
    pub target: Box<Plan>,
    pub accessor: Accessor,
}

/// A single argument slot of a function call
#[derive(Debug, Clone, PartialEq)]
pub enum PlanArg {
    Positional(Plan),
    Keyword { key: String, element: Plan },
    /// `*element`
    UnpackIterable(Plan),
    /// `**element`
    UnpackMapping(Plan),
}

/// How an accessor reaches into its target
#[derive(Debug, Clone, PartialEq)]
pub enum Accessor {
    /// Named member access
    Attribute(String),
    /// Keyed item access
    Item(Value),
    /// Arbitrary single-argument getter
    Getter(Function),
}

impl Plan {
    pub fn param(name: impl Into<String>) -> Self {
        Plan::Parameter(ParameterElement { name: name.into() })
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Plan::Constant(ConstantElement {
            value: value.into(),
        })
    }

    pub fn call(func: Function, args: impl IntoIterator<Item = PlanArg>) -> Self {
        Plan::Function(FunctionElement {
            func,
            args: args.into_iter().collect(),
        })
    }

    pub fn attr(target: Plan, name: impl Into<String>) -> Self {
        Self::access(target, Accessor::Attribute(name.into()))
    }

    pub fn item(target: Plan, key: impl Into<Value>) -> Self {
        Self::access(target, Accessor::Item(key.into()))
    }

    pub fn getter(target: Plan, getter: Function) -> Self {
        Self::access(target, Accessor::Getter(getter))
    }

    pub fn access(target: Plan, accessor: Accessor) -> Self {
        Plan::Accessor(AccessorElement {
            target: Box::new(target),
            accessor,
        })
    }

    /// Names of every parameter the plan references
    pub fn parameters(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        self.collect_parameters(&mut names);
        names
    }

    fn collect_parameters<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Plan::Parameter(element) => {
                names.insert(element.name.as_str());
            }
            Plan::Constant(_) => {}
            Plan::Function(element) => {
                for arg in &element.args {
                    arg.element().collect_parameters(names);
                }
            }
            Plan::Accessor(element) => element.target.collect_parameters(names),
        }
    }

    /// Number of nodes in the tree
    pub fn node_count(&self) -> usize {
        match self {
            Plan::Parameter(_) | Plan::Constant(_) => 1,
            Plan::Function(element) => {
                1 + element
                    .args
                    .iter()
                    .map(|arg| arg.element().node_count())
                    .sum::<usize>()
            }
            Plan::Accessor(element) => 1 + element.target.node_count(),
        }
    }
}

impl PlanArg {
    pub fn positional(element: Plan) -> Self {
        PlanArg::Positional(element)
    }

    pub fn keyword(key: impl Into<String>, element: Plan) -> Self {
        PlanArg::Keyword {
            key: key.into(),
            element,
        }
    }

    /// The sub-plan held by this slot, whatever its kind
    pub fn element(&self) -> &Plan {
        match self {
            PlanArg::Positional(element)
            | PlanArg::Keyword { element, .. }
            | PlanArg::UnpackIterable(element)
            | PlanArg::UnpackMapping(element) => element,
        }
    }
}

impl From<ParameterElement> for Plan {
    fn from(element: ParameterElement) -> Self {
        Plan::Parameter(element)
    }
}

impl From<ConstantElement> for Plan {
    fn from(element: ConstantElement) -> Self {
        Plan::Constant(element)
    }
}

impl From<FunctionElement> for Plan {
    fn from(element: FunctionElement) -> Self {
        Plan::Function(element)
    }
}

impl From<AccessorElement> for Plan {
    fn from(element: AccessorElement) -> Self {
        Plan::Accessor(element)
    }
}
