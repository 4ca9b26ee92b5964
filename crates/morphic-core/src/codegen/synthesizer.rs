//! Plan lowering
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license
//!
//! The synthesizer turns a [`Plan`] into a [`FunctionDef`] whose body is a
//! single `return` expression, together with the [`CaptureTable`] holding
//! every runtime object the body refers to by name. Values that can be
//! written as literals are inlined; everything else is captured under a
//! hygienic name.

use super::ast::{Argument, Expr, FunctionDef, GETATTR};
use super::error::CodegenError;
use super::namespace::{CaptureTable, Namespace};
use super::plan::{Accessor, AccessorElement, FunctionElement, Plan, PlanArg};
use super::signature::Signature;
use super::state::GenState;
use super::syntax::{is_identifier, is_literal_safe, sanitize_identifier};
use crate::function::Function;
use crate::value::Value;
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Name given to emitted closures unless configured otherwise
pub const DEFAULT_CLOSURE_NAME: &str = "broaching_closure";

/// Output of one synthesis pass
#[derive(Debug, Clone)]
pub struct SynthesizedUnit {
    pub function: FunctionDef,
    pub captures: CaptureTable,
}

impl SynthesizedUnit {
    /// Rendered source text of the emitted function
    pub fn source(&self) -> String {
        self.function.to_string()
    }

    /// The declared signature, annotations included
    pub fn signature(&self) -> &Signature {
        &self.function.signature
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }
}

/// Lowers plans into emitted functions
#[derive(Debug, Clone)]
pub struct Synthesizer {
    closure_name: String,
    reserved_names: Vec<String>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self {
            closure_name: DEFAULT_CLOSURE_NAME.to_string(),
            reserved_names: vec![GETATTR.to_string()],
        }
    }
}

impl Synthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different name for emitted closures
    pub fn with_closure_name(mut self, name: impl Into<String>) -> Result<Self, CodegenError> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(CodegenError::invalid_signature(format!(
                "closure name '{}' is not an identifier",
                name
            )));
        }
        self.closure_name = name;
        Ok(self)
    }

    /// Additional names the emitted code must never bind. `getattr` is
    /// always reserved.
    pub fn with_reserved_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.reserved_names.contains(&name) {
                self.reserved_names.push(name);
            }
        }
        self
    }

    pub fn closure_name(&self) -> &str {
        &self.closure_name
    }

    pub fn reserved_names(&self) -> &[String] {
        &self.reserved_names
    }

    /// Lower `plan` into a closure with the given signature
    pub fn synthesize(
        &self,
        plan: &Plan,
        signature: &Signature,
    ) -> Result<SynthesizedUnit, CodegenError> {
        if let Some(unknown) = plan.parameters().into_iter().find(|p| !signature.contains(p)) {
            return Err(CodegenError::UnknownParameter {
                name: unknown.to_string(),
            });
        }
        // A parameter shadowing a reserved name would change what the
        // rendered source calls
        if let Some(reserved) = signature
            .names()
            .find(|name| self.reserved_names.iter().any(|r| r == name))
        {
            return Err(CodegenError::NameCollision {
                name: reserved.to_string(),
            });
        }

        let occupied = signature
            .names()
            .map(str::to_string)
            .chain(std::iter::once(self.closure_name.clone()))
            .chain(self.reserved_names.iter().cloned());
        let mut state = GenState::new(Namespace::new(occupied));

        let body = self.lower(&mut state, plan)?;
        let unit = SynthesizedUnit {
            function: FunctionDef {
                name: self.closure_name.clone(),
                signature: signature.clone(),
                body,
            },
            captures: state.into_namespace().into_captures(),
        };
        debug!(
            closure = %unit.function.name,
            nodes = plan.node_count(),
            captures = unit.captures.len(),
            "synthesized closure"
        );
        Ok(unit)
    }

    fn lower(&self, state: &mut GenState, plan: &Plan) -> Result<Expr, CodegenError> {
        match plan {
            Plan::Parameter(element) => Ok(Expr::Name(element.name.clone())),
            Plan::Constant(element) => Ok(lower_constant(state, &element.value)),
            Plan::Function(element) => self.lower_call(state, element),
            Plan::Accessor(element) => self.lower_accessor(state, element),
        }
    }

    fn lower_call(
        &self,
        state: &mut GenState,
        element: &FunctionElement,
    ) -> Result<Expr, CodegenError> {
        if element.func.is_identity() {
            if let [PlanArg::Positional(inner)] = element.args.as_slice() {
                trace!("eliding identity call");
                return self.lower(state, inner);
            }
        }

        let func_value = Value::Function(element.func.clone());
        let func = match element.func.name().and_then(sanitize_identifier) {
            Some(preferred) => state.bind_exact(&preferred, func_value),
            None => state.allocate("func", func_value),
        };

        let mut args = Vec::with_capacity(element.args.len());
        let mut keywords = Vec::new();
        let mut seen_keys = BTreeSet::new();
        for arg in &element.args {
            if let PlanArg::Keyword { key, .. } = arg {
                if !seen_keys.insert(key.as_str()) {
                    return Err(CodegenError::DuplicateKeyword { key: key.clone() });
                }
            }
            let expr = self.lower(state, arg.element())?;
            match arg {
                PlanArg::Positional(_) => args.push(Argument::Positional(expr)),
                PlanArg::UnpackIterable(_) => args.push(Argument::Starred(expr)),
                PlanArg::Keyword { key, .. } if is_identifier(key) => {
                    keywords.push(Argument::Keyword(key.clone(), expr))
                }
                PlanArg::Keyword { key, .. } => {
                    return Err(CodegenError::InvalidKeyword { key: key.clone() })
                }
                PlanArg::UnpackMapping(_) => keywords.push(Argument::DoubleStarred(expr)),
            }
        }
        args.extend(keywords);
        Ok(Expr::Call { func, args })
    }

    fn lower_accessor(
        &self,
        state: &mut GenState,
        element: &AccessorElement,
    ) -> Result<Expr, CodegenError> {
        let target = Box::new(self.lower(state, &element.target)?);
        let expr = match &element.accessor {
            Accessor::Attribute(name) if is_identifier(name) => Expr::Attribute {
                target,
                name: name.clone(),
            },
            Accessor::Attribute(name) => Expr::DynamicAttribute {
                target,
                name: name.clone(),
            },
            Accessor::Item(key) if is_literal_safe(key) => Expr::Subscript {
                target,
                key: key.clone(),
            },
            Accessor::Item(key) => {
                let getter = Function::item_getter(key.clone());
                call_captured(state, "accessor", Value::Function(getter), *target)
            }
            Accessor::Getter(getter) => {
                call_captured(state, "accessor", Value::Function(getter.clone()), *target)
            }
        };
        Ok(expr)
    }
}

fn lower_constant(state: &mut GenState, value: &Value) -> Expr {
    if is_literal_safe(value) {
        Expr::Literal(value.clone())
    } else {
        Expr::Name(state.allocate("constant", value.clone()))
    }
}

fn call_captured(state: &mut GenState, prefix: &str, callee: Value, target: Expr) -> Expr {
    Expr::Call {
        func: state.allocate(prefix, callee),
        args: vec![Argument::Positional(target)],
    }
}
