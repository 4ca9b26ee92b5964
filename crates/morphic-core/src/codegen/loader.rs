//! Loading synthesized units into callable closures
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license
//!
//! A loaded [`Closure`] evaluates the emitted expression tree directly: call
//! arguments are bound against the declared signature, names are looked up
//! in the parameter scope and then in the capture table.

use super::ast::{Argument, Expr, FunctionDef};
use super::error::CodegenError;
use super::namespace::CaptureTable;
use super::signature::Signature;
use super::synthesizer::SynthesizedUnit;
use crate::error::EvalError;
use crate::function::{CallArgs, Function};
use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Turns synthesized units into closures
#[derive(Debug, Default, Clone, Copy)]
pub struct Loader;

impl Loader {
    pub fn new() -> Self {
        Self
    }

    /// Validate that every name the body reads is a parameter or a capture,
    /// then wrap the unit into a closure
    pub fn load(&self, unit: SynthesizedUnit) -> Result<Closure, CodegenError> {
        let SynthesizedUnit { function, captures } = unit;
        if let Some(name) = function
            .body
            .free_names()
            .into_iter()
            .find(|name| !function.signature.contains(name) && !captures.contains(name))
        {
            return Err(CodegenError::UnboundName {
                name: name.to_string(),
            });
        }
        let source = function.to_string();
        tracing::trace!(closure = %function.name, "loaded closure");
        Ok(Closure {
            inner: Arc::new(ClosureInner {
                function,
                captures,
                source,
            }),
        })
    }
}

#[derive(Debug)]
struct ClosureInner {
    function: FunctionDef,
    captures: CaptureTable,
    source: String,
}

/// A live callable produced from a synthesized unit. Cloning shares the
/// underlying unit.
#[derive(Debug, Clone)]
pub struct Closure {
    inner: Arc<ClosureInner>,
}

impl Closure {
    pub fn name(&self) -> &str {
        &self.inner.function.name
    }

    /// The declared signature, annotations included
    pub fn signature(&self) -> &Signature {
        &self.inner.function.signature
    }

    pub fn source(&self) -> &str {
        &self.inner.source
    }

    pub fn captures(&self) -> &CaptureTable {
        &self.inner.captures
    }

    pub fn call(&self, args: CallArgs) -> Result<Value, EvalError> {
        let bound = self.signature().bind(args)?;
        let scope = Scope {
            params: &bound,
            captures: &self.inner.captures,
        };
        scope.eval(&self.inner.function.body)
    }

    /// Wrap the closure into a named [`Function`] value
    pub fn into_function(self) -> Function {
        let name = self.name().to_string();
        Function::new(name, move |args| self.call(args))
    }
}

impl fmt::Display for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<closure {}{}>", self.name(), self.signature())
    }
}

struct Scope<'a> {
    params: &'a [(String, Value)],
    captures: &'a CaptureTable,
}

impl Scope<'_> {
    fn lookup(&self, name: &str) -> Result<&Value, EvalError> {
        self.params
            .iter()
            .find(|(param, _)| param == name)
            .map(|(_, value)| value)
            .or_else(|| self.captures.get(name))
            .ok_or_else(|| EvalError::UnboundName {
                name: name.to_string(),
            })
    }

    fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        match expr {
            Expr::Name(name) => self.lookup(name).cloned(),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Call { func, args } => {
                let callee = match self.lookup(func)? {
                    Value::Function(function) => function.clone(),
                    other => {
                        return Err(EvalError::type_mismatch(
                            "callable",
                            other.type_name(),
                            format!("call of '{}'", func),
                        ))
                    }
                };
                callee.call(self.eval_args(func, args)?)
            }
            Expr::Attribute { target, name } | Expr::DynamicAttribute { target, name } => {
                self.eval(target)?.get_attr(name)
            }
            Expr::Subscript { target, key } => self.eval(target)?.get_item(key),
        }
    }

    fn eval_args(&self, func: &str, args: &[Argument]) -> Result<CallArgs, EvalError> {
        let mut call_args = CallArgs::new();
        for arg in args {
            match arg {
                Argument::Positional(expr) => call_args.positional.push(self.eval(expr)?),
                Argument::Starred(expr) => match self.eval(expr)? {
                    Value::List(items) | Value::Tuple(items) => call_args.positional.extend(items),
                    Value::Str(s) => call_args
                        .positional
                        .extend(s.chars().map(|c| Value::Str(c.to_string()))),
                    Value::Map(entries) => {
                        call_args.positional.extend(entries.into_iter().map(|(k, _)| k))
                    }
                    other => {
                        return Err(EvalError::type_mismatch(
                            "iterable",
                            other.type_name(),
                            format!("argument unpacking in call of '{}'", func),
                        ))
                    }
                },
                Argument::Keyword(key, expr) => {
                    let value = self.eval(expr)?;
                    push_keyword(&mut call_args, key.clone(), value)?;
                }
                Argument::DoubleStarred(expr) => match self.eval(expr)? {
                    Value::Map(entries) => {
                        for (key, value) in entries {
                            match key {
                                Value::Str(key) => push_keyword(&mut call_args, key, value)?,
                                other => {
                                    return Err(EvalError::type_mismatch(
                                        "str keys",
                                        other.type_name(),
                                        format!("keyword unpacking in call of '{}'", func),
                                    ))
                                }
                            }
                        }
                    }
                    other => {
                        return Err(EvalError::type_mismatch(
                            "mapping",
                            other.type_name(),
                            format!("keyword unpacking in call of '{}'", func),
                        ))
                    }
                },
            }
        }
        Ok(call_args)
    }
}

fn push_keyword(call_args: &mut CallArgs, key: String, value: Value) -> Result<(), EvalError> {
    if call_args.keyword.iter().any(|(k, _)| *k == key) {
        return Err(EvalError::DuplicateArgument { name: key });
    }
    call_args.keyword.push((key, value));
    Ok(())
}
