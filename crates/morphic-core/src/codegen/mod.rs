//! Code synthesis
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license
//!
//! This module lowers conversion [`Plan`]s into single-expression closures.
//! A synthesis pass produces a [`SynthesizedUnit`], i.e. the emitted
//! function (an expression tree that renders to source text) and the table of
//! captured runtime objects it refers to. The [`Loader`] turns a unit into a
//! callable [`Closure`].
//!
//! # Example
//!
//! ```
//! use morphic_core::codegen::{Loader, Plan, PlanArg, Signature, Synthesizer};
//! use morphic_core::{CallArgs, FunctionRegistry, Record, Value};
//!
//! let registry = FunctionRegistry::with_builtins();
//! let upper = registry.get("str_upper").unwrap().clone();
//! let plan = Plan::call(upper, [PlanArg::positional(Plan::attr(Plan::param("x"), "name"))]);
//! let signature = Signature::positional(["x"]).unwrap();
//!
//! let unit = Synthesizer::new().synthesize(&plan, &signature).unwrap();
//! assert_eq!(unit.source(), "def broaching_closure(x):\n    return str_upper(x.name)\n");
//!
//! let closure = Loader::new().load(unit).unwrap();
//! let user = Value::object(Record::new("User").with_field("name", "bob"));
//! assert_eq!(closure.call(CallArgs::positional([user])).unwrap(), Value::from("BOB"));
//! ```

pub mod ast;
pub mod error;
pub mod loader;
pub mod namespace;
pub mod plan;
pub mod signature;
pub mod state;
pub mod synthesizer;
pub mod syntax;

#[cfg(test)]
mod tests;

pub use ast::{Argument, Expr, FunctionDef};
pub use error::CodegenError;
pub use loader::{Closure, Loader};
pub use namespace::{CaptureTable, Namespace};
pub use plan::{
    Accessor, AccessorElement, ConstantElement, FunctionElement, ParameterElement, Plan, PlanArg,
};
pub use signature::{Parameter, ParameterKind, Signature};
pub use state::GenState;
pub use synthesizer::{SynthesizedUnit, Synthesizer, DEFAULT_CLOSURE_NAME};
pub use syntax::{is_identifier, is_literal_safe, render_literal};
