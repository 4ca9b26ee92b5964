//! Morphic Core - capability resolution and conversion code synthesis
//!
//! This crate answers typed capability requests through an ordered chain of
//! providers and turns the resulting conversion plans into callable closures.
//!
//! # Main Components
//!
//! - **Error Handling**: Error types using `thiserror` and `anyhow`
//! - **Value Model**: Runtime values, functions and named types
//! - **Resolution Engine**: Requests, providers, checkers and combinators
//! - **Code Synthesis**: Plan lowering, hygienic naming and closure loading
//!
//! # Example
//!
//! ```
//! use morphic_core::provider::{Answer, FnProvider, Mediator, ProviderChain, Request, RequestKind, Resolver};
//! use morphic_core::codegen::{Plan, PlanArg, Signature};
//! use morphic_core::{CallArgs, ConversionRequest, FunctionRegistry, Record, TypeRef, Value};
//!
//! fn example() -> morphic_core::Result<()> {
//!     let upper = FunctionRegistry::with_builtins().get("str_upper").cloned().unwrap();
//!     let plans = FnProvider::new("names", move |_: &Mediator<'_>, _: &Request| {
//!         Ok(Answer::Plan(Plan::call(
//!             upper.clone(),
//!             [PlanArg::positional(Plan::attr(Plan::param("x"), "name"))],
//!         )))
//!     });
//!     let resolver = Resolver::new(ProviderChain::new().with_checked(RequestKind::Conversion, plans));
//!
//!     let converter = resolver.produce_converter(ConversionRequest {
//!         source: TypeRef::named("User"),
//!         target: TypeRef::str(),
//!         signature: Signature::positional(["x"])?,
//!     })?;
//!     let user = Value::object(Record::new("User").with_field("name", "bob"));
//!     assert_eq!(converter.call(CallArgs::positional([user]))?, Value::from("BOB"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod builtins;
pub mod codegen;
pub mod config;
pub mod error;
pub mod function;
pub mod provider;
pub mod types;
pub mod value;

// Re-export main types for convenience
pub use builtins::FunctionRegistry;
pub use codegen::{Closure, Loader, Plan, PlanArg, Signature, SynthesizedUnit, Synthesizer};
pub use config::{EngineConfig, ResolutionConfig, SynthesisConfig};
pub use error::{Error, EvalError, Result};
pub use function::{CallArgs, Function};
pub use provider::{
    Answer, CannotProvide, ConversionRequest, Provider, ProviderChain, Request, RequestChecker,
    RequestKind, ResolveError, Resolver,
};
pub use types::TypeRef;
pub use value::{Object, Record, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
