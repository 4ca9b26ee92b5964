//! Capability resolution
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license
//!
//! Callers ask for a capability with a typed [`Request`]. A [`Resolver`]
//! walks its [`ProviderChain`]; each [`Provider`] either answers, refuses
//! with [`CannotProvide`], or fails. Combinators build richer providers out
//! of simple ones: [`ConstrainingProxyProvider`] guards a provider with a
//! [`RequestChecker`], [`NextProvider`] defers to the rest of the chain and
//! [`Pipeline`] runs several stages and reduces their answers.

pub mod checker;
pub mod class_dispatcher;
pub mod error;
pub mod essential;
pub mod mediator;
pub mod pipeline;
pub mod proxy;
pub mod request;
pub mod resolver;
pub mod static_provider;

#[cfg(test)]
mod tests;

pub use checker::RequestChecker;
pub use class_dispatcher::{ClassDispatcher, TypeDispatchProvider};
pub use error::{CannotProvide, ProvideError, ProvideResult, Refusal, ResolveError, UnexpectedAnswer};
pub use essential::{Answer, FnProvider, Provider};
pub use mediator::{ChainEntry, Mediator, ProviderChain};
pub use pipeline::{CollectAnswers, ComposeFunctions, Pipeline, PipelineReducer};
pub use proxy::{ConstrainingProxyProvider, NextProvider};
pub use request::{ConversionRequest, FieldRequest, Request, RequestKind, TypeRequest};
pub use resolver::Resolver;
pub use static_provider::{StaticProvider, StaticProviderBuilder};
