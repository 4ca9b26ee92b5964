//! Error types for the Morphic core library
//!
//! This module defines the crate-level error that wraps the failures of every
//! subsystem (resolution, code synthesis, evaluation, configuration), using
//! thiserror for ergonomic error definitions and anyhow for opaque provider
//! failures.

use crate::codegen::CodegenError;
use crate::provider::ResolveError;
use std::fmt;
use thiserror::Error;

/// Main error type for Morphic operations
#[derive(Error, Debug)]
pub enum Error {
    /// Capability resolution failed
    #[error("Resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Plan lowering or loading failed
    #[error("Code synthesis failed: {0}")]
    Codegen(#[from] CodegenError),

    /// A loaded closure failed while evaluating
    #[error("Evaluation failed: {0}")]
    Eval(#[from] EvalError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error without an underlying cause
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Failures raised while a loaded closure or a native function runs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// A value of the wrong shape reached an operation
    #[error("Type mismatch in {context}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        context: String,
    },

    /// Attribute lookup failed
    #[error("'{type_name}' object has no attribute '{attribute}'")]
    MissingAttribute { type_name: String, attribute: String },

    /// Item lookup failed
    #[error("'{type_name}' object has no item {key}")]
    MissingItem { type_name: String, key: String },

    /// The callee received the wrong number of positional arguments
    #[error("{function}() takes {expected} positional argument(s) but {found} were given")]
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    /// A required parameter was not supplied
    #[error("missing required argument '{name}'")]
    MissingArgument { name: String },

    /// A keyword argument matched no parameter
    #[error("got an unexpected keyword argument '{name}'")]
    UnexpectedArgument { name: String },

    /// A parameter received more than one value
    #[error("got multiple values for argument '{name}'")]
    DuplicateArgument { name: String },

    /// Positional arguments overflowed the signature
    #[error("takes {expected} positional argument(s) but {found} were given")]
    TooManyPositional { expected: usize, found: usize },

    /// A name was referenced that is neither a parameter nor a capture
    #[error("name '{name}' is not defined")]
    UnboundName { name: String },

    /// A native function reported a failure
    #[error("{function}() failed: {message}")]
    Function { function: String, message: String },
}

impl EvalError {
    /// Create a type mismatch error
    pub fn type_mismatch(
        expected: impl Into<String>,
        found: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            context: context.into(),
        }
    }

    /// Create a native function failure
    pub fn function(function: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Function {
            function: function.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::configuration("closure name must be an identifier");
        assert_eq!(
            err.to_string(),
            "Configuration error: closure name must be an identifier"
        );
    }

    #[test]
    fn test_eval_error_display() {
        let err = EvalError::MissingAttribute {
            type_name: "User".to_string(),
            attribute: "email".to_string(),
        };
        assert_eq!(err.to_string(), "'User' object has no attribute 'email'");

        let err = EvalError::Arity {
            function: "len".to_string(),
            expected: 1,
            found: 2,
        };
        assert!(err.to_string().starts_with("len() takes 1"));
    }

    #[test]
    fn test_eval_error_wraps_into_crate_error() {
        let err: Error = EvalError::UnboundName {
            name: "ghost".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Eval(_)));
        assert!(err.to_string().contains("ghost"));
    }
}
