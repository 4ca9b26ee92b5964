//! Error types for plan synthesis and loading
//!
//! Copyright (c) 2025 Morphic Team
//! Licensed under the Apache-2.0 license

use thiserror::Error;

/// Failures raised while lowering a plan or loading the emitted unit.
///
/// None of these are expected when going through the synthesizer with a
/// well-formed plan; they indicate misuse of the lower-level pieces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// Raw namespace insertion hit a bound or occupied name
    #[error("Name collision: '{name}' is already bound or occupied")]
    NameCollision { name: String },

    /// The plan references a parameter the target signature does not declare
    #[error("Plan references unknown parameter '{name}'")]
    UnknownParameter { name: String },

    /// A keyword slot of a function call carries a key that cannot be emitted
    #[error("Keyword argument '{key}' is not an identifier")]
    InvalidKeyword { key: String },

    /// A function call names the same keyword argument twice
    #[error("Keyword argument '{key}' is repeated")]
    DuplicateKeyword { key: String },

    /// The target signature itself is malformed
    #[error("Invalid signature: {message}")]
    InvalidSignature { message: String },

    /// The emitted body uses a name that is neither a parameter nor a capture
    #[error("Emitted code references unbound name '{name}'")]
    UnboundName { name: String },
}

impl CodegenError {
    pub fn invalid_signature(message: impl Into<String>) -> Self {
        Self::InvalidSignature {
            message: message.into(),
        }
    }
}
