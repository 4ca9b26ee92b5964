//! Error types for the Morphic CLI
//!
//! This module defines CLI-specific error types that wrap core library
//! errors and add context for command-line operations.

use morphic_core::codegen::CodegenError;
use morphic_core::{EvalError, ResolveError};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Core library error
    #[error(transparent)]
    Core(#[from] morphic_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {expected}", path.display())]
    InvalidFormat { path: PathBuf, expected: String },

    /// Plan file parsed but does not describe a valid plan
    #[error("Invalid plan file {}: {message}", path.display())]
    PlanFile { path: PathBuf, message: String },

    /// Plan file references a function missing from the registry
    #[error("Unknown function '{name}' (see `morphic functions`)")]
    UnknownFunction { name: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command-line arguments
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl From<ResolveError> for Error {
    fn from(err: ResolveError) -> Self {
        Self::Core(err.into())
    }
}

impl From<CodegenError> for Error {
    fn from(err: CodegenError) -> Self {
        Self::Core(err.into())
    }
}

impl From<EvalError> for Error {
    fn from(err: EvalError) -> Self {
        Self::Core(err.into())
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(core) => match core {
                morphic_core::Error::Resolve(_) => 2,
                morphic_core::Error::Codegen(_) => 3,
                morphic_core::Error::Eval(_) => 4,
                morphic_core::Error::Configuration { .. } => 5,
                morphic_core::Error::Json { .. } => 12,
            },
            Self::FileNotFound { .. } => 6,
            Self::InvalidFormat { .. } => 7,
            Self::PlanFile { .. } => 8,
            Self::UnknownFunction { .. } => 9,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 10,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) => 14,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Format an error for display to the user, followed by its causes
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    let mut source = std::error::Error::source(error);
    // Transparent wrappers repeat the message of their source
    if matches!(error, Error::Core(_)) {
        source = source.and_then(std::error::Error::source);
    }
    while let Some(cause) = source {
        message.push_str(&format!("\n  caused by: {}", cause));
        source = cause.source();
    }
    message
}
