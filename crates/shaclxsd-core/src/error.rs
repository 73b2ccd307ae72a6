//! Error types for graph loading

use thiserror::Error;

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while loading a shapes graph
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("[line {line}] unrecognized input '{text}'")]
    Lex { line: usize, text: String },

    #[error("[line {line}] {message}")]
    Syntax { line: usize, message: String },

    #[error("[line {line}] undefined prefix '{prefix}:'")]
    UndefinedPrefix { line: usize, prefix: String },

    #[error("[line {line}] invalid escape sequence '\\{sequence}'")]
    InvalidEscape { line: usize, sequence: String },

    #[error("relative IRI <{0}> used without a base")]
    RelativeIri(String),
}

impl CoreError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        CoreError::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line number the error points at, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            CoreError::Lex { line, .. }
            | CoreError::Syntax { line, .. }
            | CoreError::UndefinedPrefix { line, .. }
            | CoreError::InvalidEscape { line, .. } => Some(*line),
            CoreError::RelativeIri(_) => None,
        }
    }
}
