// ABOUTME: Error types for FEEL parsing and evaluation failures

use thiserror::Error;

/// Errors raised while evaluating an AST against a context.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Operand constraint violation: mismatched operand types, unequal
    /// quantifier list lengths, or invocation inputs that fail their schema.
    #[error("{message}")]
    Validation { message: String },

    /// Runtime failure: division by zero, integer overflow, an invalid
    /// temporal literal, a bad regular expression, or a value that is not
    /// callable where a callable is required.
    #[error("{message}")]
    Evaluation { message: String },

    /// A context-resolved call found nothing under the name.
    #[error("unknown function: {0}")]
    UnknownFunction(String),
}

impl EvalError {
    /// Create a validation error from any message
    pub fn validation(message: impl Into<String>) -> Self {
        EvalError::Validation {
            message: message.into(),
        }
    }

    /// Create an evaluation error from any message
    pub fn evaluation(message: impl Into<String>) -> Self {
        EvalError::Evaluation {
            message: message.into(),
        }
    }
}

/// Top-level error surfaced by the public API: either the expression did not
/// parse, or it failed during evaluation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeelError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Eval(#[from] EvalError),
}
