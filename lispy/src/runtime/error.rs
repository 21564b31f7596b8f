// Error handling for the Lispy runtime

use crate::ast::Symbol;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Runtime errors that can occur while evaluating a top-level form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeError {
    /// Lookup or `set!` of a name no frame binds
    #[error("Undefined symbol: {0}")]
    UndefinedSymbol(Symbol),

    /// Wrong number of arguments
    #[error("Arity mismatch in {function}: expected {expected} arguments, got {actual}")]
    ArityMismatch {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Wrong type for operation
    #[error("Type error in {operation}: expected {expected}, got {actual}")]
    TypeError {
        expected: String,
        actual: String,
        operation: String,
    },

    /// A form the lambda compiler does not handle inside a function body
    #[error("{0} is not implemented inside lambda body")]
    UnsupportedForm(String),

    #[error("Malformed quote: {0}")]
    MalformedQuote(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl RuntimeError {
    pub fn type_error(expected: &str, actual: &str, operation: &str) -> Self {
        RuntimeError::TypeError {
            expected: expected.to_string(),
            actual: actual.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn arity_mismatch(function: &str, expected: impl Into<String>, actual: usize) -> Self {
        RuntimeError::ArityMismatch {
            function: function.to_string(),
            expected: expected.into(),
            actual,
        }
    }
}
