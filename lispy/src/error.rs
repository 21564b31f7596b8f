// Crate-level error type for the runtime facade

use crate::parser::PestParseError;
use crate::runtime::error::RuntimeError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LispyError {
    #[error("Parse error: {0}")]
    Parse(#[from] PestParseError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Expected a function, got {0}")]
    NotAFunction(String),
}
