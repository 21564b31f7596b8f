//! Lispy Runtime System
//!
//! High-level runtime entry points. The heavy logic is implemented in the
//! submodules listed below: the direct evaluator handles top-level forms and
//! hands `lambda`/`defun` bodies to the lambda compiler.

pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lambda_compiler;
pub mod numeric;
pub mod stdlib;
pub mod values;


pub use environment::Environment;
pub use error::{RuntimeError, RuntimeResult};
pub use evaluator::Evaluator;
pub use lambda_compiler::{CallContext, Closure, CompiledNode, LambdaCompiler, Placeholder};
pub use values::{Arity, BuiltinFunction, Function, Value};

use crate::error::LispyError;
use crate::parser::{self, PestParseError};

/// Parses and evaluates source text against one persistent root environment.
#[derive(Debug, Clone, Default)]
pub struct Runtime {
    evaluator: Evaluator,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_evaluator(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Evaluates a whole program and returns the value of its last form.
    pub fn evaluate(&self, input: &str) -> Result<Value, LispyError> {
        let program = parser::parse(input)?;
        Ok(self.evaluator.evaluate(&program)?)
    }

    /// Evaluates each top-level form on its own; an error in one form does not
    /// stop the forms after it.
    pub fn evaluate_each(&self, input: &str) -> Result<Vec<RuntimeResult<Value>>, PestParseError> {
        let forms = parser::parse_forms(input)?;
        Ok(forms
            .iter()
            .map(|form| self.evaluator.evaluate(form))
            .collect())
    }

    /// Evaluates `input` and returns the resulting function, e.g. the closure
    /// produced by a `defun`.
    pub fn function(&self, input: &str) -> Result<Function, LispyError> {
        match self.evaluate(input)? {
            Value::Function(function) => Ok(function),
            other => Err(LispyError::NotAFunction(other.type_name().to_string())),
        }
    }
}
