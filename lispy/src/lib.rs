// Lispy Library
// A small Lisp: parser, direct evaluator and lambda pre-compiler
pub mod ast;
pub mod config;
pub mod error;
pub mod input_handling;
pub mod parser;
pub mod runtime;

// Re-export the main parsing functions and the AST.
pub use ast::*;
pub use error::LispyError;
pub use parser::{errors::PestParseError, parse, parse_expression, parse_forms};
pub use runtime::evaluator::Evaluator;
pub use runtime::{Function, Runtime, RuntimeError, RuntimeResult, Value};
