// Runtime values for Lispy

use crate::ast::{Literal, Symbol};
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::lambda_compiler::{Closure, Placeholder};
use crate::runtime::numeric;
use itertools::Itertools;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use std::fmt;
use std::rc::Rc;

/// Fractional digits printed for floats when no precision is requested.
pub const DEFAULT_FLOAT_DIGITS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Boolean(bool),
    Integer(BigInt),
    Float(BigRational),
    String(String),
    Symbol(Symbol),
    List(Vec<Value>),
    Function(Function),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Boolean(b) => *b,
            Value::Integer(n) => !n.is_zero(),
            Value::Float(f) => !f.is_zero(),
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Symbol(_) | Value::Function(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Function(_) => "function",
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    pub fn symbol(name: &str) -> Self {
        Value::Symbol(Symbol::new(name))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(items)
    }

    /// List view of a value; `nil` reads as the empty list.
    pub fn as_list(&self, operation: &str) -> RuntimeResult<&[Value]> {
        match self {
            Value::List(items) => Ok(items),
            Value::Nil => Ok(&[]),
            other => Err(RuntimeError::type_error("list", other.type_name(), operation)),
        }
    }

    pub fn as_function(&self, operation: &str) -> RuntimeResult<&Function> {
        match self {
            Value::Function(f) => Ok(f),
            other => Err(RuntimeError::type_error(
                "function",
                other.type_name(),
                operation,
            )),
        }
    }

    fn write_to(&self, f: &mut fmt::Formatter<'_>, digits: usize) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Boolean(true) => write!(f, "#t"),
            Value::Boolean(false) => write!(f, "#f"),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(r) => write!(f, "{}", numeric::format_rational(r, digits)),
            Value::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Value::Symbol(s) => write!(f, "{}", s.0),
            Value::List(items) => write!(
                f,
                "({})",
                items
                    .iter()
                    .format_with(" ", |item, g| g(&format_args!("{:.*}", digits, item)))
            ),
            Value::Function(func) => write!(f, "{}", func),
        }
    }
}

fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}

/// `{}` prints floats with [`DEFAULT_FLOAT_DIGITS`]; `{:.N}` caps them at N
/// fractional digits, nested lists included.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = f.precision().unwrap_or(DEFAULT_FLOAT_DIGITS);
        self.write_to(f, digits)
    }
}

impl From<Literal> for Value {
    fn from(literal: Literal) -> Self {
        match literal {
            Literal::Integer(n) => Value::Integer(n),
            Literal::Float(r) => Value::Float(r),
            Literal::String(s) => Value::String(s),
            Literal::Boolean(b) => Value::Boolean(b),
            Literal::Nil => Value::Nil,
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        Value::from(literal.clone())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(BigInt::from(n))
    }
}

impl From<BigInt> for Value {
    fn from(n: BigInt) -> Self {
        Value::Integer(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Value::Function(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arity {
    Fixed(usize),
    Variadic(usize), // Minimum number of arguments
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(n) => count == *n,
            Arity::Variadic(min) => count >= *min,
            Arity::Range(min, max) => count >= *min && count <= *max,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Fixed(n) => write!(f, "{}", n),
            Arity::Variadic(n) => write!(f, "at least {}", n),
            Arity::Range(min, max) => write!(f, "{}-{}", min, max),
        }
    }
}

pub type BuiltinFn = Rc<dyn Fn(Vec<Value>) -> RuntimeResult<Value>>;

#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: String,
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl PartialEq for BuiltinFunction {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

/// Anything callable. Builtins, compiled closures and recursion placeholders
/// share one calling convention: an ordered vector of evaluated arguments.
#[derive(Debug, Clone)]
pub enum Function {
    Builtin(BuiltinFunction),
    Closure(Rc<Closure>),
    Placeholder(Placeholder),
}

impl Function {
    pub fn builtin<F>(name: &str, arity: Arity, func: F) -> Self
    where
        F: Fn(Vec<Value>) -> RuntimeResult<Value> + 'static,
    {
        Function::Builtin(BuiltinFunction {
            name: name.to_string(),
            arity,
            func: Rc::new(func),
        })
    }

    pub fn call(&self, args: Vec<Value>) -> RuntimeResult<Value> {
        match self {
            Function::Builtin(builtin) => {
                if !builtin.arity.accepts(args.len()) {
                    return Err(RuntimeError::arity_mismatch(
                        &builtin.name,
                        builtin.arity.to_string(),
                        args.len(),
                    ));
                }
                (builtin.func)(args)
            }
            Function::Closure(closure) => closure.invoke(args),
            Function::Placeholder(placeholder) => placeholder.resolve()?.invoke(args),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Function::Builtin(builtin) => Some(&builtin.name),
            Function::Closure(closure) => closure.name(),
            Function::Placeholder(placeholder) => Some(placeholder.name()),
        }
    }

    /// The compiled closure behind this function, seeing through a filled
    /// placeholder.
    pub fn closure(&self) -> Option<Rc<Closure>> {
        match self {
            Function::Builtin(_) => None,
            Function::Closure(closure) => Some(Rc::clone(closure)),
            Function::Placeholder(placeholder) => placeholder.resolve().ok(),
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Function::Builtin(a), Function::Builtin(b)) => a == b,
            (Function::Placeholder(a), Function::Placeholder(b)) if a == b => true,
            _ => match (self.closure(), other.closure()) {
                (Some(a), Some(b)) => Rc::ptr_eq(&a, &b),
                _ => false,
            },
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Builtin(builtin) => write!(f, "#<builtin {}>", builtin.name),
            Function::Closure(closure) => match closure.name() {
                Some(name) => write!(f, "#<closure {}>", name),
                None => write!(f, "#<lambda>"),
            },
            Function::Placeholder(placeholder) => match placeholder.resolve() {
                Ok(closure) => write!(f, "{}", Function::Closure(closure)),
                Err(_) => write!(f, "#<placeholder {}>", placeholder.name()),
            },
        }
    }
}
