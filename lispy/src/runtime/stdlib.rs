//! Lispy Standard Library
//!
//! Builtins bound in every root environment:
//! - List functions (`car`, `cdr`, `cons`, `list`, `length`)
//! - Arithmetic over the numeric tower (`+`, `-`, `*`, `/`)
//! - Numeric comparison (`>`, `<`, `>=`, `<=`, `=`)
//! - Equality and boolean logic (`eq?`, `equal?`, `not`, `and`, `or`)
//! - Higher-order helpers (`apply`, `map`, `begin`) and the constant `pi`
//!
//! Builtins are ordinary functions: their arguments are evaluated before the
//! call, so `and`/`or` do not short-circuit.

use crate::ast::Symbol;
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::numeric::Number;
use crate::runtime::values::{Arity, BuiltinFunction, Function, Value};
use num_bigint::BigInt;
use num_rational::BigRational;
use std::cmp::Ordering;
use std::rc::Rc;

/// The Standard Library for the Lispy runtime.
pub struct StandardLibrary;

impl StandardLibrary {
    /// Creates a root environment with every builtin loaded.
    pub fn create_global_environment() -> Environment {
        let env = Environment::new();
        Self::load_list_functions(&env);
        Self::load_arithmetic_functions(&env);
        Self::load_comparison_functions(&env);
        Self::load_equality_functions(&env);
        Self::load_boolean_functions(&env);
        Self::load_higher_order_functions(&env);
        Self::load_constants(&env);
        env
    }

    fn define_builtin(
        env: &Environment,
        name: &str,
        arity: Arity,
        func: fn(Vec<Value>) -> RuntimeResult<Value>,
    ) {
        env.define(
            &Symbol::new(name),
            Value::Function(Function::Builtin(BuiltinFunction {
                name: name.to_string(),
                arity,
                func: Rc::new(func),
            })),
        );
    }

    pub(crate) fn load_list_functions(env: &Environment) {
        Self::define_builtin(env, "car", Arity::Fixed(1), Self::car);
        Self::define_builtin(env, "cdr", Arity::Fixed(1), Self::cdr);
        Self::define_builtin(env, "cons", Arity::Fixed(2), Self::cons);
        Self::define_builtin(env, "list", Arity::Variadic(0), Self::list);
        Self::define_builtin(env, "length", Arity::Fixed(1), Self::length);
    }

    pub(crate) fn load_arithmetic_functions(env: &Environment) {
        Self::define_builtin(env, "+", Arity::Variadic(0), Self::add);
        Self::define_builtin(env, "-", Arity::Range(1, 2), Self::subtract);
        Self::define_builtin(env, "*", Arity::Variadic(0), Self::multiply);
        Self::define_builtin(env, "/", Arity::Fixed(2), Self::divide);
    }

    pub(crate) fn load_comparison_functions(env: &Environment) {
        Self::define_builtin(env, ">", Arity::Fixed(2), Self::greater_than);
        Self::define_builtin(env, "<", Arity::Fixed(2), Self::less_than);
        Self::define_builtin(env, ">=", Arity::Fixed(2), Self::greater_equal);
        Self::define_builtin(env, "<=", Arity::Fixed(2), Self::less_equal);
        Self::define_builtin(env, "=", Arity::Fixed(2), Self::numeric_equal);
    }

    pub(crate) fn load_equality_functions(env: &Environment) {
        Self::define_builtin(env, "eq?", Arity::Fixed(2), Self::eq);
        Self::define_builtin(env, "equal?", Arity::Fixed(2), Self::equal);
    }

    pub(crate) fn load_boolean_functions(env: &Environment) {
        Self::define_builtin(env, "not", Arity::Fixed(1), Self::not);
        Self::define_builtin(env, "and", Arity::Variadic(0), Self::and);
        Self::define_builtin(env, "or", Arity::Variadic(0), Self::or);
    }

    pub(crate) fn load_higher_order_functions(env: &Environment) {
        Self::define_builtin(env, "apply", Arity::Variadic(1), Self::apply);
        Self::define_builtin(env, "map", Arity::Variadic(2), Self::map);
        Self::define_builtin(env, "begin", Arity::Variadic(0), Self::begin);
    }

    pub(crate) fn load_constants(env: &Environment) {
        if let Some(pi) = BigRational::from_float(std::f64::consts::PI) {
            env.define(&Symbol::new("pi"), Value::Float(pi));
        }
    }

    // --- List functions ---

    fn non_empty_list<'a>(value: &'a Value, operation: &str) -> RuntimeResult<&'a [Value]> {
        match value {
            Value::List(items) if !items.is_empty() => Ok(items),
            Value::List(_) => Err(RuntimeError::type_error(
                "non-empty list",
                "empty list",
                operation,
            )),
            other => Err(RuntimeError::type_error(
                "non-empty list",
                other.type_name(),
                operation,
            )),
        }
    }

    fn car(args: Vec<Value>) -> RuntimeResult<Value> {
        let items = Self::non_empty_list(&args[0], "car")?;
        Ok(items[0].clone())
    }

    fn cdr(args: Vec<Value>) -> RuntimeResult<Value> {
        let items = Self::non_empty_list(&args[0], "cdr")?;
        Ok(Value::List(items[1..].to_vec()))
    }

    fn cons(args: Vec<Value>) -> RuntimeResult<Value> {
        let tail = args[1].as_list("cons")?;
        let mut items = Vec::with_capacity(tail.len() + 1);
        items.push(args[0].clone());
        items.extend_from_slice(tail);
        Ok(Value::List(items))
    }

    fn list(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::List(args))
    }

    fn length(args: Vec<Value>) -> RuntimeResult<Value> {
        let items = args[0].as_list("length")?;
        Ok(Value::Integer(BigInt::from(items.len())))
    }

    // --- Arithmetic ---

    fn numbers(args: &[Value], operation: &str) -> RuntimeResult<Vec<Number>> {
        args.iter()
            .map(|arg| Number::from_value(arg, operation))
            .collect()
    }

    fn add(args: Vec<Value>) -> RuntimeResult<Value> {
        let sum = Self::numbers(&args, "+")?
            .into_iter()
            .fold(Number::Integer(BigInt::from(0)), Number::add);
        Ok(sum.into())
    }

    fn subtract(args: Vec<Value>) -> RuntimeResult<Value> {
        let mut numbers = Self::numbers(&args, "-")?.into_iter();
        let result = match (numbers.next(), numbers.next()) {
            (Some(n), None) => n.negate(),
            (Some(a), Some(b)) => a.sub(b),
            _ => return Err(RuntimeError::arity_mismatch("-", "1-2", args.len())),
        };
        Ok(result.into())
    }

    fn multiply(args: Vec<Value>) -> RuntimeResult<Value> {
        let product = Self::numbers(&args, "*")?
            .into_iter()
            .fold(Number::Integer(BigInt::from(1)), Number::mul);
        Ok(product.into())
    }

    fn divide(args: Vec<Value>) -> RuntimeResult<Value> {
        let dividend = Number::from_value(&args[0], "/")?;
        let divisor = Number::from_value(&args[1], "/")?;
        Ok(dividend.div(divisor)?.into())
    }

    // --- Comparison ---

    fn compare(args: &[Value], operation: &str) -> RuntimeResult<Ordering> {
        let a = Number::from_value(&args[0], operation)?;
        let b = Number::from_value(&args[1], operation)?;
        Ok(a.compare(&b))
    }

    fn greater_than(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(Self::compare(&args, ">")? == Ordering::Greater))
    }

    fn less_than(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(Self::compare(&args, "<")? == Ordering::Less))
    }

    fn greater_equal(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(Self::compare(&args, ">=")? != Ordering::Less))
    }

    fn less_equal(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(Self::compare(&args, "<=")? != Ordering::Greater))
    }

    fn numeric_equal(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(Self::compare(&args, "=")? == Ordering::Equal))
    }

    // --- Equality ---

    /// Shallow identity: atoms of the same kind compare by value, functions by
    /// identity, and two lists only when both are empty.
    pub fn values_eq(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::Integer(x), Value::Integer(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => x == y,
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Symbol(x), Value::Symbol(y)) => x == y,
            (Value::Function(x), Value::Function(y)) => x == y,
            (Value::List(x), Value::List(y)) => x.is_empty() && y.is_empty(),
            _ => false,
        }
    }

    /// Structural equality; numbers compare by value across kinds.
    pub fn values_equal(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::List(x), Value::List(y)) => {
                x.len() == y.len() && x.iter().zip(y).all(|(a, b)| Self::values_equal(a, b))
            }
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                match (Number::from_value(a, "equal?"), Number::from_value(b, "equal?")) {
                    (Ok(x), Ok(y)) => x.compare(&y) == Ordering::Equal,
                    _ => false,
                }
            }
            _ => Self::values_eq(a, b),
        }
    }

    fn eq(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(Self::values_eq(&args[0], &args[1])))
    }

    fn equal(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(Self::values_equal(&args[0], &args[1])))
    }

    // --- Boolean logic ---

    fn not(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(!args[0].is_truthy()))
    }

    fn and(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(args.iter().all(Value::is_truthy)))
    }

    fn or(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(Value::Boolean(args.iter().any(Value::is_truthy)))
    }

    // --- Higher-order ---

    fn apply(args: Vec<Value>) -> RuntimeResult<Value> {
        let mut args = args.into_iter();
        let callee = args.next().unwrap_or(Value::Nil);
        let function = callee.as_function("apply")?;

        let mut spliced = Vec::new();
        for arg in args {
            match arg {
                Value::List(items) => spliced.extend(items),
                other => spliced.push(other),
            }
        }
        function.call(spliced)
    }

    fn map(args: Vec<Value>) -> RuntimeResult<Value> {
        let function = args[0].as_function("map")?;
        let lists = args[1..]
            .iter()
            .map(|arg| arg.as_list("map"))
            .collect::<RuntimeResult<Vec<_>>>()?;
        let longest = lists.iter().map(|list| list.len()).max().unwrap_or(0);

        let mut results = Vec::with_capacity(longest);
        for index in 0..longest {
            let call_args = lists
                .iter()
                .map(|list| list.get(index).cloned().unwrap_or(Value::Nil))
                .collect();
            results.push(function.call(call_args)?);
        }
        Ok(Value::List(results))
    }

    fn begin(args: Vec<Value>) -> RuntimeResult<Value> {
        Ok(args.into_iter().last().unwrap_or(Value::Nil))
    }
}
