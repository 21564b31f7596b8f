// Direct evaluator for top-level forms
// Walks the AST against an environment chain; function bodies go through the lambda compiler

use crate::ast::{DefineExpr, Expression, IfExpr, SetExpr};
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::lambda_compiler::{compile_defun, compile_lambda};
use crate::runtime::stdlib::StandardLibrary;
use crate::runtime::values::{Function, Value};
use std::rc::Rc;
use tracing::trace;

/// Evaluator owning one root environment. Each instance is independent:
/// definitions made through one evaluator are invisible to another.
#[derive(Debug, Clone)]
pub struct Evaluator {
    env: Rc<Environment>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// Creates an evaluator whose root environment holds the builtins.
    pub fn new() -> Self {
        Evaluator {
            env: Rc::new(StandardLibrary::create_global_environment()),
        }
    }

    pub fn with_environment(env: Rc<Environment>) -> Self {
        Evaluator { env }
    }

    pub fn env(&self) -> &Rc<Environment> {
        &self.env
    }

    /// Evaluates a form in the root environment.
    pub fn evaluate(&self, expr: &Expression) -> RuntimeResult<Value> {
        trace!(form = ?expr.form_name(), "evaluating top-level form");
        self.eval_expr(expr, &self.env)
    }

    pub fn eval_expr(&self, expr: &Expression, env: &Rc<Environment>) -> RuntimeResult<Value> {
        match expr {
            Expression::Literal(literal) => Ok(Value::from(literal)),
            Expression::Symbol(symbol) => env.lookup(symbol),
            Expression::Sequence(forms) => self.eval_sequence(forms, env),
            Expression::If(if_expr) => self.eval_if(if_expr, env),
            Expression::Define(define_expr) => self.eval_define(define_expr, env),
            Expression::Set(set_expr) => self.eval_set(set_expr, env),
            Expression::Lambda(lambda) => {
                let closure = compile_lambda(lambda, env)?;
                Ok(Value::Function(Function::Closure(closure)))
            }
            Expression::Defun(defun) => {
                let closure = compile_defun(defun, env)?;
                Ok(Value::Function(Function::Closure(closure)))
            }
            Expression::Quote(inner) => self.eval_quoted(inner, env),
            Expression::Unquote(_) => Err(RuntimeError::MalformedQuote(
                "unquote outside of quote".to_string(),
            )),
            Expression::List(items) => self.eval_call(items, env),
        }
    }

    fn eval_sequence(&self, forms: &[Expression], env: &Rc<Environment>) -> RuntimeResult<Value> {
        let mut last = Value::Nil;
        for form in forms {
            last = self.eval_expr(form, env)?;
        }
        Ok(last)
    }

    fn eval_if(&self, if_expr: &IfExpr, env: &Rc<Environment>) -> RuntimeResult<Value> {
        let condition = self.eval_expr(&if_expr.condition, env)?;

        if condition.is_truthy() {
            self.eval_expr(&if_expr.then_branch, env)
        } else {
            self.eval_expr(&if_expr.else_branch, env)
        }
    }

    fn eval_define(&self, define_expr: &DefineExpr, env: &Rc<Environment>) -> RuntimeResult<Value> {
        let value = self.eval_expr(&define_expr.value, env)?;
        Ok(env.define(&define_expr.symbol, value))
    }

    fn eval_set(&self, set_expr: &SetExpr, env: &Rc<Environment>) -> RuntimeResult<Value> {
        let value = self.eval_expr(&set_expr.value, env)?;
        env.set(&set_expr.symbol, value)
    }

    fn eval_call(&self, items: &[Expression], env: &Rc<Environment>) -> RuntimeResult<Value> {
        let Some((head, rest)) = items.split_first() else {
            return Ok(Value::List(vec![]));
        };

        let callee = self.eval_expr(head, env)?;
        let function = callee.as_function("call")?;
        let args = rest
            .iter()
            .map(|arg| self.eval_expr(arg, env))
            .collect::<RuntimeResult<Vec<_>>>()?;

        function.call(args)
    }

    /// Rebuilds quoted syntax as data, evaluating `,form` sub-forms in place.
    fn eval_quoted(&self, expr: &Expression, env: &Rc<Environment>) -> RuntimeResult<Value> {
        match expr {
            Expression::Literal(literal) => Ok(Value::from(literal)),
            Expression::Symbol(symbol) => Ok(Value::Symbol(symbol.clone())),
            Expression::List(items) => items
                .iter()
                .map(|item| self.eval_quoted(item, env))
                .collect::<RuntimeResult<Vec<_>>>()
                .map(Value::List),
            Expression::Unquote(inner) => self.eval_expr(inner, env),
            Expression::Quote(inner) => Ok(Value::List(vec![
                Value::symbol("quote"),
                self.eval_quoted(inner, env)?,
            ])),
            other => Err(RuntimeError::MalformedQuote(format!(
                "{} cannot appear inside quoted data",
                other.form_name().unwrap_or("form")
            ))),
        }
    }
}
