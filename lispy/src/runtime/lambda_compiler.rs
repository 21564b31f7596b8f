//! Lambda pre-compiler.
//!
//! A `lambda`/`defun` body is turned into a tree of [`CompiledNode`]s once,
//! when the function is created. Every later call only walks that tree with a
//! [`CallContext`] holding the arguments:
//!
//! - parameters compile to a positional read from the call context;
//! - other names bound at compile time are resolved once and frozen into a
//!   constant, so a later `set!` of the outer name is not seen by the body;
//! - names still unbound at compile time are looked up in the defining
//!   environment every time the call runs, which lets a body refer to a
//!   global defined after it;
//! - an `if` whose test is constant is replaced by the selected branch.
//!
//! `defun` makes the function visible to its own body before the closure
//! exists by binding a [`Placeholder`] in a temporary child frame and filling
//! it once compilation is done.

use crate::ast::{DefunExpr, Expression, IfExpr, LambdaExpr, Symbol};
use crate::runtime::environment::Environment;
use crate::runtime::error::{RuntimeError, RuntimeResult};
use crate::runtime::values::{Function, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::debug;

/// Arguments of one function invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    args: Vec<Value>,
}

impl CallContext {
    pub fn new(args: Vec<Value>) -> Self {
        CallContext { args }
    }

    pub fn arg(&self, index: usize) -> RuntimeResult<Value> {
        self.args.get(index).cloned().ok_or_else(|| {
            RuntimeError::InternalError(format!(
                "parameter {} out of range for {} arguments",
                index,
                self.args.len()
            ))
        })
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

pub type DynamicFn = Box<dyn Fn(&CallContext) -> RuntimeResult<Value>>;

pub enum CompiledNode {
    /// Value known when the function was compiled
    Constant(Value),
    /// Computed from the call context on each invocation
    Dynamic(DynamicFn),
}

impl CompiledNode {
    fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&CallContext) -> RuntimeResult<Value> + 'static,
    {
        CompiledNode::Dynamic(Box::new(f))
    }

    pub fn eval(&self, ctx: &CallContext) -> RuntimeResult<Value> {
        match self {
            CompiledNode::Constant(value) => Ok(value.clone()),
            CompiledNode::Dynamic(f) => f(ctx),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, CompiledNode::Constant(_))
    }
}

impl fmt::Debug for CompiledNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledNode::Constant(value) => f.debug_tuple("Constant").field(value).finish(),
            CompiledNode::Dynamic(_) => write!(f, "Dynamic(..)"),
        }
    }
}

/// A compiled function: its body tree plus the number of parameters.
#[derive(Debug)]
pub struct Closure {
    name: Option<String>,
    arity: usize,
    body: CompiledNode,
}

impl Closure {
    pub fn new(name: Option<String>, arity: usize, body: CompiledNode) -> Self {
        Closure { name, arity, body }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    pub fn body(&self) -> &CompiledNode {
        &self.body
    }

    pub fn invoke(&self, args: Vec<Value>) -> RuntimeResult<Value> {
        if args.len() != self.arity {
            return Err(RuntimeError::arity_mismatch(
                self.name().unwrap_or("lambda"),
                self.arity.to_string(),
                args.len(),
            ));
        }
        match &self.body {
            CompiledNode::Constant(value) => Ok(value.clone()),
            CompiledNode::Dynamic(f) => f(&CallContext::new(args)),
        }
    }
}

/// Forward reference to a closure that is still being compiled.
///
/// The cell holds the closure weakly: the closure's own body references the
/// placeholder, and a strong reference there would keep it alive forever.
#[derive(Debug, Clone)]
pub struct Placeholder {
    name: String,
    cell: Rc<RefCell<Weak<Closure>>>,
}

impl Placeholder {
    pub fn new(name: &str) -> Self {
        Placeholder {
            name: name.to_string(),
            cell: Rc::new(RefCell::new(Weak::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fill(&self, closure: &Rc<Closure>) {
        *self.cell.borrow_mut() = Rc::downgrade(closure);
    }

    pub fn is_filled(&self) -> bool {
        self.cell.borrow().strong_count() > 0
    }

    pub fn resolve(&self) -> RuntimeResult<Rc<Closure>> {
        self.cell.borrow().upgrade().ok_or_else(|| {
            RuntimeError::InternalError(format!(
                "function {} called before its definition was completed",
                self.name
            ))
        })
    }
}

impl PartialEq for Placeholder {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

/// Compiles the body of one function against the environment it is created in.
pub struct LambdaCompiler {
    params: HashMap<String, usize>,
    env: Rc<Environment>,
}

impl LambdaCompiler {
    pub fn new(params: &[Symbol], env: Rc<Environment>) -> Self {
        let params = params
            .iter()
            .enumerate()
            .map(|(index, param)| (param.0.clone(), index))
            .collect();
        LambdaCompiler { params, env }
    }

    pub fn compile(&self, expr: &Expression) -> RuntimeResult<CompiledNode> {
        match expr {
            Expression::Literal(literal) => Ok(CompiledNode::Constant(Value::from(literal))),
            Expression::Symbol(symbol) => Ok(self.compile_symbol(symbol)),
            Expression::List(items) => self.compile_call(items),
            Expression::Quote(inner) => self.compile_quoted(inner),
            Expression::Unquote(_) => Err(RuntimeError::MalformedQuote(
                "unquote outside of quote".to_string(),
            )),
            Expression::Sequence(forms) => self.compile_sequence(forms),
            Expression::If(if_expr) => self.compile_if(if_expr),
            Expression::Define(_) => Err(RuntimeError::UnsupportedForm("define".to_string())),
            Expression::Set(_) => Err(RuntimeError::UnsupportedForm("set!".to_string())),
            Expression::Lambda(_) => Err(RuntimeError::UnsupportedForm("lambda".to_string())),
            Expression::Defun(_) => Err(RuntimeError::UnsupportedForm("defun".to_string())),
        }
    }

    /// A symbol read as a value. The recursion placeholder never escapes a
    /// body: it is swapped for the finished closure when the node runs.
    fn compile_symbol(&self, symbol: &Symbol) -> CompiledNode {
        match self.compile_reference(symbol) {
            CompiledNode::Constant(Value::Function(Function::Placeholder(placeholder))) => {
                CompiledNode::dynamic(move |_| {
                    Ok(Value::Function(Function::Closure(placeholder.resolve()?)))
                })
            }
            node => node,
        }
    }

    fn compile_reference(&self, symbol: &Symbol) -> CompiledNode {
        if let Some(&index) = self.params.get(&symbol.0) {
            return CompiledNode::dynamic(move |ctx| ctx.arg(index));
        }
        if let Some(value) = self.env.try_lookup(symbol) {
            return CompiledNode::Constant(value);
        }
        let env = Rc::clone(&self.env);
        let symbol = symbol.clone();
        CompiledNode::dynamic(move |_| env.lookup(&symbol))
    }

    fn compile_call(&self, items: &[Expression]) -> RuntimeResult<CompiledNode> {
        let Some((head, rest)) = items.split_first() else {
            return Ok(CompiledNode::Constant(Value::List(vec![])));
        };
        // Calls go through the placeholder directly
        let head = match head {
            Expression::Symbol(symbol) => self.compile_reference(symbol),
            other => self.compile(other)?,
        };
        let args = rest
            .iter()
            .map(|arg| self.compile(arg))
            .collect::<RuntimeResult<Vec<_>>>()?;

        Ok(match head {
            CompiledNode::Constant(Value::Function(function)) => CompiledNode::dynamic(move |ctx| {
                function.call(eval_args(&args, ctx)?)
            }),
            CompiledNode::Constant(other) => {
                let actual = other.type_name();
                CompiledNode::dynamic(move |_| {
                    Err(RuntimeError::type_error("function", actual, "call"))
                })
            }
            CompiledNode::Dynamic(head) => CompiledNode::dynamic(move |ctx| {
                let callee = head(ctx)?;
                let function = callee.as_function("call")?;
                function.call(eval_args(&args, ctx)?)
            }),
        })
    }

    fn compile_sequence(&self, forms: &[Expression]) -> RuntimeResult<CompiledNode> {
        let mut nodes = forms
            .iter()
            .map(|form| self.compile(form))
            .collect::<RuntimeResult<Vec<_>>>()?;

        if nodes.iter().all(CompiledNode::is_constant) {
            return Ok(nodes
                .pop()
                .unwrap_or(CompiledNode::Constant(Value::Nil)));
        }
        Ok(CompiledNode::dynamic(move |ctx| {
            let mut last = Value::Nil;
            for node in &nodes {
                last = node.eval(ctx)?;
            }
            Ok(last)
        }))
    }

    fn compile_if(&self, if_expr: &IfExpr) -> RuntimeResult<CompiledNode> {
        let test = self.compile(&if_expr.condition)?;
        let then_branch = self.compile(&if_expr.then_branch)?;
        let else_branch = self.compile(&if_expr.else_branch)?;

        let test = match test {
            CompiledNode::Constant(value) => {
                return Ok(if value.is_truthy() {
                    then_branch
                } else {
                    else_branch
                });
            }
            CompiledNode::Dynamic(test) => test,
        };

        use CompiledNode::{Constant, Dynamic};
        Ok(match (then_branch, else_branch) {
            (Constant(a), Constant(b)) => CompiledNode::dynamic(move |ctx| {
                Ok(if test(ctx)?.is_truthy() {
                    a.clone()
                } else {
                    b.clone()
                })
            }),
            (Constant(a), Dynamic(b)) => CompiledNode::dynamic(move |ctx| {
                if test(ctx)?.is_truthy() {
                    Ok(a.clone())
                } else {
                    b(ctx)
                }
            }),
            (Dynamic(a), Constant(b)) => CompiledNode::dynamic(move |ctx| {
                if test(ctx)?.is_truthy() {
                    a(ctx)
                } else {
                    Ok(b.clone())
                }
            }),
            (Dynamic(a), Dynamic(b)) => CompiledNode::dynamic(move |ctx| {
                if test(ctx)?.is_truthy() {
                    a(ctx)
                } else {
                    b(ctx)
                }
            }),
        })
    }

    /// Quoted data without unquotes is built once; unquoted sub-forms are
    /// compiled like any other body expression.
    fn compile_quoted(&self, expr: &Expression) -> RuntimeResult<CompiledNode> {
        match expr {
            Expression::Literal(literal) => Ok(CompiledNode::Constant(Value::from(literal))),
            Expression::Symbol(symbol) => Ok(CompiledNode::Constant(Value::Symbol(symbol.clone()))),
            Expression::Unquote(inner) => self.compile(inner),
            Expression::Quote(inner) => {
                let inner = self.compile_quoted(inner)?;
                Ok(match inner {
                    CompiledNode::Constant(value) => {
                        CompiledNode::Constant(Value::List(vec![Value::symbol("quote"), value]))
                    }
                    CompiledNode::Dynamic(f) => CompiledNode::dynamic(move |ctx| {
                        Ok(Value::List(vec![Value::symbol("quote"), f(ctx)?]))
                    }),
                })
            }
            Expression::List(items) => {
                let nodes = items
                    .iter()
                    .map(|item| self.compile_quoted(item))
                    .collect::<RuntimeResult<Vec<_>>>()?;
                if nodes.iter().all(CompiledNode::is_constant) {
                    let values = nodes
                        .into_iter()
                        .filter_map(|node| match node {
                            CompiledNode::Constant(value) => Some(value),
                            CompiledNode::Dynamic(_) => None,
                        })
                        .collect();
                    return Ok(CompiledNode::Constant(Value::List(values)));
                }
                Ok(CompiledNode::dynamic(move |ctx| {
                    eval_args(&nodes, ctx).map(Value::List)
                }))
            }
            other => Err(RuntimeError::MalformedQuote(format!(
                "{} cannot appear inside quoted data",
                other.form_name().unwrap_or("form")
            ))),
        }
    }
}

fn eval_args(nodes: &[CompiledNode], ctx: &CallContext) -> RuntimeResult<Vec<Value>> {
    nodes.iter().map(|node| node.eval(ctx)).collect()
}

/// Compiles an anonymous function.
pub fn compile_lambda(lambda: &LambdaExpr, env: &Rc<Environment>) -> RuntimeResult<Rc<Closure>> {
    let compiler = LambdaCompiler::new(&lambda.params, Rc::clone(env));
    let body = compiler.compile(&lambda.body)?;
    debug!(
        arity = lambda.params.len(),
        constant = body.is_constant(),
        "compiled lambda"
    );
    Ok(Rc::new(Closure::new(None, lambda.params.len(), body)))
}

/// Compiles a named function that may call itself, then binds it in `env`.
pub fn compile_defun(defun: &DefunExpr, env: &Rc<Environment>) -> RuntimeResult<Rc<Closure>> {
    let scratch = env.child();
    let placeholder = Placeholder::new(defun.name.as_str());
    scratch.define(
        &defun.name,
        Value::Function(Function::Placeholder(placeholder.clone())),
    );

    let compiler = LambdaCompiler::new(&defun.params, scratch);
    let body = compiler.compile(&defun.body)?;
    let closure = Rc::new(Closure::new(
        Some(defun.name.0.clone()),
        defun.params.len(),
        body,
    ));

    placeholder.fill(&closure);
    env.define(&defun.name, Value::Function(Function::Closure(Rc::clone(&closure))));
    debug!(name = %defun.name, arity = defun.params.len(), "compiled defun");
    Ok(closure)
}
