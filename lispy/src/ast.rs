// Abstract syntax tree for Lispy programs
// Produced by the parser, consumed by the evaluator and the lambda compiler

use num_bigint::BigInt;
use num_rational::BigRational;
use std::fmt;

#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Integer(BigInt),
    Float(BigRational),
    String(String),
    Boolean(bool),
    Nil,
}

#[derive(Debug, PartialEq, Clone, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(pub String);

impl Symbol {
    pub fn new(s: &str) -> Self {
        Symbol(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single form. `List` is an ordinary call form; every special form has its
/// own node kind with exactly the children it needs.
#[derive(Debug, PartialEq, Clone)]
pub enum Expression {
    Literal(Literal),
    Symbol(Symbol),
    List(Vec<Expression>),
    Quote(Box<Expression>),
    Unquote(Box<Expression>),
    Sequence(Vec<Expression>),
    If(IfExpr),
    Define(DefineExpr),
    Set(SetExpr),
    Lambda(LambdaExpr),
    Defun(DefunExpr),
}

#[derive(Debug, PartialEq, Clone)]
pub struct IfExpr {
    pub condition: Box<Expression>,
    pub then_branch: Box<Expression>,
    pub else_branch: Box<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DefineExpr {
    pub symbol: Symbol,
    pub value: Box<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SetExpr {
    pub symbol: Symbol,
    pub value: Box<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct LambdaExpr {
    pub params: Vec<Symbol>,
    pub body: Box<Expression>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DefunExpr {
    pub name: Symbol,
    pub params: Vec<Symbol>,
    pub body: Box<Expression>,
}

impl Expression {
    pub fn symbol(name: &str) -> Self {
        Expression::Symbol(Symbol::new(name))
    }

    pub fn integer(value: i64) -> Self {
        Expression::Literal(Literal::Integer(BigInt::from(value)))
    }

    /// Name of the special form this node represents, if any.
    pub fn form_name(&self) -> Option<&'static str> {
        match self {
            Expression::Quote(_) => Some("quote"),
            Expression::Unquote(_) => Some("unquote"),
            Expression::If(_) => Some("if"),
            Expression::Define(_) => Some("define"),
            Expression::Set(_) => Some("set!"),
            Expression::Lambda(_) => Some("lambda"),
            Expression::Defun(_) => Some("defun"),
            Expression::Sequence(_) => Some("sequence"),
            Expression::Literal(_) | Expression::Symbol(_) | Expression::List(_) => None,
        }
    }
}
