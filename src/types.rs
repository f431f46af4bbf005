use std::cmp::Ordering;
use std::rc::Rc;

use crate::procedure::{Callable, Closure, Primitive};
use crate::source::Span;

/// The two numeric kinds of the language.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Integer(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_zero(self) -> bool {
        match self {
            Number::Integer(i) => i == 0,
            Number::Float(f) => f == 0.0,
        }
    }

    /// Exact ordering across kinds. Integers are never rounded through `f64`,
    /// so `9007199254740993` sorts above `9007199254740992.0`. `None` when a
    /// NaN is involved.
    pub fn numeric_cmp(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Integer(a), Number::Integer(b)) => Some(a.cmp(&b)),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
            (Number::Integer(a), Number::Float(b)) => cmp_integer_float(a, b),
            (Number::Float(a), Number::Integer(b)) => {
                cmp_integer_float(b, a).map(Ordering::reverse)
            }
        }
    }

    /// Equality across kinds, so that `1` and `1.0` compare equal.
    pub fn numeric_eq(self, other: Number) -> bool {
        self.numeric_cmp(other) == Some(Ordering::Equal)
    }
}

// 2^63, the first float above every i64.
const I64_UPPER_BOUND: f64 = 9_223_372_036_854_775_808.0;

fn cmp_integer_float(i: i64, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f >= I64_UPPER_BOUND {
        return Some(Ordering::Less);
    }
    if f < -I64_UPPER_BOUND {
        return Some(Ordering::Greater);
    }
    // In range, the integral part of `f` converts to i64 exactly.
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)),
        unequal => Some(unequal),
    }
}

/// An AST node: the expression plus the source text it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: Expr,
    pub span: Span,
}

/// Expressions as produced by the reader. Never mutated by evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Number(Number),
    Symbol(String),
    Form(Vec<Node>),
}

impl Node {
    pub fn new(kind: Expr, span: Span) -> Self {
        Node { kind, span }
    }

    pub fn new_integer(n: i64, span: Span) -> Self {
        Node::new(Expr::Number(Number::Integer(n)), span)
    }

    pub fn new_float(n: f64, span: Span) -> Self {
        Node::new(Expr::Number(Number::Float(n)), span)
    }

    pub fn new_symbol(name: impl Into<String>, span: Span) -> Self {
        Node::new(Expr::Symbol(name.into()), span)
    }

    pub fn new_form(elements: Vec<Node>, span: Span) -> Self {
        Node::new(Expr::Form(elements), span)
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match &self.kind {
            Expr::Symbol(name) => Some(name),
            _ => None,
        }
    }

    /// Converts the expression into data, the way `quote` sees it.
    pub fn to_value(&self) -> Value {
        match &self.kind {
            Expr::Number(n) => Value::Number(*n),
            Expr::Symbol(name) => Value::Symbol(name.clone()),
            Expr::Form(elements) => Value::list(elements.iter().map(Node::to_value).collect()),
        }
    }
}

/// Runtime values.
#[derive(Debug, Clone)]
pub enum Value {
    Number(Number),
    Boolean(bool),
    Symbol(String),
    Sequence(Rc<[Value]>),
    Closure(Rc<Closure>),
    Primitive(Primitive),
    Unit,
}

impl Value {
    pub fn integer(n: i64) -> Value {
        Value::Number(Number::Integer(n))
    }

    pub fn float(n: f64) -> Value {
        Value::Number(Number::Float(n))
    }

    pub fn symbol(name: impl Into<String>) -> Value {
        Value::Symbol(name.into())
    }

    pub fn list(items: Vec<Value>) -> Value {
        Value::Sequence(Rc::from(items))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(Number::Integer(_)) => "integer",
            Value::Number(Number::Float(_)) => "float",
            Value::Boolean(_) => "boolean",
            Value::Symbol(_) => "symbol",
            Value::Sequence(_) => "list",
            Value::Closure(_) => "procedure",
            Value::Primitive(_) => "primitive",
            Value::Unit => "unit",
        }
    }

    /// Only `#f` is false; every other value counts as true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Boolean(false))
    }

    pub fn is_unit(&self) -> bool {
        matches!(self, Value::Unit)
    }

    /// The uniform calling interface shared by closures and primitives.
    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::Closure(closure) => Some(closure.as_ref()),
            Value::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    /// `eq?`: identity for lists and closures, value for atoms.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => {
                (a.is_empty() && b.is_empty()) || Rc::ptr_eq(a, b)
            }
            (Value::Closure(a), Value::Closure(b)) => Rc::ptr_eq(a, b),
            (Value::Primitive(a), Value::Primitive(b)) => a.name() == b.name(),
            (Value::Unit, Value::Unit) => true,
            _ => false,
        }
    }

    /// `equal?`: deep structural equality, comparing numbers across kinds.
    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.numeric_eq(*b),
            (Value::Sequence(a), Value::Sequence(b)) => {
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.is_equal(y))
            }
            _ => self.is_identical(other),
        }
    }
}

// Strict structural equality: `1` and `1.0` differ. `equal?` is `is_equal`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Sequence(a), Value::Sequence(b)) => a == b,
            _ => self.is_identical(other),
        }
    }
}
