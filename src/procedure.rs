use std::fmt;
use std::rc::Rc;

use crate::environment::{EnvRef, Environment};
use crate::evaluator::{EvalResult, evaluate};
use crate::types::{Node, Value};

/// Anything that can sit in operator position of an application.
pub trait Callable {
    fn invoke(&self, args: Vec<Value>) -> EvalResult;
}

pub type PrimitiveFunc = fn(&[Value]) -> EvalResult;

/// A built-in operation: the function pointer and its name (for display and `eq?`).
#[derive(Clone, Copy)]
pub struct Primitive {
    name: &'static str,
    func: PrimitiveFunc,
}

impl Primitive {
    pub fn new(name: &'static str, func: PrimitiveFunc) -> Self {
        Primitive { name, func }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Callable for Primitive {
    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        (self.func)(&args)
    }
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive({})", self.name)
    }
}

/// A user procedure produced by `lambda`.
pub struct Closure {
    pub params: Vec<String>,
    pub body: Rc<Node>,
    pub env: EnvRef,
}

impl Closure {
    pub fn new(params: Vec<String>, body: Rc<Node>, env: EnvRef) -> Self {
        Closure { params, body, env }
    }
}

impl Callable for Closure {
    fn invoke(&self, args: Vec<Value>) -> EvalResult {
        tracing::trace!(params = ?self.params, "invoking closure");
        let frame = Environment::extend(&self.params, args, self.env.clone())?;
        evaluate(&self.body, &frame)
    }
}

// The captured environment is left out: it usually contains the closure itself.
impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closure")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}
