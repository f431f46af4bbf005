use crate::evaluator::{EvalError, EvalResult};
use crate::source::Span;
use crate::types::Value;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Shared handle to a frame. Closures and active calls hold these; a frame
/// lives as long as any of them does.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug)]
pub struct Environment {
    // Frames point outward only, never at inner frames.
    outer: Option<EnvRef>,
    bindings: HashMap<String, Value>,
}

impl Environment {
    /// Creates a new, empty top-level (root) environment.
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            outer: None,
            bindings: HashMap::new(),
        }))
    }

    /// Creates a root environment seeded with every builtin.
    pub fn new_global_populated() -> EnvRef {
        let env_ptr = Environment::new();
        crate::primitives::install(&mut env_ptr.borrow_mut());
        env_ptr
    }

    /// Creates a new environment enclosed within an outer one.
    pub fn new_enclosed(outer_env: EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            outer: Some(outer_env),
            bindings: HashMap::new(),
        }))
    }

    /// Builds a call frame binding each parameter to the argument in the
    /// same position. The counts must match exactly.
    pub fn extend(params: &[String], args: Vec<Value>, outer: EnvRef) -> EvalResult<EnvRef> {
        if params.len() != args.len() {
            return Err(EvalError::ArityMismatch {
                expected: params.len(),
                found: args.len(),
                span: Span::default(),
            });
        }
        let frame = Environment::new_enclosed(outer);
        {
            let mut env = frame.borrow_mut();
            for (param, arg) in params.iter().zip(args) {
                env.define(param.clone(), arg);
            }
        }
        Ok(frame)
    }

    /// Defines a variable in the *current* frame, replacing any previous
    /// binding of the same name in this frame.
    pub fn define(&mut self, name: String, value: Value) {
        tracing::trace!(%name, "define");
        self.bindings.insert(name, value);
    }

    /// Looks up a variable, walking from this frame outward.
    /// `lookup_span` is where the variable was referenced.
    pub fn lookup(&self, name: &str, lookup_span: Span) -> EvalResult {
        if let Some(value) = self.bindings.get(name) {
            Ok(value.clone())
        } else {
            match &self.outer {
                Some(outer_env_ptr) => outer_env_ptr.borrow().lookup(name, lookup_span),
                None => Err(EvalError::UnboundVariable {
                    name: name.to_string(),
                    span: lookup_span,
                }),
            }
        }
    }

    /// Updates an *existing* variable in the nearest frame that binds it.
    /// Errors if no frame in the chain does.
    pub fn assign(&mut self, name: &str, value: Value, set_span: Span) -> EvalResult<()> {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            Ok(())
        } else {
            match &self.outer {
                Some(outer_env_ptr) => outer_env_ptr.borrow_mut().assign(name, value, set_span),
                None => Err(EvalError::UnboundVariable {
                    name: name.to_string(),
                    span: set_span,
                }),
            }
        }
    }

    /// Every name visible from this frame.
    pub fn identifiers(&self) -> HashSet<String> {
        let mut identifiers: HashSet<String> = self.bindings.keys().cloned().collect();
        if let Some(outer_env_ptr) = &self.outer {
            identifiers.extend(outer_env_ptr.borrow().identifiers());
        }
        identifiers
    }
}
