use crate::environment::EnvRef;
use crate::procedure::Closure;
use crate::source::Span;
use crate::types::{Expr, Node, Value};
use std::collections::HashSet;
use std::rc::Rc;
use thiserror::Error;

// --- Evaluation Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Unbound variable: '{name}'")]
    UnboundVariable { name: String, span: Span },
    #[error("Arity mismatch: procedure expects {expected} arguments, got {found}")]
    ArityMismatch {
        expected: usize,
        found: usize,
        span: Span,
    },
    #[error("Argument error in '{procedure}': {message}")]
    ArgumentError {
        procedure: String,
        message: String,
        span: Span,
    },
    #[error("Not callable: {value}")]
    NotCallable { value: String, span: Span },
    #[error("Type mismatch in '{procedure}': expected {expected}, got {found}")]
    TypeMismatch {
        procedure: String,
        expected: &'static str,
        found: &'static str,
        span: Span,
    },
    #[error("Malformed special form: {message}")]
    MalformedForm { message: String, span: Span },
}

impl EvalError {
    pub fn argument(procedure: &str, message: impl Into<String>) -> Self {
        EvalError::ArgumentError {
            procedure: procedure.to_string(),
            message: message.into(),
            span: Span::default(),
        }
    }

    pub fn type_mismatch(procedure: &str, expected: &'static str, found: &Value) -> Self {
        EvalError::TypeMismatch {
            procedure: procedure.to_string(),
            expected,
            found: found.type_name(),
            span: Span::default(),
        }
    }

    fn malformed(message: impl Into<String>, span: Span) -> Self {
        EvalError::MalformedForm {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            EvalError::UnboundVariable { span, .. }
            | EvalError::ArityMismatch { span, .. }
            | EvalError::ArgumentError { span, .. }
            | EvalError::NotCallable { span, .. }
            | EvalError::TypeMismatch { span, .. }
            | EvalError::MalformedForm { span, .. } => *span,
        }
    }

    /// Primitives and parameter binding don't know where they were called
    /// from; the evaluator fills the call site in on the way out.
    fn or_at(mut self, call_span: Span) -> Self {
        let span = match &mut self {
            EvalError::UnboundVariable { span, .. }
            | EvalError::ArityMismatch { span, .. }
            | EvalError::ArgumentError { span, .. }
            | EvalError::NotCallable { span, .. }
            | EvalError::TypeMismatch { span, .. }
            | EvalError::MalformedForm { span, .. } => span,
        };
        if span.is_unknown() {
            *span = call_span;
        }
        self
    }
}

// Result type alias for convenience
pub type EvalResult<T = Value> = Result<T, EvalError>;

pub const SPECIAL_FORMS: [&str; 6] = ["quote", "if", "define", "set!", "lambda", "begin"];

/// Names handled by the evaluator itself rather than looked up.
pub fn special_form_identifiers() -> HashSet<String> {
    SPECIAL_FORMS.iter().map(|s| s.to_string()).collect()
}

// --- Evaluate Function ---

/// Evaluates a given AST Node within the specified environment.
///
/// No tail calls are eliminated: every nested form and every procedure call
/// uses host stack.
pub fn evaluate(node: &Node, env: &EnvRef) -> EvalResult {
    match &node.kind {
        // 1. Symbols: look up in the environment
        Expr::Symbol(name) => env.borrow().lookup(name, node.span),

        // 2. Numbers evaluate to themselves
        Expr::Number(n) => Ok(Value::Number(*n)),

        // 3. Forms: special forms first, then procedure application
        Expr::Form(elements) => match elements.split_first() {
            None => Err(EvalError::malformed(
                "cannot evaluate the empty form (); use (quote ()) for an empty list",
                node.span,
            )),
            Some((first, rest)) => match first.as_symbol() {
                Some("quote") => evaluate_quote(rest, node.span),
                Some("if") => evaluate_if(rest, env, node.span),
                Some("define") => evaluate_define(rest, env, node.span),
                Some("set!") => evaluate_set(rest, env, node.span),
                Some("lambda") => evaluate_lambda(rest, env, node.span),
                Some("begin") => evaluate_begin(rest, env),
                _ => evaluate_procedure(first, rest, env, node.span),
            },
        },
    }
}

fn evaluate_procedure(
    operator: &Node,
    operands: &[Node],
    env: &EnvRef,
    span: Span,
) -> EvalResult {
    // 1. Evaluate the operator and check it can be called
    let procedure = evaluate(operator, env)?;
    let Some(callable) = procedure.as_callable() else {
        return Err(EvalError::NotCallable {
            value: procedure.to_string(),
            span: operator.span,
        });
    };

    // 2. Evaluate the operands, left to right
    let args = operands
        .iter()
        .map(|operand| evaluate(operand, env))
        .collect::<EvalResult<Vec<Value>>>()?;

    // 3. Apply
    callable.invoke(args).map_err(|err| err.or_at(span))
}

fn evaluate_quote(operands: &[Node], span: Span) -> EvalResult {
    if let [node] = operands {
        Ok(node.to_value())
    } else {
        Err(EvalError::malformed(
            "quote expects exactly one argument",
            span,
        ))
    }
}

fn evaluate_if(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    let (condition, consequent, alternate) = match operands {
        [condition, consequent] => (condition, consequent, None),
        [condition, consequent, alternate] => (condition, consequent, Some(alternate)),
        _ => {
            return Err(EvalError::malformed(
                "if expects condition, consequent, and optional alternate",
                span,
            ));
        }
    };

    // Only the chosen branch is evaluated.
    if evaluate(condition, env)?.is_truthy() {
        evaluate(consequent, env)
    } else {
        match alternate {
            Some(alternate) => evaluate(alternate, env),
            None => Ok(Value::Unit),
        }
    }
}

fn evaluate_define(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    match operands {
        // (define name expr)
        [target, expr] if target.as_symbol().is_some() => {
            let name = expect_name(target, "define")?;
            let value = evaluate(expr, env)?;
            env.borrow_mut().define(name, value);
            Ok(Value::Unit)
        }
        // (define (name params...) body)
        [
            Node {
                kind: Expr::Form(signature),
                ..
            },
            body,
        ] => match signature.split_first() {
            Some((name, params)) => {
                let name = expect_name(name, "define")?;
                let closure = make_closure(params, body, env)?;
                env.borrow_mut().define(name, closure);
                Ok(Value::Unit)
            }
            None => Err(EvalError::malformed(
                "define expects a procedure name before its parameters",
                span,
            )),
        },
        _ => Err(EvalError::malformed(
            "define expects a name and exactly one value expression",
            span,
        )),
    }
}

fn evaluate_set(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    if let [target, expr] = operands {
        let name = expect_name(target, "set!")?;
        let value = evaluate(expr, env)?;
        env.borrow_mut().assign(&name, value, target.span)?;
        Ok(Value::Unit)
    } else {
        Err(EvalError::malformed(
            "set! expects a name and exactly one value expression",
            span,
        ))
    }
}

fn evaluate_lambda(operands: &[Node], env: &EnvRef, span: Span) -> EvalResult {
    match operands {
        [
            Node {
                kind: Expr::Form(params),
                ..
            },
            body,
        ] => make_closure(params, body, env),
        [params, _] => Err(EvalError::malformed(
            "lambda expects a parenthesized parameter list",
            params.span,
        )),
        _ => Err(EvalError::malformed(
            "lambda expects a parameter list and exactly one body expression",
            span,
        )),
    }
}

fn evaluate_begin(operands: &[Node], env: &EnvRef) -> EvalResult {
    let mut result = Value::Unit;
    for operand in operands {
        result = evaluate(operand, env)?;
    }
    Ok(result)
}

fn make_closure(params: &[Node], body: &Node, env: &EnvRef) -> EvalResult {
    let mut names: Vec<String> = Vec::with_capacity(params.len());
    for param in params {
        let name = expect_name(param, "lambda")?;
        if names.contains(&name) {
            return Err(EvalError::malformed(
                format!("duplicate parameter '{}'", name),
                param.span,
            ));
        }
        names.push(name);
    }
    Ok(Value::Closure(Rc::new(Closure::new(
        names,
        Rc::new(body.clone()),
        env.clone(),
    ))))
}

fn expect_name(node: &Node, form: &str) -> EvalResult<String> {
    match node.as_symbol() {
        Some(name) => Ok(name.to_string()),
        None => Err(EvalError::malformed(
            format!("{} expects a symbol, got {}", form, node_text(node)),
            node.span,
        )),
    }
}

fn node_text(node: &Node) -> String {
    node.to_value().to_string()
}
