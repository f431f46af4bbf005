use std::path::Path;

use thiserror::Error;

use crate::environment::{EnvRef, Environment};
use crate::evaluator::{EvalError, EvalResult, evaluate};
use crate::parser::{SyntaxError, parse_str};
use crate::types::{Node, Value};

/// Anything that can go wrong while running one top-level form.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error("could not read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// One interpreter session. Each session owns its own root environment, so
/// sessions never observe each other's definitions.
pub struct Interpreter {
    global_env: EnvRef,
}

impl Interpreter {
    pub fn new() -> Self {
        tracing::debug!("creating interpreter session");
        Interpreter {
            global_env: Environment::new_global_populated(),
        }
    }

    /// The root environment shared by every form evaluated in this session.
    pub fn global_env(&self) -> &EnvRef {
        &self.global_env
    }

    /// Parses the first top-level form of `input` and evaluates it.
    pub fn eval_str(&self, input: &str) -> Result<Value, Error> {
        let node = parse_str(input)?;
        Ok(self.eval_node(&node)?)
    }

    pub fn eval_node(&self, node: &Node) -> EvalResult {
        tracing::debug!(span = %node.span, "evaluating top-level form");
        evaluate(node, &self.global_env)
    }

    /// Reads a whole file and evaluates the single top-level form it holds.
    pub fn eval_file(&self, path: &Path) -> Result<Value, Error> {
        tracing::debug!(path = %path.display(), "loading file");
        let source = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        self.eval_str(&source)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}
