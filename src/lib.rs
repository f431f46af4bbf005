// Declare modules publicly so they are part of the library interface
pub mod environment;
pub mod evaluator;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod pretty_print;
pub mod primitives;
pub mod printer;
pub mod procedure;
pub mod source;
pub mod types;

pub use environment::{EnvRef, Environment};
pub use evaluator::{EvalError, EvalResult, evaluate};
pub use interpreter::{Error, Interpreter};
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{Parser, SyntaxError, parse_str};
pub use printer::render;
pub use procedure::{Callable, Closure, Primitive};
pub use source::Span;
pub use types::{Expr, Node, Number, Value};
