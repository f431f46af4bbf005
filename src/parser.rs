use crate::Span;
use crate::lexer::{Token, TokenKind, tokenize};
use crate::types::Node;
use std::iter::Peekable;
use std::vec::IntoIter;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyntaxError {
    #[error("Syntax Error: unexpected end of input while reading")]
    UnexpectedEof { span: Span },
    #[error("Syntax Error [at {span}]: unexpected ')'")]
    UnexpectedCloseParen { span: Span },
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        match self {
            SyntaxError::UnexpectedEof { span }
            | SyntaxError::UnexpectedCloseParen { span } => *span,
        }
    }
}

// Result type alias for convenience
pub type ParseResult<T> = Result<T, SyntaxError>;

pub struct Parser {
    // We iterate over owned Tokens, consuming them from the front.
    tokens: Peekable<IntoIter<Token>>,
    // Where an unexpected EOF is reported: just past the last token.
    eof: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        let eof = tokens.last().map_or(0, |token| token.span.end);
        Parser {
            tokens: tokens.into_iter().peekable(),
            eof,
        }
    }

    fn eof_error(&self) -> SyntaxError {
        SyntaxError::UnexpectedEof {
            span: Span::new(self.eof, self.eof),
        }
    }

    /// Reads a single expression from the front of the token stream.
    pub fn read(&mut self) -> ParseResult<Node> {
        match self.tokens.next() {
            Some(token) => self.read_with_token(token),
            None => Err(self.eof_error()),
        }
    }

    /// True once every token has been consumed.
    pub fn is_exhausted(&mut self) -> bool {
        self.tokens.peek().is_none()
    }

    // Nesting is tracked on an explicit stack of open forms, innermost last,
    // so input depth is bounded by memory rather than host stack.
    fn read_with_token(&mut self, first: Token) -> ParseResult<Node> {
        let mut open: Vec<(Span, Vec<Node>)> = Vec::new();
        let mut token = first;
        loop {
            let complete = match token.kind {
                TokenKind::LParen => {
                    open.push((token.span, Vec::new()));
                    None
                }
                TokenKind::RParen => match open.pop() {
                    Some((start, elements)) => {
                        Some(Node::new_form(elements, start.merge(token.span)))
                    }
                    None => return Err(SyntaxError::UnexpectedCloseParen { span: token.span }),
                },
                TokenKind::Atom(text) => Some(parse_atom(&text, token.span)),
            };

            if let Some(node) = complete {
                match open.last_mut() {
                    Some((_, elements)) => elements.push(node),
                    None => return Ok(node),
                }
            }

            token = match self.tokens.next() {
                Some(next) => next,
                None => return Err(self.eof_error()),
            };
        }
    }
}

/// Integers first, then floats, otherwise a symbol: `3` is integral, `3.0` is not.
fn parse_atom(text: &str, span: Span) -> Node {
    if let Ok(i) = text.parse::<i64>() {
        Node::new_integer(i, span)
    } else if let Ok(f) = text.parse::<f64>() {
        Node::new_float(f, span)
    } else {
        Node::new_symbol(text, span)
    }
}

// Lexes and reads exactly one top-level form. Anything after it is ignored.
pub fn parse_str(input: &str) -> ParseResult<Node> {
    Parser::new(tokenize(input)).read()
}
