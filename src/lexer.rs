use logos::Logos;
use std::fmt;

use crate::Span;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"\s+")] // Skip whitespace
pub enum TokenKind {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    // Anything that is neither whitespace nor a paren. Numbers are told apart
    // from symbols by the reader, not here.
    #[regex(r"[^\s()]+", |lex| lex.slice().to_string())]
    Atom(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::Atom(text) => write!(f, "{}", text),
        }
    }
}

/// Splits `input` into a flat token stream. Parentheses always come out as
/// their own tokens, whether or not they are surrounded by whitespace.
///
/// Lexing cannot fail: every character is whitespace, a paren, or part of an
/// atom, so logos never yields its `Err(())`.
pub fn tokenize(input: &str) -> Vec<Token> {
    TokenKind::lexer(input)
        .spanned()
        .filter_map(|(result, range)| {
            result.ok().map(|kind| Token {
                kind,
                span: Span::new(range.start, range.end),
            })
        })
        .collect()
}
