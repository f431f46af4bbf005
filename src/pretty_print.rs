use std::io;
use std::ops::Range;

use ariadne::{Label, Report, ReportKind, Source};

use crate::{Error, EvalError, SyntaxError};

type SourceSpan<'a> = (&'a str, Range<usize>);

fn build<'a>(
    source_id: &'a str,
    range: Range<usize>,
    message: String,
    label: String,
) -> Report<'a, SourceSpan<'a>> {
    Report::build(ReportKind::Error, (source_id, range.clone()))
        .with_message(message)
        .with_label(Label::new((source_id, range)).with_message(label))
        .finish()
}

impl SyntaxError {
    fn report<'a>(&self, source_id: &'a str) -> Report<'a, SourceSpan<'a>> {
        let range = self.span().to_range();
        match self {
            SyntaxError::UnexpectedEof { .. } => build(
                source_id,
                range,
                "Unexpected EOF".to_string(),
                "input ended while a form was still open".to_string(),
            ),
            SyntaxError::UnexpectedCloseParen { .. } => build(
                source_id,
                range,
                "Unexpected ')'".to_string(),
                "no form is open here".to_string(),
            ),
        }
    }

    /// Writes a labelled report of this error against `input` to stderr.
    pub fn pretty_print(&self, source_id: &str, input: &str) -> io::Result<()> {
        self.report(source_id).eprint((source_id, Source::from(input)))
    }
}

impl EvalError {
    fn report<'a>(&self, source_id: &'a str) -> Report<'a, SourceSpan<'a>> {
        let range = self.span().to_range();
        match self {
            EvalError::UnboundVariable { name, .. } => build(
                source_id,
                range,
                format!("Unbound symbol `{}`", name),
                "This symbol is not defined in the current scope".to_string(),
            ),
            EvalError::ArityMismatch {
                expected, found, ..
            } => build(
                source_id,
                range,
                "Arity mismatch".to_string(),
                format!("expected {} arguments, got {}", expected, found),
            ),
            EvalError::ArgumentError {
                procedure, message, ..
            } => build(
                source_id,
                range,
                format!("Invalid arguments to `{}`", procedure),
                message.clone(),
            ),
            EvalError::NotCallable { value, .. } => build(
                source_id,
                range,
                format!("Not a procedure: {}", value),
                "This expression cannot be called as a procedure".to_string(),
            ),
            EvalError::TypeMismatch {
                procedure,
                expected,
                found,
                ..
            } => build(
                source_id,
                range,
                format!("Type mismatch in `{}`", procedure),
                format!("Expected {}, found {}", expected, found),
            ),
            EvalError::MalformedForm { message, .. } => build(
                source_id,
                range,
                "Invalid special form".to_string(),
                message.clone(),
            ),
        }
    }

    /// Writes a labelled report of this error against `input` to stderr.
    pub fn pretty_print(&self, source_id: &str, input: &str) -> io::Result<()> {
        self.report(source_id).eprint((source_id, Source::from(input)))
    }
}

impl Error {
    /// Reports any session error. Errors without a source location are
    /// printed as plain messages.
    pub fn pretty_print(&self, source_id: &str, input: &str) -> io::Result<()> {
        match self {
            Error::Syntax(err) => err.pretty_print(source_id, input),
            Error::Eval(err) => err.pretty_print(source_id, input),
            Error::Io { .. } => {
                eprintln!("Error: {}", self);
                Ok(())
            }
        }
    }
}
