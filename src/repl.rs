use std::borrow::Cow;
use std::path::PathBuf;

use minischeme::evaluator::special_form_identifiers;
use minischeme::{EnvRef, Interpreter};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Cmd, Completer, Context, Editor, EventHandler, KeyCode, KeyEvent, Modifiers};
use rustyline::{Helper, Highlighter, Hinter, Validator};

use crate::EditMode;

const PROMPT: &str = "~> ";
const SOURCE_ID: &str = "REPL";

pub struct ReplOptions {
    pub edit_mode: EditMode,
    pub history: Option<PathBuf>,
}

struct ReplCompleter {
    env: EnvRef,
}

impl ReplCompleter {
    fn new(env: EnvRef) -> Self {
        ReplCompleter { env }
    }
}

// Start of the atom being typed at `pos`: just after the nearest paren or space.
fn word_start(line: &str, pos: usize) -> usize {
    line[..pos]
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace() || *c == '(' || *c == ')')
        .map_or(0, |(i, c)| i + c.len_utf8())
}

fn matching_names<'a>(names: impl Iterator<Item = &'a String>, prefix: &str) -> Vec<String> {
    let mut matches: Vec<String> = names
        .filter(|name| name.starts_with(prefix))
        .cloned()
        .collect();
    matches.sort();
    matches
}

impl rustyline::completion::Completer for ReplCompleter {
    type Candidate = String;
    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let start = word_start(line, pos);
        let prefix = &line[start..pos];
        if prefix.is_empty() {
            return Ok((pos, vec![]));
        }
        let names = self.env.borrow().identifiers();
        let special_forms = special_form_identifiers();
        Ok((
            start,
            matching_names(names.union(&special_forms), prefix),
        ))
    }
}

#[derive(Completer, Helper, Highlighter, Hinter, Validator)]
struct ReplHelper {
    #[rustyline(Validator)]
    validator: ReplValidator,
    #[rustyline(Highlighter)]
    highlighter: ReplHighlighter,
    #[rustyline(Completer)]
    completer: ReplCompleter,
}

/// Open parens minus close parens.
fn paren_depth(input: &str) -> i64 {
    input.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

struct ReplValidator;

// A line with unclosed parens continues on the next one. Stray ')' are left
// for the reader to report.
impl Validator for ReplValidator {
    fn validate(&self, ctx: &mut ValidationContext) -> rustyline::Result<ValidationResult> {
        if paren_depth(ctx.input()) > 0 {
            Ok(ValidationResult::Incomplete)
        } else {
            Ok(ValidationResult::Valid(None))
        }
    }
}

/// Byte offsets of the paren under (or just before) the cursor and its partner.
fn matching_pair(line: &str, pos: usize) -> Option<(usize, usize)> {
    let bytes = line.as_bytes();
    let is_paren = |i: usize| matches!(bytes.get(i), Some(b'(') | Some(b')'));
    let cursor = if is_paren(pos) {
        pos
    } else if pos > 0 && is_paren(pos - 1) {
        pos - 1
    } else {
        return None;
    };

    let mut stack = Vec::new();
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => stack.push(i),
            b')' => {
                if let Some(open) = stack.pop() {
                    if open == cursor || i == cursor {
                        return Some((open, i));
                    }
                }
            }
            _ => {}
        }
    }
    None
}

struct ReplHighlighter;

impl Highlighter for ReplHighlighter {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        let pair = matching_pair(line, pos);
        let mut depth = 0usize;
        let mut highlighted = String::with_capacity(line.len());

        for (i, c) in line.char_indices() {
            match c {
                '(' | ')' if pair.is_some_and(|(open, close)| i == open || i == close) => {
                    highlighted.push_str(&format!("\x1b[1;34m{}\x1b[0m", c)); // Blue for matching parens
                    if c == '(' {
                        depth += 1;
                    } else {
                        depth = depth.saturating_sub(1);
                    }
                }
                '(' => {
                    depth += 1;
                    highlighted.push(c);
                }
                ')' if depth == 0 => {
                    highlighted.push_str(&format!("\x1b[31m{}\x1b[0m", c)); // Red for unmatched closing parens
                }
                ')' => {
                    depth -= 1;
                    highlighted.push(c);
                }
                _ => highlighted.push(c),
            }
        }

        Cow::Owned(highlighted)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

fn eval_and_print(interpreter: &Interpreter, input: &str) {
    match interpreter.eval_str(input) {
        Ok(value) => {
            if !value.is_unit() {
                println!("{}", value);
            }
        }
        Err(err) => {
            if let Err(io_err) = err.pretty_print(SOURCE_ID, input) {
                eprintln!("Error: {} ({})", err, io_err);
            }
        }
    }
}

/// Runs the interactive loop until end of input or `exit`.
pub fn run(interpreter: &Interpreter, options: &ReplOptions) -> rustyline::Result<()> {
    let helper = ReplHelper {
        highlighter: ReplHighlighter,
        validator: ReplValidator,
        completer: ReplCompleter::new(interpreter.global_env().clone()),
    };
    let edit_mode = match options.edit_mode {
        EditMode::Vi => rustyline::EditMode::Vi,
        EditMode::Emacs => rustyline::EditMode::Emacs,
    };
    let config = rustyline::config::Config::builder()
        .edit_mode(edit_mode)
        .build();
    let mut rl: Editor<ReplHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(helper));
    // Ctrl-S inserts a newline without submitting.
    rl.bind_sequence(
        KeyEvent(KeyCode::Char('s'), Modifiers::CTRL),
        EventHandler::Simple(Cmd::Newline),
    );
    if let Some(path) = &options.history {
        if rl.load_history(path).is_err() {
            tracing::debug!(path = %path.display(), "no previous history");
        }
    }

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                rl.add_history_entry(input)?;
                if input == "exit" {
                    break;
                }
                eval_and_print(interpreter, input);
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl-C
                println!("Interrupted. Type 'exit' or Ctrl-D to quit.");
            }
            Err(ReadlineError::Eof) => {
                // Ctrl-D
                println!("Goodbye");
                break;
            }
            Err(err) => {
                eprintln!("Readline Error: {:?}", err);
                break;
            }
        }
    }

    match &options.history {
        Some(path) => rl.save_history(path),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paren_depth() {
        assert_eq!(paren_depth("(define x (+ 1"), 2);
        assert_eq!(paren_depth("(+ 1 2)"), 0);
        assert_eq!(paren_depth("1)"), -1);
    }

    #[test]
    fn test_word_start() {
        assert_eq!(word_start("(ca", 3), 1);
        assert_eq!(word_start("(car (li", 8), 6);
        assert_eq!(word_start("pi", 2), 0);
        assert_eq!(word_start("(+ 1 ", 5), 5);
    }

    #[test]
    fn test_matching_names() {
        let names = vec![
            "cdr".to_string(),
            "car".to_string(),
            "cons".to_string(),
            "list".to_string(),
        ];
        assert_eq!(matching_names(names.iter(), "c"), vec!["car", "cdr", "cons"]);
        assert!(matching_names(names.iter(), "x").is_empty());
    }

    #[test]
    fn test_matching_pair() {
        assert_eq!(matching_pair("(+ (f 1) 2)", 0), Some((0, 10)));
        assert_eq!(matching_pair("(+ (f 1) 2)", 8), Some((3, 7)));
        assert_eq!(matching_pair("(+ (f 1) 2)", 11), Some((0, 10)));
        assert_eq!(matching_pair("(+ 1", 0), None);
        assert_eq!(matching_pair("abc", 1), None);
    }

    #[test]
    fn test_highlight_marks_stray_close_paren() {
        let out = ReplHighlighter.highlight("1)", 0);
        assert!(out.contains("\x1b[31m)"));
    }
}
