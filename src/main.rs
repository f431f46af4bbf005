use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use minischeme::Interpreter;
use tracing_subscriber::EnvFilter;

mod repl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EditMode {
    Vi,
    Emacs,
}

/// A small Scheme-flavoured Lisp interpreter.
///
/// With FILE, evaluates the single top-level form in it and prints the
/// result. Without, starts an interactive session.
#[derive(Debug, Parser)]
#[command(name = "minischeme", version)]
struct Cli {
    /// File holding one top-level form to evaluate
    file: Option<PathBuf>,

    /// Line editing key bindings for the interactive session
    #[arg(long, value_enum, default_value_t = EditMode::Vi)]
    edit_mode: EditMode,

    /// Where interactive history is kept
    #[arg(long, default_value = ".minischeme_history")]
    history: PathBuf,

    /// Don't load or save interactive history
    #[arg(long)]
    no_history: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(path: &Path) -> ExitCode {
    let interpreter = Interpreter::new();
    let source_id = path.display().to_string();
    match interpreter.eval_file(path) {
        Ok(value) => {
            if !value.is_unit() {
                println!("{}", value);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Re-read only to label the report; an io error is printed plainly.
            let input = std::fs::read_to_string(path).unwrap_or_default();
            if let Err(io_err) = err.pretty_print(&source_id, &input) {
                eprintln!("Error: {} ({})", err, io_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match &cli.file {
        Some(path) => run_file(path),
        None => {
            let options = repl::ReplOptions {
                edit_mode: cli.edit_mode,
                history: (!cli.no_history).then(|| cli.history.clone()),
            };
            match repl::run(&Interpreter::new(), &options) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    eprintln!("Readline Error: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
