use std::path::PathBuf;

use clap::Parser;
use itertools::Itertools;
use ownlisp::{Interpreter, Value};
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const BANNER: &str = "my-own-lisp version 0.0.1";
const EXIT_HINT: &str = "Press Ctrl-C to exit";

#[derive(Parser, Debug)]
#[command(name = "ownlisp", version, about = "A small Lisp with Q-expressions")]
struct Cli {
    /// Source files, loaded in order before anything else.
    files: Vec<PathBuf>,

    /// Start the REPL after loading the files.
    #[arg(short, long)]
    interactive: bool,

    #[arg(long, default_value = "my-own-lisp> ")]
    prompt: String,
}

/// Logs go to stderr, filtered by `RUST_LOG`.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

enum MetaCommand {
    Exit,
    Env,
    Help,
}

impl MetaCommand {
    /// A line is a meta command only when it is a single word that does not
    /// name a bound symbol.
    fn recognise(line: &str, interpreter: &Interpreter) -> Option<Self> {
        let word = line.trim();
        if word.contains(char::is_whitespace) || interpreter.exists(word) {
            return None;
        }
        match word {
            "exit" | "quit" => Some(Self::Exit),
            "env" => Some(Self::Env),
            "help" => Some(Self::Help),
            _ => None,
        }
    }
}

fn repl(interpreter: &mut Interpreter, prompt: &str) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;

    println!("{}", BANNER);
    println!("{}\n", EXIT_HINT);

    loop {
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => break,
            Err(error) => return Err(error.into()),
        };
        let _ = editor.add_history_entry(line.as_str());

        match MetaCommand::recognise(&line, interpreter) {
            Some(MetaCommand::Exit) => break,
            Some(MetaCommand::Env) => {
                for (name, value) in interpreter.bindings() {
                    println!("{}: {}", name, value);
                }
                continue;
            }
            Some(MetaCommand::Help) => {
                println!("{}", ["exit", "quit", "env", "help"].iter().join(", "));
                continue;
            }
            None => {}
        }

        match interpreter.evaluate_str(&line) {
            Ok(value) => println!("{}", value),
            Err(err) => println!("error: {}", err),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut interpreter = Interpreter::new();
    for file in &cli.files {
        info!(file = %file.display(), "loading from command line");
        if let Value::Error(error) = interpreter.load_file(file) {
            println!("error: {}", error);
        }
    }

    if cli.files.is_empty() || cli.interactive {
        repl(&mut interpreter, &cli.prompt)?;
    }

    Ok(())
}
