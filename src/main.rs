use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

use clap::Parser;
use lispy::ast::Value;
use lispy::builtinops::{load_file, load_prelude};
use lispy::config::ReplConfig;
use lispy::evaluator::{self, Environment};
use lispy::reader;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Interactive interpreter for a small Lisp with S-expressions and Q-expressions
#[derive(Debug, Parser)]
#[command(name = "lispy", version, about)]
struct Args {
    /// Source files to load before the prompt appears
    files: Vec<PathBuf>,

    /// Do not load the standard library
    #[arg(long)]
    no_prelude: bool,

    /// Load and save line history in this file
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// Prompt shown before each line
    #[arg(long, value_name = "TEXT")]
    prompt: Option<String>,
}

impl Args {
    fn apply(self, mut config: ReplConfig) -> ReplConfig {
        config.files = self.files;
        if self.no_prelude {
            config.load_prelude = false;
        }
        if let Some(history) = self.history {
            config.history_file = Some(history);
        }
        if let Some(prompt) = self.prompt {
            config.prompt = prompt;
        }
        config
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("LISPY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let config = match ReplConfig::default().apply_env() {
        Ok(config) => args.apply(config),
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let stack_size = match config.stack_size_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = thread::Builder::new()
        .name("lispy-repl".to_owned())
        .stack_size(stack_size)
        .spawn(move || run_repl(&config))
        .map_err(|e| format!("failed to start interpreter thread: {e}"))
        .and_then(|handle| {
            handle
                .join()
                .map_err(|_| "interpreter thread panicked".to_owned())?
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_repl(config: &ReplConfig) -> Result<(), String> {
    let env = evaluator::create_global_env();
    if config.load_prelude {
        load_prelude(&env);
    }
    for path in &config.files {
        let result = load_file(&env, path);
        if result.is_error() {
            println!("{result}");
        }
    }

    println!("Lispy Version {}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for more commands, or Ctrl+C to exit.");
    println!();

    let mut rl = DefaultEditor::new().map_err(|e| format!("could not initialize REPL: {e}"))?;
    if let Some(history) = &config.history_file
        && let Err(e) = rl.load_history(history)
    {
        debug!(path = %history.display(), error = %e, "no history loaded");
    }

    loop {
        match rl.readline(&config.prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Add the line to history
                let _ = rl.add_history_entry(line);

                // Handle special commands
                match line {
                    ":help" => {
                        print_help();
                        continue;
                    }
                    ":env" => {
                        print_environment(&env);
                        continue;
                    }
                    ":quit" | ":exit" => {
                        println!("Goodbye!");
                        break;
                    }
                    _ => {}
                }

                let result = evaluator::eval(&env, reader::read(line));
                println!("{result}");
            }

            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {err:?}");
                break;
            }
        }
    }

    if let Some(history) = &config.history_file
        && let Err(e) = rl.save_history(history)
    {
        warn!(path = %history.display(), error = %e, "could not save history");
    }
    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  :help      - Show this help message");
    println!("  :env       - Show current environment bindings");
    println!("  :quit      - Exit the interpreter");
    println!("  :exit      - Exit the interpreter");
    println!("  Ctrl+C     - Exit the interpreter");
    println!();
    println!("Syntax:");
    println!("  Numbers: 42, -5, 2.5 (ints and doubles never mix)");
    println!("  Booleans: true, false");
    println!("  Strings: \"text\" with \\n \\t \\\" escapes");
    println!("  S-expressions evaluate: (+ 1 2)");
    println!("  Q-expressions are data: {{1 2 3}}");
    println!("  Comments: ; to end of line");
    println!();
    println!("Builtins:");
    println!("  Arithmetic: + - * / % ^ min max");
    println!("  Comparison: == != < > <= >=");
    println!("  Logic: && || !");
    println!("  Lists: list head tail join cons len init eval");
    println!("  Control and binding: if def = \\ fun");
    println!("  I/O: print error load exit");
    println!();
    println!("Examples:");
    println!("  (def {{x y}} 1 2)");
    println!("  (def {{square}} (\\ {{x}} {{* x x}}))");
    println!("  (defn {{add a b}} {{+ a b}})");
    println!("  ((add 1) 2)");
    println!("  (map square {{1 2 3}})");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total):", bindings.len());
    println!();

    // Separate built-in functions from user-defined values
    let mut builtins = Vec::new();
    let mut user_defined = Vec::new();

    for (name, value) in bindings {
        match value {
            Value::Builtin(_) => builtins.push(name),
            _ => user_defined.push((name, value)),
        }
    }

    if !builtins.is_empty() {
        println!("Built-in functions ({}):", builtins.len());
        for row in builtins.chunks(4) {
            for name in row {
                print!("  {name:<15}");
            }
            println!();
        }
        println!();
    }

    if !user_defined.is_empty() {
        println!("User-defined values ({}):", user_defined.len());
        for (name, value) in user_defined {
            println!("  {name} = {value}");
        }
    }
}
