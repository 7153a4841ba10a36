//! Lox-family interpreter command line.
//!
//! `tokenize`, `parse`, `evaluate` and `execute` operate on a source file;
//! `repl` drops into interactive line-by-line execution on stdin.
//!
//! Exit codes: 0 on success, 1 on usage or I/O errors, 65 on lex or parse
//! errors, 70 on runtime errors.

use std::fs::File;
use std::io;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use treelox::interpreter::{Interpreter, LoxError};
use treelox::parser;
use treelox::scanner;

const SYNTAX_ERROR_EXIT: i32 = 65;
const RUNTIME_ERROR_EXIT: i32 = 70;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token stream of a source file, then any lex errors.
    Tokenize { file: PathBuf },
    /// Print the parsed AST, one statement per line.
    Parse { file: PathBuf },
    /// Evaluate the file as a single expression and print its value.
    Evaluate { file: PathBuf },
    /// Run the file as a program.
    Execute { file: PathBuf },
    /// Interactive line-by-line execution on stdin.
    Repl,
}

fn main() -> Result<(), anyhow::Error> {
    let args = Args::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        process::exit(if e.use_stderr() { 1 } else { 0 });
    });

    match args.command {
        Command::Tokenize { file } => tokenize(&file),
        Command::Parse { file } => parse(&file),
        Command::Evaluate { file } => evaluate(&file),
        Command::Execute { file } => execute(&file),
        Command::Repl => repl(),
    }
}

fn open(path: &Path) -> Result<BufReader<File>, anyhow::Error> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

fn tokenize(path: &Path) -> Result<(), anyhow::Error> {
    let (tokens, errors) = scanner::tokenize(open(path)?)?;
    for token in &tokens {
        println!("{}", token);
    }
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{}", e);
        }
        process::exit(SYNTAX_ERROR_EXIT);
    }
    Ok(())
}

fn parse(path: &Path) -> Result<(), anyhow::Error> {
    let (tokens, errors) = scanner::tokenize(open(path)?)?;
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{}", e);
        }
        process::exit(SYNTAX_ERROR_EXIT);
    }
    match parser::parse(tokens) {
        Ok(stmts) => {
            for stmt in &stmts {
                println!("{}", stmt);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(SYNTAX_ERROR_EXIT);
        }
    }
}

fn evaluate(path: &Path) -> Result<(), anyhow::Error> {
    let reader = open(path)?;
    let mut stdout = io::stdout();
    let mut interp = Interpreter::new(&mut stdout);
    match interp.evaluate_expression(reader) {
        Ok(val) => {
            println!("{}", val);
            Ok(())
        }
        Err(e) => report_and_exit(e),
    }
}

fn execute(path: &Path) -> Result<(), anyhow::Error> {
    let reader = open(path)?;
    let mut stdout = io::stdout();
    let mut interp = Interpreter::new(&mut stdout);
    match interp.eval(reader) {
        Ok(()) => Ok(()),
        Err(e) => report_and_exit(e),
    }
}

fn report_and_exit(e: LoxError) -> ! {
    eprintln!("{}", e);
    let code = match e {
        LoxError::Lex(_) | LoxError::Parse(_) => SYNTAX_ERROR_EXIT,
        LoxError::Runtime(_) => RUNTIME_ERROR_EXIT,
        LoxError::Read(_) => 1,
    };
    process::exit(code)
}

fn repl() -> Result<(), anyhow::Error> {
    let stdin = io::stdin();
    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);

    let mut input = String::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        if let Err(e) = interp.eval(input.as_bytes()) {
            eprintln!("{}", e);
        }
    }

    Ok(())
}
