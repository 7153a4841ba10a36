//! API to control the interpreter.

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::rc::Rc;

use crate::ast::Stmt;
use crate::char_reader::CharReaderError;
use crate::diag::{FullParseError, LexError};
use crate::eval::{Evaluator, RuntimeError, Value};
use crate::intern::Context;
use crate::parser::Parser;
use crate::scanner;

/// Tree-walk interpreter.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function, then additional
/// times to call this function:
///
/// ```
/// # use treelox::interpreter::{Interpreter, LoxError};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let func_def = r#"
///     fun scale(n, factor) {
///         return n * factor;
///     }
/// "#;
/// interp.eval(func_def.as_bytes())?;
///
/// interp.eval("print scale(5, 3);".as_bytes())?;
/// interp.eval("print scale(2, 2) + 1;".as_bytes())?;
///
/// assert_eq!(output, b"15\n5\n");
/// # Ok::<(), LoxError>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    ctx: Rc<Context>,
    evaluator: Evaluator<'t, W>,
}

/// Errors the interpreter can raise, one variant per taxon.
#[derive(Debug)]
pub enum LoxError {
    /// Lexical errors, collected over the whole input.
    Lex(Vec<LexError>),

    /// The first syntax error encountered.
    Parse(FullParseError),

    /// Error occurring during evaluation.
    Runtime(RuntimeError),

    /// The input could not be read or decoded.
    Read(CharReaderError),
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxError::Lex(errors) => {
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{}", e)?;
                }
                Ok(())
            }
            LoxError::Parse(e) => write!(f, "{}", e),
            LoxError::Runtime(e) => write!(f, "{}", e),
            LoxError::Read(e) => write!(f, "read error: {}", e),
        }
    }
}

impl Error for LoxError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            LoxError::Lex(_) => None,
            LoxError::Parse(e) => Some(e),
            LoxError::Runtime(e) => Some(e),
            LoxError::Read(e) => Some(e),
        }
    }
}

impl From<FullParseError> for LoxError {
    fn from(e: FullParseError) -> LoxError {
        LoxError::Parse(e)
    }
}

impl From<RuntimeError> for LoxError {
    fn from(e: RuntimeError) -> LoxError {
        LoxError::Runtime(e)
    }
}

impl From<CharReaderError> for LoxError {
    fn from(e: CharReaderError) -> LoxError {
        LoxError::Read(e)
    }
}

impl<W: Write> Interpreter<'_, W> {
    /// Creates an interpreter writing `print` output to `output`.
    ///
    /// Global state persists across [`Interpreter::eval`] calls, so a REPL
    /// can feed one line at a time.
    pub fn new(output: &mut W) -> Interpreter<'_, W> {
        Interpreter {
            ctx: Context::new(),
            evaluator: Evaluator::new(output),
        }
    }

    /// Run `input` as a program.
    pub fn eval<R: BufRead>(&mut self, input: R) -> Result<(), LoxError> {
        let stmts = self.parse(input)?;
        self.evaluator.interpret(&stmts)?;
        Ok(())
    }

    /// Evaluate `input` as a single expression and return its value.
    pub fn evaluate_expression<R: BufRead>(&mut self, input: R) -> Result<Value, LoxError> {
        let tokens = self.tokenize_checked(input)?;
        let expr = Parser::new(tokens, self.ctx.clone()).parse_expression()?;
        Ok(self.evaluator.eval_expression(&expr)?)
    }

    fn parse<R: BufRead>(&mut self, input: R) -> Result<Vec<Stmt>, LoxError> {
        let tokens = self.tokenize_checked(input)?;
        Ok(Parser::new(tokens, self.ctx.clone()).parse_program()?)
    }

    fn tokenize_checked<R: BufRead>(
        &self,
        input: R,
    ) -> Result<Vec<crate::token::Token>, LoxError> {
        let (tokens, errors) = scanner::tokenize(input)?;
        if !errors.is_empty() {
            return Err(LoxError::Lex(errors));
        }
        Ok(tokens)
    }
}
