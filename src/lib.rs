//! A tree-walking interpreter for a small Lox-family scripting language.
//!
//! The pipeline is strictly one-way: bytes are scanned into tokens
//! ([`scanner::tokenize`]), tokens are parsed into an abstract syntax tree
//! ([`parser::parse`]), and the tree is executed against a lexically scoped
//! environment chain writing to a caller-supplied output sink
//! ([`interpreter::Interpreter`]).
//!
//! # Examples
//!
//! See [`crate::interpreter::Interpreter`].
//!
//! # Limitations
//!
//! - The parser does not attempt any error recovery; it bails out on the
//!   first encountered error. The scanner, by contrast, collects all its
//!   errors and keeps going.
//! - No classes, no modules, no standard library.

#![warn(rust_2018_idioms)]
#![warn(missing_debug_implementations)]

pub mod ast;
pub mod diag;
pub mod eval;
pub mod intern;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod token;

mod char_reader;

pub use char_reader::CharReaderError;
