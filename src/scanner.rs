//! Lexical analyzer.
//!
//! Single pass with one-rune lookahead. Lexical errors are collected rather
//! than thrown so one run reports every offending character; see [`tokenize`].

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::iter::Peekable;

use crate::char_reader::{CharReader, CharReaderError};
use crate::diag::{LexError, LexErrorKind, Position};
use crate::token::{self, Token, TokenKind};

/// Turn a sequence of bytes into a sequence of tokens.
///
/// The token stream always ends with an EOF token, no matter how broken the
/// input was.
#[derive(Debug)]
pub struct Scanner<R: BufRead> {
    input: Peekable<CharReader<R>>,
    line: Position,

    // One character of pushback, needed when a number is followed by a
    // lone '.' that belongs to the next token.
    pushback: Option<char>,

    // Buffer used when scanning longer tokens. Allocated here to reuse memory.
    buf: String,
}

impl<R: BufRead> Scanner<R> {
    /// Creates a new scanner operating on `input`.
    pub fn new(input: R) -> Scanner<R> {
        Scanner {
            input: CharReader::new(input).peekable(),
            line: 1,
            pushback: None,
            buf: String::new(),
        }
    }

    /// Scan the next token.
    ///
    /// At end of input this keeps returning an EOF token.
    pub fn get_token(&mut self) -> Result<Token, ScanError> {
        loop {
            let ch = match self.next_char()? {
                None => return Ok(Token::new(TokenKind::Eof, "", self.line)),
                Some(ch) => ch,
            };
            match ch {
                '\n' => self.line += 1,
                ' ' | '\t' | '\r' => (),
                '(' => return Ok(Token::new(TokenKind::LeftParen, "(", self.line)),
                ')' => return Ok(Token::new(TokenKind::RightParen, ")", self.line)),
                '{' => return Ok(Token::new(TokenKind::LeftBrace, "{", self.line)),
                '}' => return Ok(Token::new(TokenKind::RightBrace, "}", self.line)),
                ',' => return Ok(Token::new(TokenKind::Comma, ",", self.line)),
                '.' => return Ok(Token::new(TokenKind::Dot, ".", self.line)),
                '-' => return Ok(Token::new(TokenKind::Minus, "-", self.line)),
                '+' => return Ok(Token::new(TokenKind::Plus, "+", self.line)),
                ';' => return Ok(Token::new(TokenKind::Semicolon, ";", self.line)),
                '*' => return Ok(Token::new(TokenKind::Star, "*", self.line)),
                '/' => {
                    if self.peek_char() == Some('/') {
                        self.skip_comment();
                    } else {
                        return Ok(Token::new(TokenKind::Slash, "/", self.line));
                    }
                }
                '=' => {
                    return self.one_or_two(TokenKind::Equal, "=", TokenKind::EqualEqual, "==")
                }
                '!' => return self.one_or_two(TokenKind::Bang, "!", TokenKind::BangEqual, "!="),
                '<' => return self.one_or_two(TokenKind::Less, "<", TokenKind::LessEqual, "<="),
                '>' => {
                    return self.one_or_two(
                        TokenKind::Greater,
                        ">",
                        TokenKind::GreaterEqual,
                        ">=",
                    )
                }
                '"' => return self.scan_string(),
                '0'..='9' => return Ok(self.scan_number(ch)),
                'a'..='z' | 'A'..='Z' | '_' => return Ok(self.scan_identifier(ch)),
                _ => {
                    return Err(ScanError::Lex(LexError {
                        line: self.line,
                        kind: LexErrorKind::UnexpectedChar(ch),
                    }));
                }
            };
        }
    }

    /// Emit the two-character kind when the next rune is `=`, else the
    /// one-character kind.
    fn one_or_two(
        &mut self,
        one: TokenKind,
        one_lexeme: &str,
        two: TokenKind,
        two_lexeme: &str,
    ) -> Result<Token, ScanError> {
        if self.peek_char() == Some('=') {
            self.next_char()?;
            Ok(Token::new(two, two_lexeme, self.line))
        } else {
            Ok(Token::new(one, one_lexeme, self.line))
        }
    }

    fn scan_number(&mut self, first_digit: char) -> Token {
        self.buf.clear();
        self.buf.push(first_digit);
        while let Some(ch) = self.peek_char() {
            if !ch.is_ascii_digit() {
                break;
            }
            let ch = self.next_char_unchecked();
            self.buf.push(ch);
        }

        if self.peek_char() == Some('.') {
            self.next_char_unchecked();
            if self.peek_char().is_some_and(|ch| ch.is_ascii_digit()) {
                self.buf.push('.');
                while let Some(ch) = self.peek_char() {
                    if !ch.is_ascii_digit() {
                        break;
                    }
                    let ch = self.next_char_unchecked();
                    self.buf.push(ch);
                }
            } else {
                // "123." is NUMBER followed by DOT; hand the dot back.
                self.pushback = Some('.');
            }
        }

        // The lexeme matches [0-9]+(\.[0-9]+)? so parsing cannot fail.
        let value = self.buf.parse::<f64>().expect("numeric lexeme");
        Token::number(self.buf.clone(), value, self.line)
    }

    fn scan_string(&mut self) -> Result<Token, ScanError> {
        self.buf.clear();
        loop {
            match self.next_char()? {
                None => {
                    return Err(ScanError::Lex(LexError {
                        line: self.line,
                        kind: LexErrorKind::UnterminatedString,
                    }));
                }
                Some('"') => break,
                Some(ch) => {
                    if ch == '\n' {
                        self.line += 1;
                    }
                    self.buf.push(ch);
                }
            }
        }
        let lexeme = format!("\"{}\"", self.buf);
        Ok(Token::string(lexeme, self.buf.clone(), self.line))
    }

    fn scan_identifier(&mut self, first_char: char) -> Token {
        self.buf.clear();
        self.buf.push(first_char);
        while let Some(ch) = self.peek_char() {
            if !(ch.is_ascii_alphanumeric() || ch == '_') {
                break;
            }
            let ch = self.next_char_unchecked();
            self.buf.push(ch);
        }

        match token::keyword(&self.buf) {
            Some(kind) => Token::new(kind, self.buf.clone(), self.line),
            None => Token::new(TokenKind::Identifier, self.buf.clone(), self.line),
        }
    }

    fn skip_comment(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == '\n' {
                break;
            }
            self.next_char_unchecked();
        }
    }

    fn next_char(&mut self) -> Result<Option<char>, CharReaderError> {
        if let Some(ch) = self.pushback.take() {
            return Ok(Some(ch));
        }
        self.input.next().transpose()
    }

    /// Peek at the next character. Read errors stay queued and surface on the
    /// following `next_char`.
    fn peek_char(&mut self) -> Option<char> {
        if let Some(ch) = self.pushback {
            return Some(ch);
        }
        match self.input.peek() {
            Some(Ok(ch)) => Some(*ch),
            _ => None,
        }
    }

    /// Return the next character. Panics on EOF; use after peek_char()ing only.
    fn next_char_unchecked(&mut self) -> char {
        if let Some(ch) = self.pushback.take() {
            return ch;
        }
        self.input.next().unwrap().unwrap()
    }
}

impl<R: BufRead> Iterator for Scanner<R> {
    type Item = Result<Token, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.get_token() {
            Ok(tok) if tok.kind == TokenKind::Eof => None,
            Ok(tok) => Some(Ok(tok)),
            Err(e) => Some(Err(e)),
        }
    }
}

/// Scan the whole input.
///
/// Lexical errors are collected in the second slot of the pair while scanning
/// continues; only read failures abort. The returned token list always ends
/// with EOF.
pub fn tokenize<R: BufRead>(input: R) -> Result<(Vec<Token>, Vec<LexError>), CharReaderError> {
    let mut scanner = Scanner::new(input);
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    loop {
        match scanner.get_token() {
            Ok(tok) => {
                let at_end = tok.kind == TokenKind::Eof;
                tokens.push(tok);
                if at_end {
                    break;
                }
            }
            Err(ScanError::Lex(e)) => errors.push(e),
            Err(ScanError::Read(e)) => return Err(e),
        }
    }
    Ok((tokens, errors))
}

#[derive(Debug)]
pub enum ScanError {
    Read(CharReaderError),
    Lex(LexError),
}

impl Error for ScanError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ScanError::Read(e) => Some(e),
            ScanError::Lex(_) => None,
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Read(e) => write!(f, "read error: {}", e),
            ScanError::Lex(e) => write!(f, "{}", e),
        }
    }
}

impl From<CharReaderError> for ScanError {
    fn from(e: CharReaderError) -> ScanError {
        ScanError::Read(e)
    }
}
