//! Diagnostics shared by the scanner and the parser.

use std::error::Error;
use std::fmt;

/// Line number (starting at one).
pub type Position = u32;

/// A lexical error tied to the line where it occurred.
///
/// The scanner collects these instead of aborting, so a single run can
/// report every offending character in the input.
#[derive(Debug, PartialEq)]
pub struct LexError {
    pub line: Position,
    pub kind: LexErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum LexErrorKind {
    UnexpectedChar(char),
    UnterminatedString,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error: {}", self.line, self.kind)
    }
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexErrorKind::UnexpectedChar(ch) => write!(f, "Unexpected character: {}", ch),
            LexErrorKind::UnterminatedString => write!(f, "Unterminated string."),
        }
    }
}

impl Error for LexError {}

/// A syntax error. The parser bails out on the first one it encounters.
#[derive(Debug, PartialEq)]
pub struct FullParseError {
    pub pos: Position,
    pub error: ParseError,
}

impl fmt::Display for FullParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Error: {}", self.pos, self.error)
    }
}

impl Error for FullParseError {}

#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// Found / expected descriptions, in source form.
    UnexpectedToken(String, String),
    ExpectedExpression(String),
    ExpectedIdentifier(String),
    InvalidAssignmentTarget,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedToken(found, expected) => {
                write!(f, "Expected '{}' but found {}.", expected, found)
            }
            ParseError::ExpectedExpression(found) => {
                write!(f, "Expected expression but found {}.", found)
            }
            ParseError::ExpectedIdentifier(found) => {
                write!(f, "Expected identifier but found {}.", found)
            }
            ParseError::InvalidAssignmentTarget => {
                write!(f, "Can only assign to variables")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_format() {
        let e = LexError {
            line: 3,
            kind: LexErrorKind::UnexpectedChar('@'),
        };
        assert_eq!(e.to_string(), "[line 3] Error: Unexpected character: @");

        let e = LexError {
            line: 1,
            kind: LexErrorKind::UnterminatedString,
        };
        assert_eq!(e.to_string(), "[line 1] Error: Unterminated string.");
    }

    #[test]
    fn parse_error_format() {
        let e = FullParseError {
            pos: 2,
            error: ParseError::UnexpectedToken("'+'".to_string(), ")".to_string()),
        };
        assert_eq!(e.to_string(), "[line 2] Error: Expected ')' but found '+'.");
    }
}
