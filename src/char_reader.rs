//! Convert a byte reader into an iterator over UTF-8 characters.
//!
//! The scanner wants one-rune lookahead over arbitrary `BufRead` sources
//! (files, stdin, in-memory slices), which `std` does not provide directly.

use std::error::Error;
use std::fmt;
use std::io::prelude::*;
use std::io::{self, Bytes};
use std::str;

/// An iterator over a buffered reader that yields characters rather than bytes.
#[derive(Debug)]
pub struct CharReader<R: BufRead> {
    input: Bytes<R>,
}

impl<R: BufRead> CharReader<R> {
    pub fn new(input: R) -> CharReader<R> {
        CharReader {
            input: input.bytes(),
        }
    }

    /// Decode a multi-byte sequence whose expected length is derived from the
    /// lead byte. The sequence is validated as a whole by `str::from_utf8`.
    fn decode_multi_byte(&mut self, lead: u8) -> Result<char, CharReaderError> {
        let len = match lead {
            b if b & 0b1110_0000 == 0b1100_0000 => 2,
            b if b & 0b1111_0000 == 0b1110_0000 => 3,
            b if b & 0b1111_1000 == 0b1111_0000 => 4,
            b => return Err(CharReaderError::InvalidUtf8(vec![b])),
        };

        let mut seq = [0u8; 4];
        seq[0] = lead;
        for slot in seq.iter_mut().take(len).skip(1) {
            match self.input.next() {
                Some(Ok(b)) => *slot = b,
                Some(Err(e)) => return Err(CharReaderError::Io(e)),
                None => return Err(CharReaderError::InvalidUtf8(seq[..len].to_vec())),
            }
        }

        match str::from_utf8(&seq[..len]) {
            // from_utf8 on a valid sequence always yields at least one char
            Ok(s) => Ok(s.chars().next().unwrap()),
            Err(_) => Err(CharReaderError::InvalidUtf8(seq[..len].to_vec())),
        }
    }
}

impl<R: BufRead> Iterator for CharReader<R> {
    type Item = Result<char, CharReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.input.next()? {
            Ok(b) if b.is_ascii() => Some(Ok(b as char)),
            Ok(b) => Some(self.decode_multi_byte(b)),
            Err(e) => Some(Err(CharReaderError::Io(e))),
        }
    }
}

/// Errors raised while reading bytes and assembling them into characters.
#[derive(Debug)]
pub enum CharReaderError {
    Io(io::Error),
    InvalidUtf8(Vec<u8>),
}

impl fmt::Display for CharReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharReaderError::Io(e) => write!(f, "failed to read bytes: {}", e),
            CharReaderError::InvalidUtf8(bytes) => {
                write!(f, "invalid UTF-8 sequence: {:02x?}", bytes)
            }
        }
    }
}

impl Error for CharReaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CharReaderError::Io(e) => Some(e),
            CharReaderError::InvalidUtf8(_) => None,
        }
    }
}

impl From<io::Error> for CharReaderError {
    fn from(err: io::Error) -> CharReaderError {
        CharReaderError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &str) -> Result<String, CharReaderError> {
        CharReader::new(input.as_bytes()).collect()
    }

    #[test]
    fn read_ascii() -> Result<(), CharReaderError> {
        assert_eq!(read("abc123")?, "abc123");
        Ok(())
    }

    #[test]
    fn read_multi_byte_char_at_end_of_input() -> Result<(), CharReaderError> {
        assert_eq!(read("é")?, "é");
        Ok(())
    }

    #[test]
    fn read_multi_byte_char_followed_by_ascii() -> Result<(), CharReaderError> {
        assert_eq!(read("λx")?, "λx");
        Ok(())
    }

    #[test]
    fn four_byte_char() -> Result<(), CharReaderError> {
        assert_eq!(read("𝄞")?, "𝄞");
        Ok(())
    }

    #[test]
    fn lone_continuation_byte_is_rejected() {
        let input = [0b1000_0001u8];
        let mut reader = CharReader::new(&input[..]);
        match reader.next() {
            Some(Err(CharReaderError::InvalidUtf8(_))) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn truncated_sequence_is_rejected() {
        let input = [0b1110_0000u8, 0b1000_0000u8];
        let mut reader = CharReader::new(&input[..]);
        match reader.next() {
            Some(Err(CharReaderError::InvalidUtf8(_))) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn overlong_sequence_is_rejected() {
        // 0xC0 0xAF is an overlong encoding of '/'.
        let input = [0xC0u8, 0xAFu8];
        let mut reader = CharReader::new(&input[..]);
        match reader.next() {
            Some(Err(CharReaderError::InvalidUtf8(_))) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }
}
