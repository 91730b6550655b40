//! Sources of input symbols.
//!
//! A scan pulls one symbol at a time and never asks for one twice;
//! anything it needs to look at again, it keeps in its own buffer.

use std::io::{BufReader, ErrorKind, Read};

/// An ordered source of characters.
pub trait SymbolSource {
    /// The next symbol, or `None` at end of input.
    ///
    /// An error here is fatal to the scan that asked.
    fn next_symbol(&mut self) -> std::io::Result<Option<char>>;
}

impl<S: SymbolSource + ?Sized> SymbolSource for &mut S {
    fn next_symbol(&mut self) -> std::io::Result<Option<char>> {
        (**self).next_symbol()
    }
}

impl<S: SymbolSource + ?Sized> SymbolSource for Box<S> {
    fn next_symbol(&mut self) -> std::io::Result<Option<char>> {
        (**self).next_symbol()
    }
}

/// Symbols from text already in memory.
/// Nested scans read their parent's match text through one of these.
#[derive(Debug, Clone)]
pub struct StrSource {
    chars: std::vec::IntoIter<char>,
}

impl StrSource {
    pub fn new(text: &str) -> Self {
        StrSource {
            chars: text.chars().collect::<Vec<_>>().into_iter(),
        }
    }
}

impl From<&str> for StrSource {
    fn from(value: &str) -> Self {
        StrSource::new(value)
    }
}

impl SymbolSource for StrSource {
    fn next_symbol(&mut self) -> std::io::Result<Option<char>> {
        Ok(self.chars.next())
    }
}

/// Symbols decoded, as UTF-8, from a byte stream.
pub struct ReadSource<R> {
    reader: BufReader<R>,
}

impl<R: Read> ReadSource<R> {
    pub fn new(reader: R) -> Self {
        ReadSource {
            reader: BufReader::new(reader),
        }
    }

    /// Read one byte; false at a clean end of input.
    fn read_byte(&mut self, byte: &mut u8) -> std::io::Result<bool> {
        loop {
            match self.reader.read(std::slice::from_mut(byte)) {
                Ok(0) => return Ok(false),
                Ok(_) => return Ok(true),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

fn invalid_utf8(bytes: &[u8]) -> std::io::Error {
    std::io::Error::new(
        ErrorKind::InvalidData,
        format!("input is not valid UTF-8: {bytes:x?}"),
    )
}

impl<R: Read> SymbolSource for ReadSource<R> {
    fn next_symbol(&mut self) -> std::io::Result<Option<char>> {
        let mut buf = [0u8; 4];
        if !self.read_byte(&mut buf[0])? {
            return Ok(None);
        }
        let width = match buf[0] {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => return Err(invalid_utf8(&buf[..1])),
        };
        // A multi-byte sequence cut off by end-of-input is just as malformed.
        self.reader.read_exact(&mut buf[1..width])?;
        let s = std::str::from_utf8(&buf[..width]).map_err(|_| invalid_utf8(&buf[..width]))?;
        Ok(s.chars().next())
    }
}
