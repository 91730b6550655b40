//! Rule families and sources shared by the unit tests.

use crate::automaton::{Automaton, Family};
use crate::source::SymbolSource;

pub const KEYWORD_IF: usize = 0;
pub const IDENT: usize = 1;
pub const SPACE: usize = 2;

fn whitespace() -> Automaton {
    Automaton::builder(2)
        .name("space")
        .any_of(0, " \t\n", 1)
        .any_of(1, " \t\n", 1)
        .accept(1)
        .build()
        .unwrap()
}

/// `if`, then `[a-z]+`, then whitespace.
pub fn keyword_family() -> Family {
    let ident = Automaton::builder(2)
        .name("ident")
        .range(0, 'a'..='z', 1)
        .range(1, 'a'..='z', 1)
        .accept(1)
        .build()
        .unwrap();
    Family::new(vec![Automaton::literal("if", "if"), ident, whitespace()])
}

pub const NUMBER: usize = 0;
pub const NUM_SPACE: usize = 1;
pub const PAREN: usize = 2;

pub const SIGN: usize = 0;
pub const DIGITS: usize = 1;
pub const POINT: usize = 2;

/// The pieces of a number, for re-scanning a whole number literal.
pub fn number_parts() -> Family {
    let sign = Automaton::builder(2)
        .name("sign")
        .any_of(0, "+-", 1)
        .accept(1)
        .build()
        .unwrap();
    let digits = Automaton::builder(2)
        .name("digits")
        .range(0, '0'..='9', 1)
        .range(1, '0'..='9', 1)
        .accept(1)
        .build()
        .unwrap();
    Family::new(vec![sign, digits, Automaton::literal("point", ".")])
}

/// Numbers (`-12.5`), whitespace, and parentheses.
/// Numbers re-scan into their sign, digits, and decimal point.
pub fn number_family() -> Family {
    let number = Automaton::builder(5)
        .name("number")
        .any_of(0, "+-", 1)
        .range(0, '0'..='9', 2)
        .range(1, '0'..='9', 2)
        .range(2, '0'..='9', 2)
        .transition(2, '.', 3)
        .range(3, '0'..='9', 4)
        .range(4, '0'..='9', 4)
        .accept(2)
        .accept(4)
        .nested(number_parts())
        .build()
        .unwrap();
    let paren = Automaton::builder(2)
        .name("paren")
        .any_of(0, "()", 1)
        .accept(1)
        .build()
        .unwrap();
    Family::new(vec![number, whitespace(), paren])
}

/// Counts how many times it is asked for a symbol.
pub struct CountingSource {
    chars: std::vec::IntoIter<char>,
    pub calls: usize,
}

impl CountingSource {
    pub fn new(text: &str) -> Self {
        CountingSource {
            chars: text.chars().collect::<Vec<_>>().into_iter(),
            calls: 0,
        }
    }
}

impl SymbolSource for CountingSource {
    fn next_symbol(&mut self) -> std::io::Result<Option<char>> {
        self.calls += 1;
        Ok(self.chars.next())
    }
}

/// Yields some text, then fails.
pub struct FailingSource {
    chars: std::vec::IntoIter<char>,
}

impl FailingSource {
    pub fn after(text: &str) -> Self {
        FailingSource {
            chars: text.chars().collect::<Vec<_>>().into_iter(),
        }
    }
}

impl SymbolSource for FailingSource {
    fn next_symbol(&mut self) -> std::io::Result<Option<char>> {
        match self.chars.next() {
            Some(c) => Ok(Some(c)),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "input went away",
            )),
        }
    }
}
