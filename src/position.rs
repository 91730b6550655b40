//! Line/column bookkeeping for committed input.

/// A position in the input stream.
///
/// Lines and columns are counted from 0; add one when showing them to a person.
/// The scanner only advances a `Position` over symbols it has committed
/// (to a token, or to a recovery skip), never over lookahead.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    /// Number of symbols (not bytes) consumed so far.
    pub offset: usize,
}

impl Position {
    /// Advance over a single symbol.
    pub fn advance(&mut self, symbol: char, line_terminator: char) {
        self.offset += 1;
        if symbol == line_terminator {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    /// Advance over each of the symbols in turn.
    pub fn advance_all<'a>(
        &mut self,
        symbols: impl IntoIterator<Item = &'a char>,
        line_terminator: char,
    ) {
        for &c in symbols {
            self.advance(c, line_terminator);
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line + 1, self.column + 1)
    }
}
