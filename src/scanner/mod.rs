//! The parallel scan driver.
//!
//! A [`Scanner`] runs every automaton of a [`Family`] over the input at once,
//! one symbol at a time, remembering the best match seen so far
//! (see [`resolve`]). When every automaton is stuck, or input runs out,
//! it commits the best match as a [`Frame`] and starts over on what remains.
//!
//! Roughly, per frame:
//!
//! 1.  Start each automaton at state 0 and follow its start jumps.
//!     An accepting state reached that way is a zero-width match.
//! 2.  Feed the next symbol (from the buffer if we've already read it, else
//!     from the source) to every live automaton. Those without a transition
//!     drop out; those that land in an accepting state offer a match.
//! 3.  At end of input, follow each live automaton's end jumps, which may
//!     also offer a match.
//! 4.  Commit the best match, or if there isn't one, skip a single symbol.
//!
//! Anything read past the committed match stays in the buffer for the next pass;
//! the source is never asked for the same symbol twice.

mod resolve;

use std::collections::VecDeque;

pub use resolve::{resolve, MatchCandidate};

use crate::automaton::{Automaton, BitSet, Family};
use crate::config::ScanOptions;
use crate::error::ScanError;
use crate::position::Position;
use crate::source::{StrSource, SymbolSource};

/// One token, or the end of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Index of the matching rule in its family; `None` marks end-of-stream.
    pub rule: Option<usize>,
    pub text: String,
    /// Position of the first symbol of `text`.
    pub line: usize,
    pub column: usize,
}

impl Frame {
    fn sentinel(at: Position) -> Self {
        Frame {
            rule: None,
            text: String::new(),
            line: at.line,
            column: at.column,
        }
    }

    /// Whether this is the end-of-stream frame.
    pub fn is_sentinel(&self) -> bool {
        self.rule.is_none()
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.rule {
            Some(rule) => write!(f, "{}:{} #{} {:?}", self.line + 1, self.column + 1, rule, self.text),
            None => write!(f, "{}:{} end", self.line + 1, self.column + 1),
        }
    }
}

/// Counters for a single scan level.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    /// Frames committed, not counting the end-of-stream frame.
    pub frames: usize,
    /// Symbols dropped because no rule matched them.
    pub skipped: usize,
    /// Symbols committed to frames.
    pub symbols: usize,
}

/// Scans one source with one family.
///
/// As an iterator, yields each frame in input order, ending with the
/// end-of-stream frame; after that (or after an error) it yields nothing.
pub struct Scanner<S> {
    family: Family,
    source: S,
    options: ScanOptions,

    buffer: VecDeque<char>,
    eof: bool,
    position: Position,
    /// Offset of the last zero-width commit. Another one there would never progress.
    zero_width_at: Option<usize>,
    stats: ScanStats,
    done: bool,
}

impl<S: SymbolSource> Scanner<S> {
    pub fn new(family: Family, source: S) -> Self {
        Self::with_options(family, source, ScanOptions::default())
    }

    pub fn with_options(family: Family, source: S, options: ScanOptions) -> Self {
        Scanner {
            family,
            source,
            options,
            buffer: VecDeque::new(),
            eof: false,
            position: Position::default(),
            zero_width_at: None,
            stats: ScanStats::default(),
            done: false,
        }
    }

    pub fn family(&self) -> &Family {
        &self.family
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Position of the first uncommitted symbol.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Produce the next frame, skipping unrecognized input as needed.
    fn next_frame(&mut self) -> Result<Frame, ScanError> {
        loop {
            let best = self.scan_pass()?;
            if let Some(frame) = self.settle(best)? {
                return Ok(frame);
            }
        }
    }

    /// Run every automaton from its start state until all are stuck or input runs out.
    /// Returns the best match found.
    fn scan_pass(&mut self) -> Result<Option<MatchCandidate>, ScanError> {
        let family = self.family.clone();
        let zero_width_ok = self.zero_width_at != Some(self.position.offset);
        let mut best = None;

        let mut live: Vec<(usize, usize)> = family
            .iter()
            .enumerate()
            .map(|(rule, automaton)| {
                let state = follow_start_jumps(automaton, |state| {
                    if zero_width_ok && automaton.is_accepting(state) {
                        resolve(&mut best, rule, 0);
                    }
                });
                (rule, state)
            })
            .collect();

        let mut consumed = 0;
        while !live.is_empty() {
            let symbol = match self.buffer.get(consumed) {
                Some(&c) => c,
                None if self.eof => break,
                None => match self.source.next_symbol()? {
                    Some(c) => {
                        self.buffer.push_back(c);
                        c
                    }
                    None => {
                        self.eof = true;
                        break;
                    }
                },
            };
            consumed += 1;

            live.retain_mut(|(rule, state)| {
                let Some(automaton) = family.get(*rule) else {
                    return false;
                };
                match automaton.transition(*state, symbol) {
                    Some(next) => {
                        *state = next;
                        if automaton.is_accepting(next) {
                            resolve(&mut best, *rule, consumed);
                        }
                        true
                    }
                    None => false,
                }
            });
        }

        // Anything still alive has seen all of the input.
        if self.eof && !self.buffer.is_empty() {
            for &(rule, state) in live.iter() {
                if let Some(automaton) = family.get(rule) {
                    if follow_end_jumps(automaton, state) {
                        resolve(&mut best, rule, consumed);
                    }
                }
            }
        }

        Ok(best)
    }

    /// Commit the result of a pass: emit a frame, skip a symbol, or finish.
    /// `None` means "skipped; go again".
    fn settle(&mut self, best: Option<MatchCandidate>) -> Result<Option<Frame>, ScanError> {
        if let Some(MatchCandidate { rule, len }) = best {
            let start = self.position;
            let symbols: Vec<char> = self.buffer.drain(..len).collect();
            self.position
                .advance_all(&symbols, self.options.line_terminator);
            if len == 0 {
                self.zero_width_at = Some(start.offset);
            }
            self.stats.frames += 1;
            self.stats.symbols += len;

            let frame = Frame {
                rule: Some(rule),
                text: symbols.into_iter().collect(),
                line: start.line,
                column: start.column,
            };
            tracing::trace!("commit {frame}");
            return Ok(Some(frame));
        }

        // Nothing matched. With an empty family we may not have read anything yet.
        if self.buffer.is_empty() && !self.eof {
            match self.source.next_symbol()? {
                Some(c) => self.buffer.push_back(c),
                None => self.eof = true,
            }
        }

        match self.buffer.pop_front() {
            Some(symbol) => {
                let at = self.position;
                if self.options.strict {
                    return Err(ScanError::Unrecognized {
                        symbol,
                        position: at,
                    });
                }
                tracing::debug!("skipping unrecognized symbol {symbol:?} at {at}");
                self.position.advance(symbol, self.options.line_terminator);
                self.stats.skipped += 1;
                Ok(None)
            }
            None => {
                tracing::debug!(
                    frames = self.stats.frames,
                    skipped = self.stats.skipped,
                    symbols = self.stats.symbols,
                    "end of scan at {}",
                    self.position
                );
                Ok(Some(Frame::sentinel(self.position)))
            }
        }
    }
}

/// Follow start jumps from state 0, reporting each state jumped to.
/// Returns the state the automaton ends up in.
fn follow_start_jumps(automaton: &Automaton, mut visit: impl FnMut(usize)) -> usize {
    let mut state = 0;
    if automaton.start_jump(state).is_none() {
        return state;
    }
    let mut visited = BitSet::with_capacity(automaton.states());
    visited.insert(state);
    while let Some(next) = automaton.start_jump(state) {
        if !visited.insert(next) {
            break;
        }
        state = next;
        visit(state);
    }
    state
}

/// Follow end jumps from `state`; true if an accepting state is reached.
fn follow_end_jumps(automaton: &Automaton, mut state: usize) -> bool {
    if automaton.end_jump(state).is_none() {
        return false;
    }
    let mut visited = BitSet::with_capacity(automaton.states());
    visited.insert(state);
    while let Some(next) = automaton.end_jump(state) {
        if !visited.insert(next) {
            return false;
        }
        if automaton.is_accepting(next) {
            return true;
        }
        state = next;
    }
    false
}

impl<S: SymbolSource> Iterator for Scanner<S> {
    type Item = Result<Frame, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let result = self.next_frame();
        self.done = match &result {
            Ok(frame) => frame.is_sentinel(),
            Err(_) => true,
        };
        Some(result)
    }
}

impl<S: SymbolSource> std::iter::FusedIterator for Scanner<S> {}

/// Scan `text` to completion, returning every frame (including the end-of-stream frame).
pub fn scan_str(family: &Family, text: &str) -> Result<Vec<Frame>, ScanError> {
    Scanner::new(family.clone(), StrSource::new(text)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn tokens(frames: &[Frame]) -> Vec<(Option<usize>, &str, usize, usize)> {
        frames
            .iter()
            .map(|f| (f.rule, f.text.as_str(), f.line, f.column))
            .collect()
    }

    #[test]
    fn longest_match_beats_keyword() -> Result<(), ScanError> {
        let frames = scan_str(&keyword_family(), "iffy")?;
        assert_eq!(
            tokens(&frames),
            vec![(Some(IDENT), "iffy", 0, 0), (None, "", 0, 4)]
        );
        Ok(())
    }

    #[test]
    fn keyword_wins_tie() -> Result<(), ScanError> {
        let frames = scan_str(&keyword_family(), "if")?;
        assert_eq!(
            tokens(&frames),
            vec![(Some(KEYWORD_IF), "if", 0, 0), (None, "", 0, 2)]
        );
        Ok(())
    }

    #[test]
    fn whitespace_between_identifiers() -> Result<(), ScanError> {
        let frames = scan_str(&keyword_family(), "a b")?;
        assert_eq!(
            tokens(&frames),
            vec![
                (Some(IDENT), "a", 0, 0),
                (Some(SPACE), " ", 0, 1),
                (Some(IDENT), "b", 0, 2),
                (None, "", 0, 3),
            ]
        );
        Ok(())
    }

    #[test]
    fn lines_and_columns() -> Result<(), ScanError> {
        let frames = scan_str(&keyword_family(), "if x\n  y\n")?;
        assert_eq!(
            tokens(&frames),
            vec![
                (Some(KEYWORD_IF), "if", 0, 0),
                (Some(SPACE), " ", 0, 2),
                (Some(IDENT), "x", 0, 3),
                (Some(SPACE), "\n  ", 0, 4),
                (Some(IDENT), "y", 1, 2),
                (Some(SPACE), "\n", 1, 3),
                (None, "", 2, 0),
            ]
        );
        // Line numbers never go backwards.
        assert!(frames.windows(2).all(|w| w[0].line <= w[1].line));
        Ok(())
    }

    #[test]
    fn skips_unrecognized_symbols() -> Result<(), ScanError> {
        let mut scanner = Scanner::new(keyword_family(), StrSource::new("ab#%cd"));
        let frames: Vec<Frame> = scanner.by_ref().collect::<Result<_, _>>()?;
        assert_eq!(
            tokens(&frames),
            vec![
                (Some(IDENT), "ab", 0, 0),
                (Some(IDENT), "cd", 0, 4),
                (None, "", 0, 6),
            ]
        );
        assert_eq!(
            scanner.stats(),
            ScanStats {
                frames: 2,
                skipped: 2,
                symbols: 4
            }
        );
        assert!(scanner.next().is_none());
        Ok(())
    }

    #[test]
    fn progress_with_nothing_to_match() -> Result<(), ScanError> {
        for family in [Family::empty(), keyword_family()] {
            let mut scanner = Scanner::new(family, StrSource::new("1234"));
            let frames: Vec<Frame> = scanner.by_ref().collect::<Result<_, _>>()?;
            assert_eq!(tokens(&frames), vec![(None, "", 0, 4)]);
            assert_eq!(scanner.stats().skipped, 4);
        }
        Ok(())
    }

    #[test]
    fn empty_input() -> Result<(), ScanError> {
        let frames = scan_str(&keyword_family(), "")?;
        assert_eq!(tokens(&frames), vec![(None, "", 0, 0)]);
        Ok(())
    }

    #[test]
    fn lookahead_is_rescanned_not_reread() -> Result<(), ScanError> {
        // "abc" reads ahead through "ab" and then fails on "x";
        // the "b" it read is still there for the next pass.
        let family = Family::new(vec![
            Automaton::literal("abc", "abc"),
            Automaton::literal("b", "b"),
        ]);
        let mut source = CountingSource::new("abx");
        let frames: Vec<Frame> = Scanner::new(family, &mut source).collect::<Result<_, _>>()?;
        assert_eq!(
            tokens(&frames),
            vec![(Some(1), "b", 0, 1), (None, "", 0, 3)]
        );
        // Three symbols, plus the one call that found end-of-input.
        assert_eq!(source.calls, 4);
        Ok(())
    }

    #[test]
    fn start_jump_enters_automaton() -> Result<(), ScanError> {
        let anchored = Automaton::builder(3)
            .start_jump(0, 1)
            .transition(1, 'x', 2)
            .accept(2)
            .build()
            .unwrap();
        let frames = scan_str(&Family::new(vec![anchored]), "xx")?;
        assert_eq!(
            tokens(&frames),
            vec![(Some(0), "x", 0, 0), (Some(0), "x", 0, 1), (None, "", 0, 2)]
        );
        Ok(())
    }

    #[test]
    fn zero_width_match_fires_once_per_offset() -> Result<(), ScanError> {
        let marker = Automaton::builder(2)
            .start_jump(0, 1)
            .accept(1)
            .build()
            .unwrap();
        let family = Family::new(vec![marker, Automaton::literal("a", "a")]);
        let frames = scan_str(&family, "a?")?;
        assert_eq!(
            tokens(&frames),
            vec![
                // The longer match wins over the marker...
                (Some(1), "a", 0, 0),
                // ...and then fires once at each later offset, the end included.
                (Some(0), "", 0, 1),
                (Some(0), "", 0, 2),
                (None, "", 0, 2),
            ]
        );
        Ok(())
    }

    #[test]
    fn end_jump_accepts_at_end_only() -> Result<(), ScanError> {
        let trailing_a = Automaton::builder(3)
            .transition(0, 'a', 1)
            .end_jump(1, 2)
            .accept(2)
            .build()
            .unwrap();
        let family = Family::new(vec![trailing_a, Automaton::literal("a", "a")]);
        let frames = scan_str(&family, "aa")?;
        assert_eq!(
            tokens(&frames),
            vec![(Some(1), "a", 0, 0), (Some(0), "a", 0, 1), (None, "", 0, 2)]
        );
        Ok(())
    }

    #[test]
    fn end_jump_cycle_terminates() -> Result<(), ScanError> {
        let looping = Automaton::builder(3)
            .transition(0, 'a', 1)
            .end_jump(1, 2)
            .end_jump(2, 1)
            .accept(0)
            .build()
            .unwrap();
        let frames = scan_str(&Family::new(vec![looping]), "a")?;
        assert_eq!(tokens(&frames), vec![(None, "", 0, 1)]);
        Ok(())
    }

    #[test]
    fn jump_chains() {
        let plain = Automaton::literal("ab", "ab");
        let mut visits = Vec::new();
        assert_eq!(follow_start_jumps(&plain, |s| visits.push(s)), 0);
        assert!(visits.is_empty());
        assert!(!follow_end_jumps(&plain, 1));

        let chained = Automaton::builder(4)
            .start_jump(0, 1)
            .start_jump(1, 2)
            .start_jump(2, 1)
            .end_jump(3, 2)
            .accept(2)
            .build()
            .unwrap();
        assert_eq!(follow_start_jumps(&chained, |s| visits.push(s)), 2);
        assert_eq!(visits, vec![1, 2]);
        assert!(follow_end_jumps(&chained, 3));
        assert!(!follow_end_jumps(&chained, 0));
    }

    #[test]
    fn strict_mode_reports_skips() {
        let options = ScanOptions {
            strict: true,
            ..Default::default()
        };
        let mut scanner =
            Scanner::with_options(keyword_family(), StrSource::new("ok\n ?"), options);
        assert_eq!(scanner.next().unwrap().unwrap().text, "ok");
        assert_eq!(scanner.next().unwrap().unwrap().text, "\n ");
        let err = match scanner.next() {
            Some(Err(err)) => err,
            other => panic!("expected unrecognized-symbol error, got {other:?}"),
        };
        match &err {
            ScanError::Unrecognized { symbol, position } => {
                assert_eq!(*symbol, '?');
                assert_eq!((position.line, position.column, position.offset), (1, 1, 4));
            }
            other => panic!("expected unrecognized-symbol error, got {other:?}"),
        }
        assert_eq!(err.to_string(), "unrecognized symbol '?' at line 2, column 2");
        assert!(scanner.next().is_none());
    }

    #[test]
    fn input_failure_is_fatal() {
        let mut scanner = Scanner::new(keyword_family(), FailingSource::after("ab "));
        assert_eq!(scanner.next().unwrap().unwrap().text, "ab");
        assert!(matches!(scanner.next(), Some(Err(ScanError::Input(_)))));
        assert!(scanner.next().is_none());
    }

    #[test]
    fn identifiers_agree_with_regex() -> Result<(), ScanError> {
        let input = "the quick-brown fox\njumps over 12 lazy_dogs; if iffy if";
        let want: Vec<&str> = regex::Regex::new("[a-z]+")
            .unwrap()
            .find_iter(input)
            .map(|m| m.as_str())
            .collect();
        let frames = scan_str(&keyword_family(), input)?;
        let got: Vec<&str> = frames
            .iter()
            .filter(|f| f.rule == Some(IDENT) || f.rule == Some(KEYWORD_IF))
            .map(|f| f.text.as_str())
            .collect();
        assert_eq!(got, want);
        Ok(())
    }

    #[test]
    fn family_is_shared_across_threads() {
        let family = keyword_family();
        let inputs = ["if a", "iffy b c", "x\ny\nz", ""];
        let counts: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = inputs
                .iter()
                .map(|input| {
                    let family = &family;
                    s.spawn(move || scan_str(family, input).map(|f| f.len()))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap().unwrap())
                .collect()
        });
        assert_eq!(counts, vec![4, 6, 6, 1]);
    }
}
