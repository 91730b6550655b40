//! Error types for building automata and running scans.
//!
//! Only two things can go wrong once a scan is running:
//! the underlying input fails (fatal), or the consumer asks for something
//! the stream can't give it (also fatal, but the consumer's fault).
//! Input that no rule recognizes is *not* an error unless the scan was
//! configured as strict; see [`crate::ScanOptions::strict`].

use thiserror::Error;

use crate::position::Position;

/// A problem with an automaton table, found when building it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("automaton must have at least one state")]
    NoStates,

    #[error("state {state} is out of range for an automaton with {states} states")]
    StateOutOfRange { state: usize, states: usize },

    #[error("transition range {lo:?}..={hi:?} is empty")]
    EmptyRange { lo: char, hi: char },

    #[error("state {state} has overlapping transitions on {symbol:?}")]
    Overlap { state: usize, symbol: char },

    #[error("state {state} has more than one {kind} jump")]
    DuplicateJump { state: usize, kind: &'static str },
}

/// A problem with a serialized family description.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("could not parse family description: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("rule {rule:?}: {source}")]
    Rule {
        rule: String,
        #[source]
        source: DefinitionError,
    },

    #[error("rule {rule:?}: transition must give exactly one of `symbols` or `range`")]
    AmbiguousSymbols { rule: String },
}

/// A fatal failure while scanning a single level.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to read input: {0}")]
    Input(#[from] std::io::Error),

    #[error("unrecognized symbol {symbol:?} at {position}")]
    Unrecognized { symbol: char, position: Position },
}

/// A failure reported by [`crate::TokenStream::next`].
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("level {0} has already delivered its end-of-stream frame")]
    Exhausted(usize),

    #[error("level {0} is not open; levels must be opened one deeper at a time")]
    Unopened(usize),

    #[error("the most recent frame at level {0} has no nested rules to scan with")]
    NoNestedFamily(usize),

    #[error("nested scans are limited to a depth of {0}")]
    TooDeep(usize),

    #[error(transparent)]
    Scan(#[from] ScanError),
}
