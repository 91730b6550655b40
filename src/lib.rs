//! A lexical scanning runtime for table-driven lexers.
//!
//! Rules are finite automata ([`Automaton`]), grouped by priority into a [`Family`].
//! A [`Scanner`] runs every rule of a family over the input in parallel and commits
//! the longest match (ties going to the earlier rule) as a [`Frame`].
//! A [`TokenStream`] lets a parser pull frames one at a time, and re-scan a frame's
//! text with that rule's nested family, if it has one.
//!
//! Where rules come from is up to the caller: build them in code with
//! [`Automaton::builder`], or load a [`FamilyDescription`] from TOML.

pub mod automaton;
pub mod config;
pub mod description;
pub mod error;
pub mod position;
pub mod scanner;
pub mod source;
pub mod stream;

#[cfg(feature = "render")]
pub mod render;

#[cfg(test)]
mod testing;

pub use automaton::{Automaton, AutomatonBuilder, Family};
pub use config::ScanOptions;
pub use description::FamilyDescription;
pub use error::{DefinitionError, DescriptionError, ScanError, StreamError};
pub use position::Position;
pub use scanner::{scan_str, Frame, ScanStats, Scanner};
pub use source::{ReadSource, StrSource, SymbolSource};
pub use stream::TokenStream;
