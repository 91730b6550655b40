//! Rule families described as data.
//!
//! A family description is a TOML document: an optional `[options]` table
//! (see [`ScanOptions`]) and a list of `[[rules]]`, highest priority first.
//! Each rule gives its state count and tables directly:
//!
//! ```toml
//! [options]
//! strict = false
//!
//! [[rules]]
//! name = "number"
//! states = 2
//! accept = [1]
//! transitions = [
//!     { from = 0, to = 1, range = ["0", "9"] },
//!     { from = 1, to = 1, range = ["0", "9"] },
//! ]
//!
//! [[rules]]
//! name = "paren"
//! states = 2
//! accept = [1]
//! transitions = [{ from = 0, to = 1, symbols = "()" }]
//! ```
//!
//! Jumps are `start_jumps = [[from, to], ...]` and `end_jumps = [[from, to], ...]`;
//! a rule's `nested` is itself a list of rules.

use serde::Deserialize;

use crate::automaton::{Automaton, Family};
use crate::config::ScanOptions;
use crate::error::DescriptionError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FamilyDescription {
    #[serde(default)]
    pub options: ScanOptions,
    #[serde(default)]
    pub rules: Vec<RuleDescription>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDescription {
    pub name: String,
    pub states: usize,
    #[serde(default)]
    pub accept: Vec<usize>,
    #[serde(default)]
    pub transitions: Vec<TransitionDescription>,
    #[serde(default)]
    pub start_jumps: Vec<(usize, usize)>,
    #[serde(default)]
    pub end_jumps: Vec<(usize, usize)>,
    #[serde(default)]
    pub nested: Vec<RuleDescription>,
}

/// Transitions from one state to another, on either each of `symbols`
/// or every symbol in the inclusive `range`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransitionDescription {
    pub from: usize,
    pub to: usize,
    pub symbols: Option<String>,
    pub range: Option<(char, char)>,
}

impl FamilyDescription {
    pub fn from_toml(text: &str) -> Result<Self, DescriptionError> {
        Ok(toml::from_str(text)?)
    }

    /// Build the family, checking every table.
    pub fn build(&self) -> Result<Family, DescriptionError> {
        build_rules(&self.rules)
    }
}

fn build_rules(rules: &[RuleDescription]) -> Result<Family, DescriptionError> {
    rules.iter().map(RuleDescription::build).collect()
}

impl RuleDescription {
    pub fn build(&self) -> Result<Automaton, DescriptionError> {
        let mut builder = Automaton::builder(self.states).name(&self.name);
        for &state in &self.accept {
            builder = builder.accept(state);
        }
        for t in &self.transitions {
            builder = match (&t.symbols, t.range) {
                (Some(symbols), None) => builder.any_of(t.from, symbols, t.to),
                (None, Some((lo, hi))) => builder.range(t.from, lo..=hi, t.to),
                _ => {
                    return Err(DescriptionError::AmbiguousSymbols {
                        rule: self.name.clone(),
                    })
                }
            };
        }
        for &(from, to) in &self.start_jumps {
            builder = builder.start_jump(from, to);
        }
        for &(from, to) in &self.end_jumps {
            builder = builder.end_jump(from, to);
        }
        if !self.nested.is_empty() {
            builder = builder.nested(build_rules(&self.nested)?);
        }
        tracing::trace!("building rule {:?} with {} states", self.name, self.states);
        builder.build().map_err(|source| DescriptionError::Rule {
            rule: self.name.clone(),
            source,
        })
    }
}
