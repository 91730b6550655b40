//! Table-driven automata, one per lexical rule.
//!
//! An [`Automaton`] is a deterministic recognizer for a single rule.
//! State 0 is always the initial state. Transitions are stored per state as
//! sorted, non-overlapping symbol ranges, so a lookup is a binary search.
//!
//! Besides ordinary transitions, a state may carry:
//! -   a _start jump_, followed when a scan pass begins (before any symbol is read).
//!     This lets anchored or zero-width rules accept without consuming input.
//! -   an _end jump_, followed when the input runs out, so a rule can accept
//!     "at end of input" only.
//!
//! Automata are grouped into a [`Family`], where the position in the family
//! is the rule's priority (index 0 wins ties). An automaton may itself carry a
//! nested family, used to re-scan the text it matched.
//!
//! Everything here is immutable once built, and a `Family` is a cheap `Arc` clone;
//! share one between as many scans (and threads) as you like.

mod bitset;

use std::ops::RangeInclusive;
use std::sync::Arc;

pub use bitset::BitSet;

use crate::error::DefinitionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edge {
    lo: char,
    hi: char,
    to: usize,
}

/// A finite automaton recognizing one lexical rule.
#[derive(Debug, Clone)]
pub struct Automaton {
    name: Option<String>,
    accept: BitSet,
    /// Outbound edges, by state; each list sorted by `lo`, no overlaps.
    edges: Vec<Vec<Edge>>,
    start_jumps: Vec<Option<usize>>,
    end_jumps: Vec<Option<usize>>,
    nested: Family,
}

impl Automaton {
    /// Start describing an automaton with the given number of states.
    pub fn builder(states: usize) -> AutomatonBuilder {
        AutomatonBuilder {
            states,
            ..Default::default()
        }
    }

    /// An automaton that accepts exactly `text`.
    pub fn literal(name: impl Into<String>, text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let states = chars.len() + 1;
        let edges = chars
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                vec![Edge {
                    lo: c,
                    hi: c,
                    to: i + 1,
                }]
            })
            .chain(std::iter::once(Vec::new()))
            .collect();
        let mut accept = BitSet::with_capacity(states);
        accept.insert(chars.len());
        Automaton {
            name: Some(name.into()),
            accept,
            edges,
            start_jumps: vec![None; states],
            end_jumps: vec![None; states],
            nested: Family::empty(),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of states in this automaton.
    pub fn states(&self) -> usize {
        self.edges.len()
    }

    /// The state reached from `state` on `symbol`, if any.
    pub fn transition(&self, state: usize, symbol: char) -> Option<usize> {
        let edges = self.edges.get(state)?;
        let idx = edges.partition_point(|e| e.hi < symbol);
        edges
            .get(idx)
            .filter(|e| e.lo <= symbol)
            .map(|e| e.to)
    }

    /// All transitions out of `state`, in symbol order.
    pub fn transitions(&self, state: usize) -> impl '_ + Iterator<Item = (RangeInclusive<char>, usize)> {
        self.edges
            .get(state)
            .into_iter()
            .flatten()
            .map(|e| (e.lo..=e.hi, e.to))
    }

    pub fn is_accepting(&self, state: usize) -> bool {
        self.accept.contains(state)
    }

    pub fn accepting(&self) -> &BitSet {
        &self.accept
    }

    pub fn start_jump(&self, state: usize) -> Option<usize> {
        self.start_jumps.get(state).copied().flatten()
    }

    pub fn end_jump(&self, state: usize) -> Option<usize> {
        self.end_jumps.get(state).copied().flatten()
    }

    /// The family used to re-scan this automaton's matches.
    /// Empty if this rule's matches are not decomposed further.
    pub fn nested(&self) -> &Family {
        &self.nested
    }
}

/// Declarative construction of an [`Automaton`].
///
/// Nothing is checked until [`AutomatonBuilder::build`].
#[derive(Debug, Default)]
pub struct AutomatonBuilder {
    states: usize,
    name: Option<String>,
    accept: Vec<usize>,
    edges: Vec<(usize, Edge)>,
    start_jumps: Vec<(usize, usize)>,
    end_jumps: Vec<(usize, usize)>,
    nested: Option<Family>,
}

impl AutomatonBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark `state` as accepting.
    pub fn accept(mut self, state: usize) -> Self {
        self.accept.push(state);
        self
    }

    /// Add a transition on a single symbol.
    pub fn transition(self, from: usize, symbol: char, to: usize) -> Self {
        self.range(from, symbol..=symbol, to)
    }

    /// Add a transition on every symbol in `symbols`.
    pub fn range(mut self, from: usize, symbols: RangeInclusive<char>, to: usize) -> Self {
        let (lo, hi) = symbols.into_inner();
        self.edges.push((from, Edge { lo, hi, to }));
        self
    }

    /// Add a transition on each of the characters in `symbols`.
    pub fn any_of(mut self, from: usize, symbols: &str, to: usize) -> Self {
        for c in symbols.chars() {
            self = self.transition(from, c, to);
        }
        self
    }

    pub fn start_jump(mut self, from: usize, to: usize) -> Self {
        self.start_jumps.push((from, to));
        self
    }

    pub fn end_jump(mut self, from: usize, to: usize) -> Self {
        self.end_jumps.push((from, to));
        self
    }

    /// Re-scan this rule's matches with `family`.
    pub fn nested(mut self, family: Family) -> Self {
        self.nested = Some(family);
        self
    }

    pub fn build(self) -> Result<Automaton, DefinitionError> {
        let states = self.states;
        if states == 0 {
            return Err(DefinitionError::NoStates);
        }
        let check = |state: usize| {
            if state < states {
                Ok(state)
            } else {
                Err(DefinitionError::StateOutOfRange { state, states })
            }
        };

        let mut accept = BitSet::with_capacity(states);
        for state in self.accept {
            accept.insert(check(state)?);
        }

        let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); states];
        for (from, edge) in self.edges {
            check(from)?;
            check(edge.to)?;
            if edge.lo > edge.hi {
                return Err(DefinitionError::EmptyRange {
                    lo: edge.lo,
                    hi: edge.hi,
                });
            }
            edges[from].push(edge);
        }
        for (state, list) in edges.iter_mut().enumerate() {
            list.sort_by_key(|e| e.lo);
            // Identical duplicates are harmless; anything else overlapping is nondeterministic.
            list.dedup();
            if let Some(pair) = list.windows(2).find(|w| w[0].hi >= w[1].lo) {
                return Err(DefinitionError::Overlap {
                    state,
                    symbol: pair[1].lo,
                });
            }
        }

        let jumps = |list: Vec<(usize, usize)>,
                     kind: &'static str|
         -> Result<Vec<Option<usize>>, DefinitionError> {
            let mut table = vec![None; states];
            for (from, to) in list {
                let slot = &mut table[check(from)?];
                if slot.is_some() {
                    return Err(DefinitionError::DuplicateJump { state: from, kind });
                }
                *slot = Some(check(to)?);
            }
            Ok(table)
        };
        let start_jumps = jumps(self.start_jumps, "start")?;
        let end_jumps = jumps(self.end_jumps, "end")?;

        Ok(Automaton {
            name: self.name,
            accept,
            edges,
            start_jumps,
            end_jumps,
            nested: self.nested.unwrap_or_default(),
        })
    }
}

/// An ordered set of automata, tried in parallel.
///
/// Lower index means higher priority.
#[derive(Debug, Clone)]
pub struct Family {
    rules: Arc<[Automaton]>,
}

impl Default for Family {
    fn default() -> Self {
        Family::empty()
    }
}

impl Family {
    pub fn new(rules: Vec<Automaton>) -> Self {
        Family {
            rules: rules.into(),
        }
    }

    pub fn empty() -> Self {
        Family::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, rule: usize) -> Option<&Automaton> {
        self.rules.get(rule)
    }

    pub fn iter(&self) -> impl '_ + Iterator<Item = &Automaton> {
        self.rules.iter()
    }

    /// Index of the first rule with the given name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.rules.iter().position(|a| a.name() == Some(name))
    }
}

impl FromIterator<Automaton> for Family {
    fn from_iter<T: IntoIterator<Item = Automaton>>(iter: T) -> Self {
        Family::new(iter.into_iter().collect())
    }
}
