//! Choosing between competing matches.

/// The best match seen so far in one scan pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate {
    /// Index of the rule in its family.
    pub rule: usize,
    /// Length of the match, in symbols.
    pub len: usize,
}

impl MatchCandidate {
    /// Whether a new accept of `rule` at `len` displaces this one:
    /// longer wins, and at equal length the lower (higher-priority) index wins.
    pub fn loses_to(&self, rule: usize, len: usize) -> bool {
        len > self.len || (len == self.len && rule < self.rule)
    }
}

/// Record that `rule` accepted at `len`, keeping whichever match should win.
///
/// Call this once per accepting transition, in any order;
/// the outcome doesn't depend on the order rules are visited.
pub fn resolve(best: &mut Option<MatchCandidate>, rule: usize, len: usize) {
    match best {
        Some(current) if !current.loses_to(rule, len) => {}
        _ => *best = Some(MatchCandidate { rule, len }),
    }
}
