/// A set of automaton states, as a bit set.
///
/// Automata in a lexer are small (tens of states, rarely hundreds),
/// so a flat vector of words is plenty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BitSet {
    count: usize,
    data: Vec<u64>,
}

impl BitSet {
    /// Creates a new, empty set.
    pub fn new() -> Self {
        Default::default()
    }

    const BITS_PER_WORD: usize = u64::BITS as usize;

    /// Creates an empty set that can hold states below `states` without growing.
    pub fn with_capacity(states: usize) -> Self {
        BitSet {
            count: 0,
            data: vec![0; states.div_ceil(Self::BITS_PER_WORD)],
        }
    }

    /// Whether `state` is in the set.
    pub fn contains(&self, state: usize) -> bool {
        let word = state / Self::BITS_PER_WORD;
        let bit = state % Self::BITS_PER_WORD;
        self.data
            .get(word)
            .map(|w| w & (1u64 << bit) != 0)
            .unwrap_or(false)
    }

    /// Adds `state` to the set.
    /// Returns true if it was not already present.
    pub fn insert(&mut self, state: usize) -> bool {
        let word = state / Self::BITS_PER_WORD;
        let bit = state % Self::BITS_PER_WORD;
        if word >= self.data.len() {
            self.data.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        if self.data[word] & mask != 0 {
            return false;
        }
        self.data[word] |= mask;
        self.count += 1;
        true
    }

    /// Number of states in the set.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over the states in the set, in ascending order.
    pub fn iter(&self) -> impl '_ + Iterator<Item = usize> {
        self.data.iter().enumerate().flat_map(|(idx, &word)| {
            (0..Self::BITS_PER_WORD)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| idx * Self::BITS_PER_WORD + bit)
        })
    }
}

impl FromIterator<usize> for BitSet {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut set = BitSet::new();
        for state in iter {
            set.insert(state);
        }
        set
    }
}
