use fixedbitset::FixedBitSet;

/// A membership bitset kept in sync with a dense index list.
///
/// Bitwise queries (`contains`, intersections) go through the bitset,
/// iteration goes through the dense list, so both are cheap on the
/// small universes (tens to hundreds of elements) this crate deals in.
/// All mutation must go through this wrapper to keep the views aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseSet {
    bits: FixedBitSet,
    dense: Vec<usize>,
}

impl SparseSet {
    /// empty set over a universe of `n` indices
    pub fn with_universe(n: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(n),
            dense: Vec::new(),
        }
    }

    pub fn insert(&mut self, i: usize) {
        if !self.bits.contains(i) {
            self.bits.insert(i);
            self.dense.push(i);
        }
    }

    pub fn remove(&mut self, i: usize) {
        if self.bits.contains(i) {
            self.bits.set(i, false);
            let position = self
                .dense
                .iter()
                .position(|&x| x == i)
                .expect("dense list tracks bitset");
            self.dense.swap_remove(position);
        }
    }

    pub fn contains(&self, i: usize) -> bool {
        self.bits.contains(i)
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// iterate members in insertion order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.dense.iter().copied()
    }

    /// least member, if any
    pub fn first(&self) -> Option<usize> {
        self.bits.ones().next()
    }

    pub fn bits(&self) -> &FixedBitSet {
        &self.bits
    }

    /// number of indices in the universe
    pub fn universe(&self) -> usize {
        self.bits.len()
    }
}

impl From<(usize, Vec<usize>)> for SparseSet {
    fn from((n, members): (usize, Vec<usize>)) -> Self {
        let mut set = Self::with_universe(n);
        for i in members {
            set.insert(i);
        }
        set
    }
}

impl std::fmt::Display for SparseSet {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut members = self.dense.clone();
        members.sort_unstable();
        write!(f, "{{")?;
        for (i, m) in members.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", m)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut set = SparseSet::with_universe(8);
        set.insert(3);
        set.insert(3);
        assert_eq!(set.len(), 1);
        assert!(set.contains(3));
    }

    #[test]
    fn remove_keeps_views_aligned() {
        let mut set = SparseSet::from((8, vec![1, 4, 6]));
        set.remove(4);
        assert_eq!(set.len(), 2);
        assert!(!set.contains(4));
        assert!(!set.iter().any(|i| i == 4));
        set.remove(4);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn first_is_least_member() {
        let mut set = SparseSet::with_universe(8);
        set.insert(6);
        set.insert(2);
        set.insert(5);
        assert_eq!(set.first(), Some(2));
    }

    #[test]
    fn iteration_matches_membership() {
        let set = SparseSet::from((16, vec![0, 7, 15]));
        let mut seen: Vec<usize> = set.iter().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 7, 15]);
        assert_eq!(set.bits().count_ones(..), 3);
    }
}
