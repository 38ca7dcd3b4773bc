use crate::Atom;
use crate::LabelId;
use crate::NULL_LABEL;
use fixedbitset::FixedBitSet;

/// A propositional valuation: one bit per atom, plus the id the label
/// store assigned to this bit pattern.
///
/// Two labels are equal iff their bit patterns are; the id rides along
/// so interned labels can be compared and keyed in O(1).
#[derive(Debug, Clone)]
pub struct Label {
    id: LabelId,
    bits: FixedBitSet,
}

impl Label {
    /// all-false valuation over `width` atoms, not yet interned
    pub fn new(width: usize) -> Self {
        Self {
            id: NULL_LABEL,
            bits: FixedBitSet::with_capacity(width),
        }
    }

    pub fn id(&self) -> LabelId {
        self.id
    }

    pub fn bits(&self) -> &FixedBitSet {
        &self.bits
    }

    pub fn width(&self) -> usize {
        self.bits.len()
    }

    pub fn get(&self, p: Atom) -> bool {
        self.bits.contains(p)
    }

    pub fn assign(&mut self, p: Atom, value: bool) {
        self.bits.set(p, value);
        self.id = NULL_LABEL;
    }

    pub(crate) fn tagged(mut self, id: LabelId) -> Self {
        self.id = id;
        self
    }
}

impl From<FixedBitSet> for Label {
    fn from(bits: FixedBitSet) -> Self {
        Self {
            id: NULL_LABEL,
            bits,
        }
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl Eq for Label {}
