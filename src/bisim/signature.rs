use super::Storages;
use crate::kripke::State;
use crate::Depth;
use crate::LabelId;
use crate::StateId;
use crate::World;
use std::collections::BTreeSet;
use std::collections::HashMap;

/// interned signature handle; 0 is reserved for "not yet computed"
pub type SignatureId = usize;

/// interned set of signatures; 0 is the empty set
pub type InfoStateId = usize;

/// What a world looks like to depth h: its label and, per agent, the
/// interned set of depth-(h-1) signatures of the accessible worlds.
/// Signature equality is id equality, so two worlds are h-bisimilar
/// exactly when their depth-h signatures intern to the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    pub label: LabelId,
    pub seen: Vec<InfoStateId>,
}

/// deduplicating store of signatures, ids dense from 1
#[derive(Debug, Default)]
pub struct SignatureStore {
    ids: HashMap<Signature, SignatureId>,
    len: usize,
}

impl SignatureStore {
    pub fn new() -> Self {
        Self {
            ids: HashMap::new(),
            len: 0,
        }
    }

    pub fn emplace(&mut self, signature: Signature) -> SignatureId {
        match self.ids.get(&signature) {
            Some(&id) => id,
            None => {
                self.len += 1;
                self.ids.insert(signature, self.len);
                self.len
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// deduplicating store of ordered signature sets, seeded with the
/// empty set at id 0
#[derive(Debug)]
pub struct InfoStateStore {
    ids: HashMap<Vec<SignatureId>, InfoStateId>,
    len: usize,
}

impl InfoStateStore {
    pub fn new() -> Self {
        let mut ids = HashMap::new();
        ids.insert(Vec::new(), 0);
        Self { ids, len: 1 }
    }

    pub fn emplace(&mut self, set: BTreeSet<SignatureId>) -> InfoStateId {
        let key: Vec<SignatureId> = set.into_iter().collect();
        match self.ids.get(&key) {
            Some(&id) => id,
            None => {
                let id = self.len;
                self.len += 1;
                self.ids.insert(key, id);
                id
            }
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }
}

impl Default for InfoStateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Canonical fingerprint of `s` at depth `k`: the interned set of the
/// designated worlds' depth-k signatures. Two states get the same id
/// iff they are k-bisimilar, provided they share one storages bundle.
pub fn state_id(s: &State, k: Depth, storages: &mut Storages) -> StateId {
    let mut memo = vec![vec![0; s.worlds()]; k + 1];
    let mut designated: BTreeSet<SignatureId> = BTreeSet::new();
    for wd in s.designated().iter() {
        designated.insert(world_signature(s, wd, k, storages, &mut memo));
    }
    storages.infostates.emplace(designated)
}

/// depth-h signature of world `x`, memoized per (world, depth)
fn world_signature(
    s: &State,
    x: World,
    h: Depth,
    storages: &mut Storages,
    memo: &mut Vec<Vec<SignatureId>>,
) -> SignatureId {
    let agents = s.language().agents();
    let mut seen = vec![0; agents];
    if h > 0 {
        for (ag, slot) in seen.iter_mut().enumerate() {
            let mut outlook: BTreeSet<SignatureId> = BTreeSet::new();
            let successors: Vec<World> = s.accessible(ag, x).iter().collect();
            for y in successors {
                let id = match memo[h - 1][y] {
                    0 => world_signature(s, y, h - 1, storages, memo),
                    id => id,
                };
                outlook.insert(id);
            }
            *slot = storages.infostates.emplace(outlook);
        }
    }
    let id = storages.signatures.emplace(Signature {
        label: s.label_id(x),
        seen,
    });
    memo[h][x] = id;
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bisim;
    use crate::kripke::relations;
    use crate::language::Label;
    use crate::language::Language;
    use crate::util::SparseSet;
    use std::sync::Arc;

    fn lang() -> Arc<Language> {
        Arc::new(Language::new(&["p"], &["a"]))
    }

    fn labels(storages: &mut Storages, bits: &[bool]) -> Vec<Label> {
        bits.iter()
            .map(|&b| {
                let mut l = Label::new(1);
                l.assign(0, b);
                storages.labels.emplace(l)
            })
            .collect()
    }

    /// w0 -> w1 -> w2 with a loop at w2
    fn looped_chain(storages: &mut Storages) -> State {
        let ls = labels(storages, &[true, true, true]);
        let mut r = relations(1, 3);
        r[0][0].insert(1);
        r[0][1].insert(2);
        r[0][2].insert(2);
        State::new(lang(), 3, r, ls, SparseSet::from((3, vec![0])))
    }

    /// the single self-loop world
    fn point(storages: &mut Storages) -> State {
        let ls = labels(storages, &[true]);
        let mut r = relations(1, 1);
        r[0][0].insert(0);
        State::new(lang(), 1, r, ls, SparseSet::from((1, vec![0])))
    }

    #[test]
    fn identical_states_share_ids_at_every_depth() {
        let mut storages = Storages::new(1);
        let s = looped_chain(&mut storages);
        let t = looped_chain(&mut storages);
        for k in 0..4 {
            assert_eq!(
                state_id(&s, k, &mut storages),
                state_id(&t, k, &mut storages)
            );
        }
    }

    #[test]
    fn ids_agree_with_bisimilarity() {
        let mut storages = Storages::new(1);
        let s = looped_chain(&mut storages);
        let t = point(&mut storages);
        for k in 0..4 {
            let same_id = state_id(&s, k, &mut storages) == state_id(&t, k, &mut storages);
            assert_eq!(same_id, bisim::are_bisimilar(&s, &t, k), "k={}", k);
        }
    }

    #[test]
    fn label_differences_show_up_at_depth_zero() {
        let mut storages = Storages::new(1);
        let s = point(&mut storages);
        let ls = labels(&mut storages, &[false]);
        let mut r = relations(1, 1);
        r[0][0].insert(0);
        let t = State::new(lang(), 1, r, ls, SparseSet::from((1, vec![0])));
        assert_ne!(
            state_id(&s, 0, &mut storages),
            state_id(&t, 0, &mut storages)
        );
    }

    #[test]
    fn depth_separates_what_labels_cannot() {
        let mut storages = Storages::new(1);
        // p-world pointing at a non-p sink versus a pure p-point
        let ls = labels(&mut storages, &[true, false]);
        let mut r = relations(1, 2);
        r[0][0].insert(1);
        let s = State::new(lang(), 2, r, ls, SparseSet::from((2, vec![0])));
        let t = point(&mut storages);
        assert_eq!(
            state_id(&s, 0, &mut storages),
            state_id(&t, 0, &mut storages)
        );
        assert_ne!(
            state_id(&s, 1, &mut storages),
            state_id(&t, 1, &mut storages)
        );
    }
}
