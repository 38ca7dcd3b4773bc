pub mod bounded;
pub mod contraction;
pub mod partition;
pub mod signature;

pub use signature::InfoStateStore;
pub use signature::SignatureStore;

use crate::kripke::relations;
use crate::kripke::State;
use crate::language::Label;
use crate::language::LabelStore;
use crate::util::SparseSet;
use crate::Depth;
use crate::World;

/// How successor states are canonicalized before entering the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contraction {
    /// full Paige-Tarjan quotient, exact at every depth
    Full,
    /// depth-bounded quotient rooted at the designated worlds
    Rooted,
    /// rooted quotient stamped with an interned fingerprint
    Canonical,
}

impl std::fmt::Display for Contraction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Full => write!(f, "full"),
            Self::Rooted => write!(f, "rooted"),
            Self::Canonical => write!(f, "canonical"),
        }
    }
}

/// The interning stores shared by everything in one planner run: labels,
/// world signatures and information states. Single-threaded by design;
/// the bundle is created by the caller and threaded through mutably.
#[derive(Debug)]
pub struct Storages {
    pub labels: LabelStore,
    pub signatures: SignatureStore,
    pub infostates: InfoStateStore,
}

impl Storages {
    /// fresh stores for a language with `atoms` propositional variables
    pub fn new(atoms: usize) -> Self {
        Self {
            labels: LabelStore::new(atoms),
            signatures: SignatureStore::new(),
            infostates: InfoStateStore::new(),
        }
    }
}

/// Contract `s` at depth `k` under the chosen mode. The boolean reports
/// whether the computed partition is a true bisimulation rather than
/// merely k-bounded (always true for the full mode).
pub fn contract(kind: Contraction, s: &State, k: Depth, storages: &mut Storages) -> (bool, State) {
    match kind {
        Contraction::Full => partition::contract(s),
        Contraction::Rooted => contraction::rooted(s, k, false, storages),
        Contraction::Canonical => contraction::rooted(s, k, true, storages),
    }
}

/// Decide k-bisimilarity of two pointed states directly: refine their
/// disjoint union and compare the designated blocks at stratum k.
/// Both states must carry labels interned in the same store, which is
/// the case for any two states of one task.
pub fn are_bisimilar(s: &State, t: &State, k: Depth) -> bool {
    let union = disjoint_union(s, t);
    let offset = s.worlds();
    let (_, refinement) = bounded::refine(&union, k);
    let matched = |wd: World, vd: World| {
        refinement.worlds_blocks[wd][k] == refinement.worlds_blocks[offset + vd][k]
    };
    s.designated()
        .iter()
        .all(|wd| t.designated().iter().any(|vd| matched(wd, vd)))
        && t.designated()
            .iter()
            .all(|vd| s.designated().iter().any(|wd| matched(wd, vd)))
}

/// side-by-side union with `t`'s worlds shifted past `s`'s
pub fn disjoint_union(s: &State, t: &State) -> State {
    let agents = s.language().agents();
    let worlds = s.worlds() + t.worlds();
    let offset = s.worlds();
    let mut r = relations(agents, worlds);
    for ag in 0..agents {
        for w in 0..s.worlds() {
            for v in s.accessible(ag, w).iter() {
                r[ag][w].insert(v);
            }
        }
        for w in 0..t.worlds() {
            for v in t.accessible(ag, w).iter() {
                r[ag][offset + w].insert(offset + v);
            }
        }
    }
    let mut labels: Vec<Label> = Vec::with_capacity(worlds);
    labels.extend((0..s.worlds()).map(|w| s.label(w).clone()));
    labels.extend((0..t.worlds()).map(|w| t.label(w).clone()));
    let mut designated = SparseSet::with_universe(worlds);
    for wd in s.designated().iter() {
        designated.insert(wd);
    }
    for vd in t.designated().iter() {
        designated.insert(offset + vd);
    }
    State::new(s.language().clone(), worlds, r, labels, designated)
}
