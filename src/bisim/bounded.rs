use crate::kripke::State;
use crate::util::SparseSet;
use crate::within_budget;
use crate::Agent;
use crate::Depth;
use crate::World;
use std::collections::BTreeMap;

/// sentinel for "this world has no block at this stratum"
pub const NO_BLOCK: usize = usize::MAX;

/// Output of a depth-`k` stratified refinement.
///
/// `worlds_blocks[w][h]` is the arena index of the block holding `w` at
/// stratum `h`; strata are kept per level so the contraction builder can
/// look up a world's class at any remaining budget after the fact.
#[derive(Debug)]
pub struct Refinement {
    pub blocks: Vec<SparseSet>,
    pub worlds_blocks: Vec<Vec<usize>>,
    pub strata: Vec<Vec<usize>>,
}

/// Stratified partition refinement to depth `k`.
///
/// Stratum 0 partitions worlds by label; stratum h+1 refines stratum h
/// against the preimage of each of its blocks under every agent. Only
/// worlds that still have budget at a stratum are candidates to move.
/// Returns the refinement together with a flag telling whether the
/// final partition is a true bisimulation: the last two strata agree
/// and every reachable world sits strictly inside the depth budget.
pub fn refine(s: &State, k: Depth) -> (bool, Refinement) {
    let mut r = init(s, k);
    let preimage = init_preimage(s);
    let mut h = 0;
    while h < k {
        copy_stratum(s, k, h, &mut r);
        let splitters = r.strata[h].clone();
        for b in splitters {
            refine_stratum(s, k, h, b, &preimage, &mut r);
        }
        h += 1;
        if r.strata[h].len() == r.strata[h - 1].len() {
            break;
        }
    }
    while h < k {
        copy_stratum(s, k, h, &mut r);
        h += 1;
    }
    let stable = k > 0 && r.strata[k].len() == r.strata[k - 1].len();
    let is_bisim = stable && s.max_depth().saturating_add(1) < k;
    (is_bisim, r)
}

/// Stratum 0: group worlds within budget by their interned label id.
fn init(s: &State, k: Depth) -> Refinement {
    let mut blocks: Vec<SparseSet> = Vec::new();
    let mut worlds_blocks = vec![vec![NO_BLOCK; k + 1]; s.worlds()];
    let mut by_label: BTreeMap<usize, usize> = BTreeMap::new();
    for x in 0..s.worlds() {
        if s.depth(x) <= k {
            let b = *by_label.entry(s.label_id(x)).or_insert_with(|| {
                blocks.push(SparseSet::with_universe(s.worlds()));
                blocks.len() - 1
            });
            blocks[b].insert(x);
            worlds_blocks[x][0] = b;
        }
    }
    let mut strata = vec![Vec::new(); k + 1];
    strata[0] = by_label.into_values().collect();
    Refinement {
        blocks,
        worlds_blocks,
        strata,
    }
}

/// predecessor relation per agent, computed once up front
fn init_preimage(s: &State) -> Vec<Vec<SparseSet>> {
    let agents = s.language().agents();
    let mut preimage: Vec<Vec<SparseSet>> = (0..agents)
        .map(|_| {
            (0..s.worlds())
                .map(|_| SparseSet::with_universe(s.worlds()))
                .collect()
        })
        .collect();
    for (ag, r_1) in preimage.iter_mut().enumerate() {
        for w in 0..s.worlds() {
            for v in s.accessible(ag, w).iter() {
                r_1[v].insert(w);
            }
        }
    }
    preimage
}

/// Copy stratum h into h+1 so the h-blocks stay frozen for later
/// contraction lookups. The originals move up to h+1 (splits act there);
/// fresh copies take their place at h. A world keeps an h+1 entry only
/// while it still has budget to be split further.
fn copy_stratum(s: &State, k: Depth, h: Depth, r: &mut Refinement) {
    let originals = std::mem::take(&mut r.strata[h]);
    for &b in &originals {
        let copy = r.blocks.len();
        r.blocks.push(r.blocks[b].clone());
        let members: Vec<World> = r.blocks[b].iter().collect();
        for x in members {
            r.worlds_blocks[x][h] = copy;
            if within_budget(k, h, s.depth(x)) {
                r.worlds_blocks[x][h + 1] = b;
            }
        }
        r.strata[h].push(copy);
    }
    r.strata[h + 1] = originals;
}

/// Split stratum h+1 against block `b` of stratum h, once per agent.
fn refine_stratum(
    s: &State,
    k: Depth,
    h: Depth,
    b: usize,
    preimage: &[Vec<SparseSet>],
    r: &mut Refinement,
) {
    let splitter: Vec<World> = r.blocks[b].iter().collect();
    for ag in 0..s.language().agents() {
        let scan = predecessors(s, &splitter, preimage, ag);
        if !scan.is_empty() {
            split(s, k, h, &scan, r);
        }
    }
}

fn predecessors(s: &State, splitter: &[World], preimage: &[Vec<SparseSet>], ag: Agent) -> SparseSet {
    let mut scan = SparseSet::with_universe(s.worlds());
    for &y in splitter {
        for x in preimage[ag][y].iter() {
            scan.insert(x);
        }
    }
    scan
}

/// Partition every touched block of stratum h+1 into its members with a
/// predecessor in the splitter and the rest.
fn split(s: &State, k: Depth, h: Depth, scan: &SparseSet, r: &mut Refinement) {
    let mut carved: BTreeMap<usize, usize> = BTreeMap::new();
    for x in scan.iter() {
        if within_budget(k, h, s.depth(x)) {
            let d = r.worlds_blocks[x][h + 1];
            let d_new = *carved.entry(d).or_insert_with(|| {
                r.blocks.push(SparseSet::with_universe(s.worlds()));
                r.strata[h + 1].push(r.blocks.len() - 1);
                r.blocks.len() - 1
            });
            r.blocks[d_new].insert(x);
            r.blocks[d].remove(x);
            r.worlds_blocks[x][h + 1] = d_new;
        }
    }
    for (&d, _) in &carved {
        if r.blocks[d].is_empty() {
            r.strata[h + 1].retain(|&b| b != d);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kripke::relations;
    use crate::language::Label;
    use crate::language::Language;
    use crate::language::LabelStore;
    use std::sync::Arc;

    /// w0 -a-> w1 -a-> w2 with a self-loop on w2, identical labels
    fn looped_chain() -> State {
        let language = Arc::new(Language::new(&["p"], &["a"]));
        let mut store = LabelStore::new(1);
        let mut p = Label::new(1);
        p.assign(0, true);
        let p = store.emplace(p);
        let mut r = relations(1, 3);
        r[0][0].insert(1);
        r[0][1].insert(2);
        r[0][2].insert(2);
        State::new(
            language,
            3,
            r,
            vec![p.clone(), p.clone(), p],
            SparseSet::from((3, vec![0])),
        )
    }

    /// two worlds with distinct labels, all edges present
    fn two_tone() -> State {
        let language = Arc::new(Language::new(&["p"], &["a"]));
        let mut store = LabelStore::new(1);
        let mut p = Label::new(1);
        p.assign(0, true);
        let p = store.emplace(p);
        let q = store.emplace(Label::new(1));
        let mut r = relations(1, 2);
        for w in 0..2 {
            r[0][w].insert(0);
            r[0][w].insert(1);
        }
        State::new(language, 2, r, vec![p, q], SparseSet::from((2, vec![0])))
    }

    #[test]
    fn stratum_zero_groups_by_label() {
        let s = two_tone();
        let (_, r) = refine(&s, 0);
        assert_eq!(r.strata[0].len(), 2);
        assert_ne!(r.worlds_blocks[0][0], r.worlds_blocks[1][0]);
    }

    #[test]
    fn identical_labels_share_stratum_zero() {
        let s = looped_chain();
        let (_, r) = refine(&s, 0);
        assert_eq!(r.strata[0].len(), 1);
    }

    #[test]
    fn refinement_separates_by_remaining_budget() {
        let s = looped_chain();
        let (_, r) = refine(&s, 2);
        // at k = 2, w2 has no budget left at stratum 1 and stays behind
        // while w0 and w1 move together
        assert_eq!(r.strata[1].len(), 2);
        assert_eq!(r.worlds_blocks[0][1], r.worlds_blocks[1][1]);
        assert_ne!(r.worlds_blocks[0][1], r.worlds_blocks[2][1]);
    }

    #[test]
    fn fully_bisimilar_chains_never_split() {
        let s = looped_chain();
        // every world carries p and has a p-successor, so no stratum
        // with full budget can tell them apart
        let (_, r) = refine(&s, 3);
        assert_eq!(r.strata[1].len(), 1);
        assert_eq!(r.strata[3].len(), 1);
    }

    #[test]
    fn stable_refinements_of_shallow_states_are_bisimulations() {
        let s = two_tone();
        // max depth 1; at k = 3 the partition stabilizes with room to spare
        let (is_bisim, _) = refine(&s, 3);
        assert!(is_bisim);
        let (is_bisim, _) = refine(&s, 2);
        assert!(!is_bisim, "no slack below max depth + 2");
    }

    #[test]
    fn strata_are_successively_finer() {
        let s = looped_chain();
        let (_, r) = refine(&s, 4);
        for h in 0..4 {
            assert!(r.strata[h].len() <= r.strata[h + 1].len());
        }
    }
}
