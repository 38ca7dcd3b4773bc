use super::bounded;
use super::signature;
use super::Storages;
use crate::kripke::relations;
use crate::kripke::State;
use crate::language::Label;
use crate::util::SparseSet;
use crate::Depth;
use crate::World;
use fixedbitset::FixedBitSet;
use std::collections::BTreeSet;
use std::collections::VecDeque;

/// Rooted depth-`k` contraction of `s`.
///
/// Refines one stratum past `k`, picks a maximal representative per
/// reached block (smallest source depth, least world id on ties), and
/// emits the quotient over the chosen representatives. In canonical
/// mode the quotient additionally carries the interned state-level
/// fingerprint used for duplicate detection.
pub fn rooted(s: &State, k: Depth, canonical: bool, storages: &mut Storages) -> (bool, State) {
    let (is_bisim, refinement) = bounded::refine(s, k + 1);
    let (representative, represented) = max_representatives(s, k, &refinement);

    let chosen: BTreeSet<World> = represented.ones().map(|w| representative[w]).collect();
    let worlds = chosen.len();

    let mut renumber = vec![0; s.worlds()];
    let mut chosen_bits = FixedBitSet::with_capacity(s.worlds());
    let mut labels: Vec<Label> = Vec::with_capacity(worlds);
    for (count, &x) in chosen.iter().enumerate() {
        renumber[x] = count;
        chosen_bits.insert(x);
        labels.push(s.label(x).clone());
    }

    let agents = s.language().agents();
    let mut r = relations(agents, worlds);
    for &x in &chosen {
        let budget = match k.checked_sub(s.depth(x)) {
            Some(b) if b > 0 => b,
            _ => continue,
        };
        for (ag, r_ag) in r.iter_mut().enumerate() {
            for y in s.accessible(ag, x).iter() {
                if s.depth(y) <= k {
                    // the single target: the least representative inside
                    // y's class at x's remaining budget minus one
                    let class = refinement.worlds_blocks[y][budget - 1];
                    let mut members = chosen_bits.clone();
                    members.intersect_with(refinement.blocks[class].bits());
                    let target = members.ones().next().expect("a reached block holds a representative");
                    r_ag[renumber[x]].insert(renumber[target]);
                }
            }
        }
    }

    let mut designated = SparseSet::with_universe(worlds);
    for wd in s.designated().iter() {
        designated.insert(renumber[representative[wd]]);
    }

    let id = match canonical {
        true => signature::state_id(s, k, storages),
        false => 0,
    };

    let contracted = State::new(s.language().clone(), worlds, r, labels, designated).tag(id);
    (is_bisim, contracted)
}

/// BFS outward from the designated worlds in order of ascending depth.
/// The first time a block is reached, its member with the greatest
/// remaining budget becomes the representative of every still
/// unrepresented member.
fn max_representatives(s: &State, k: Depth, refinement: &bounded::Refinement) -> (Vec<World>, FixedBitSet) {
    let mut representative = vec![0; s.worlds()];
    let mut represented = FixedBitSet::with_capacity(s.worlds());
    let mut queue: VecDeque<World> = s.designated().iter().collect();

    while let Some(current) = queue.pop_front() {
        let class = refinement.worlds_blocks[current][k - s.depth(current)];
        let block = &refinement.blocks[class];
        let chosen = block
            .iter()
            .min_by_key(|&w| (s.depth(w), w))
            .expect("blocks are never empty");
        for w in block.iter() {
            if !represented.contains(w) {
                representative[w] = chosen;
                represented.insert(w);
            }
        }
        for ag in 0..s.language().agents() {
            for w in s.accessible(ag, current).iter() {
                if s.depth(w) <= k && !represented.contains(w) {
                    queue.push_back(w);
                }
            }
        }
    }
    (representative, represented)
}
