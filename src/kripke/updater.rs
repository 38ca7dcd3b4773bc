use super::action::Action;
use super::checker;
use super::relations;
use super::state::State;
use crate::bisim;
use crate::bisim::Contraction;
use crate::bisim::Storages;
use crate::error::Error;
use crate::error::Result;
use crate::language::Label;
use crate::language::LabelStore;
use crate::util::SparseSet;
use crate::Depth;
use crate::Event;
use crate::World;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// a world of the updated structure is a (world, event) pair
type Pair = (World, Event);

/// `a` is applicable in `s` iff every designated world enables some
/// designated event.
pub fn is_applicable(s: &State, a: &Action) -> bool {
    s.designated().iter().all(|wd| is_applicable_world(s, a, wd))
}

fn is_applicable_world(s: &State, a: &Action, wd: World) -> bool {
    a.designated()
        .iter()
        .any(|ed| checker::holds_in(s, wd, a.pre(ed)))
}

/// Checked update: the recoverable face of `product_update`.
pub fn apply(s: &State, a: &Action, labels: &mut LabelStore) -> Result<State> {
    match is_applicable(s, a) {
        true => Ok(product_update(s, a, labels)),
        false => Err(Error::NotApplicable(a.name().to_string())),
    }
}

/// Left-to-right composition, contracting between applications when a
/// contraction policy is given. The same depth `k` is used throughout,
/// matching how the planner treats one node expansion.
pub fn execute(
    s: &State,
    actions: &[Arc<Action>],
    contraction: Option<(Contraction, Depth)>,
    storages: &mut Storages,
) -> Result<State> {
    let mut current = s.clone();
    for a in actions {
        current = apply(&current, a, &mut storages.labels)?;
        if let Some((kind, k)) = contraction {
            current = bisim::contract(kind, &current, k, storages).1;
        }
    }
    Ok(current)
}

/// The DEL product update. Callers are expected to have checked
/// applicability; without it the designated set of the result would be
/// empty, which a pointed model does not allow.
pub fn product_update(s: &State, a: &Action, labels: &mut LabelStore) -> State {
    let agents = s.language().agents();
    let mut edges: Vec<Vec<(Pair, Pair)>> = vec![Vec::new(); agents];
    let (pairs, designated) = explore(s, a, &mut edges);
    let worlds = pairs.len();
    let mut r = relations(agents, worlds);
    for (ag, ag_edges) in edges.iter().enumerate() {
        for ((w, e), (v, f)) in ag_edges {
            r[ag][pairs[&(*w, *e)]].insert(pairs[&(*v, *f)]);
        }
    }
    let mut quotient_labels = vec![Label::new(labels.width()); worlds];
    for (&(w, e), &id) in &pairs {
        quotient_labels[id] = match a.is_ontic(e) {
            true => rewrite(s, w, a, e, labels),
            false => s.label(w).clone(),
        };
    }
    State::new(
        s.language().clone(),
        worlds,
        r,
        quotient_labels,
        designated,
    )
}

/// BFS over satisfied (world, event) pairs from the designated ones,
/// numbering pairs in ascending (world, event) order of discovery and
/// recording every traversed edge per agent.
fn explore(s: &State, a: &Action, edges: &mut [Vec<(Pair, Pair)>]) -> (BTreeMap<Pair, World>, SparseSet) {
    let mut pairs: BTreeMap<Pair, World> = BTreeMap::new();
    let mut designated: Vec<World> = Vec::new();
    let mut pending: BTreeSet<Pair> = BTreeSet::new();
    let mut seen: BTreeSet<Pair> = BTreeSet::new();

    for wd in s.designated().iter() {
        for ed in a.designated().iter() {
            if checker::holds_in(s, wd, a.pre(ed)) {
                pending.insert((wd, ed));
            }
        }
    }

    while let Some(&(w, e)) = pending.iter().next() {
        pending.remove(&(w, e));
        let id = pairs.len();
        pairs.insert((w, e), id);
        seen.insert((w, e));

        if s.is_designated(w) && a.is_designated(e) {
            designated.push(id);
        }

        for (ag, ag_edges) in edges.iter_mut().enumerate() {
            for v in s.accessible(ag, w).iter() {
                for f in a.accessible(ag, e).iter() {
                    if checker::holds_in(s, v, a.pre(f)) {
                        ag_edges.push(((w, e), (v, f)));
                        if !seen.contains(&(v, f)) {
                            pending.insert((v, f));
                        }
                    }
                }
            }
        }
    }

    let worlds = pairs.len();
    (pairs, SparseSet::from((worlds, designated)))
}

/// flip every atom the event's postconditions mention to the value its
/// rewrite formula takes in the source world, then intern the result
fn rewrite(s: &State, w: World, a: &Action, e: Event, labels: &mut LabelStore) -> Label {
    let mut label = s.label(w).clone();
    for (&p, post) in a.post(e) {
        label.assign(p, checker::holds_in(s, w, post));
    }
    labels.emplace(label)
}
