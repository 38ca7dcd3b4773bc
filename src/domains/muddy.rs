use super::events;
use crate::bisim::Storages;
use crate::kripke::relations;
use crate::kripke::Action;
use crate::kripke::State;
use crate::language::Label;
use crate::language::Language;
use crate::logic::Formula;
use crate::search::Task;
use crate::util::SparseSet;
use std::sync::Arc;

const CHILDREN: usize = 3;

/// Muddy children with three children, all of them muddy. Each child
/// sees the others' foreheads but not their own, and it is common
/// knowledge that at least one is muddy (the all-clean world is absent
/// from the start). Announcing twice that a child is still undecided
/// lets the third one conclude it must be muddy itself.
pub fn build() -> (Task, Storages) {
    let atom_names: Vec<String> = (1..=CHILDREN).map(|i| format!("muddy_{}", i)).collect();
    let agent_names: Vec<String> = (1..=CHILDREN).map(|i| format!("child_{}", i)).collect();
    let atom_refs: Vec<&str> = atom_names.iter().map(|s| s.as_str()).collect();
    let agent_refs: Vec<&str> = agent_names.iter().map(|s| s.as_str()).collect();
    let language = Arc::new(Language::new(&atom_refs, &agent_refs));
    let mut storages = Storages::new(language.atoms());

    // one world per non-empty subset of muddy children
    let masks: Vec<usize> = (1..1 << CHILDREN).collect();
    let worlds = masks.len();
    let mut labels = Vec::with_capacity(worlds);
    for &mask in &masks {
        let mut label = Label::new(language.atoms());
        for child in 0..CHILDREN {
            label.assign(child, mask & (1 << child) != 0);
        }
        labels.push(storages.labels.emplace(label));
    }

    // a child relates worlds that agree on every other forehead
    let mut r = relations(language.agents(), worlds);
    for child in 0..CHILDREN {
        let blind = !(1 << child);
        for (w, &mask_w) in masks.iter().enumerate() {
            for (v, &mask_v) in masks.iter().enumerate() {
                if mask_w & blind == mask_v & blind {
                    r[child][w].insert(v);
                }
            }
        }
    }

    let everyone_muddy = worlds - 1;
    let initial = State::new(
        language.clone(),
        worlds,
        r,
        labels,
        SparseSet::from((worlds, vec![everyone_muddy])),
    );

    // "child i still does not know whether it is muddy"
    let actions: Vec<Arc<Action>> = (0..CHILDREN)
        .map(|child| {
            let muddy = Formula::atom(child);
            let undecided = Formula::and(vec![
                Formula::not(Formula::believes(child, muddy.clone())),
                Formula::not(Formula::believes(child, Formula::not(muddy))),
            ]);
            Arc::new(events::public_announcement(
                format!("ask_{}", child + 1),
                language.clone(),
                undecided,
            ))
        })
        .collect();

    let goal = Formula::believes(CHILDREN - 1, Formula::atom(CHILDREN - 1));
    let task = Task::new(
        "muddy_children".to_string(),
        format!("{}_of_{}", CHILDREN, CHILDREN),
        language,
        initial,
        actions,
        goal,
    );
    (task, storages)
}
