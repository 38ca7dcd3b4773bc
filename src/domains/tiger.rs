use super::events;
use crate::bisim::Storages;
use crate::kripke::action::Postconditions;
use crate::kripke::relations;
use crate::kripke::Action;
use crate::kripke::State;
use crate::language::Label;
use crate::language::Language;
use crate::logic::Formula;
use crate::search::Task;
use crate::util::SparseSet;
use std::sync::Arc;

const DOORS: usize = 3;

fn princess_at(door: usize) -> usize {
    door
}

fn tiger_at(door: usize) -> usize {
    DOORS + door
}

fn opened(door: usize) -> usize {
    2 * DOORS + door
}

const SAVED: usize = 3 * DOORS;

/// Three doors, a princess behind one, a tiger behind another, and a
/// rescuer who cannot tell the six arrangements apart. Listening at a
/// door reveals whether the princess is there; a door can be opened
/// once; walking in to save her only makes sense knowing she is there.
/// Actually: princess behind door 1, tiger behind door 2.
pub fn build() -> (Task, Storages) {
    let mut atom_names: Vec<String> = Vec::new();
    for door in 1..=DOORS {
        atom_names.push(format!("princess_{}", door));
    }
    for door in 1..=DOORS {
        atom_names.push(format!("tiger_{}", door));
    }
    for door in 1..=DOORS {
        atom_names.push(format!("opened_{}", door));
    }
    atom_names.push("saved".to_string());
    let atom_refs: Vec<&str> = atom_names.iter().map(|s| s.as_str()).collect();
    let language = Arc::new(Language::new(&atom_refs, &["rescuer"]));
    let mut storages = Storages::new(language.atoms());

    // one world per (princess door, tiger door) arrangement
    let mut arrangements: Vec<(usize, usize)> = Vec::new();
    for p in 0..DOORS {
        for t in 0..DOORS {
            if p != t {
                arrangements.push((p, t));
            }
        }
    }
    let worlds = arrangements.len();
    let mut labels = Vec::with_capacity(worlds);
    for &(p, t) in &arrangements {
        let mut label = Label::new(language.atoms());
        label.assign(princess_at(p), true);
        label.assign(tiger_at(t), true);
        labels.push(storages.labels.emplace(label));
    }
    let mut r = relations(language.agents(), worlds);
    for w in 0..worlds {
        for v in 0..worlds {
            r[0][w].insert(v);
        }
    }
    let designated = arrangements
        .iter()
        .position(|&(p, t)| p == 0 && t == 1)
        .expect("the reference arrangement exists");
    let initial = State::new(
        language.clone(),
        worlds,
        r,
        labels,
        SparseSet::from((worlds, vec![designated])),
    );

    let mut actions: Vec<Arc<Action>> = Vec::new();
    for door in 0..DOORS {
        actions.push(Arc::new(events::public_sensing(
            format!("look_{}", door + 1),
            language.clone(),
            Formula::top(),
            Formula::atom(princess_at(door)),
        )));
    }
    for door in 0..DOORS {
        let mut post = Postconditions::new();
        post.insert(opened(door), Formula::top());
        actions.push(Arc::new(events::public_ontic(
            format!("open_{}", door + 1),
            language.clone(),
            Formula::not(Formula::atom(opened(door))),
            post,
        )));
    }
    for door in 0..DOORS {
        let mut post = Postconditions::new();
        post.insert(SAVED, Formula::top());
        let pre = Formula::and(vec![
            Formula::atom(opened(door)),
            Formula::atom(princess_at(door)),
            Formula::believes(0, Formula::atom(princess_at(door))),
        ]);
        actions.push(Arc::new(events::public_ontic(
            format!("save_princess_{}", door + 1),
            language.clone(),
            pre,
            post,
        )));
    }

    let goal = Formula::atom(SAVED);
    let task = Task::new(
        "tiger".to_string(),
        "3_doors".to_string(),
        language,
        initial,
        actions,
        goal,
    );
    (task, storages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bisim::Contraction;
    use crate::search::planner;
    use crate::search::trace::Silent;
    use crate::search::Config;
    use crate::search::Planner;

    #[test]
    fn look_open_save_rescues_the_princess() {
        for config in [
            Config::unbounded(),
            Config::iterative(Contraction::Canonical),
        ] {
            let (task, mut storages) = build();
            let outcome = Planner::search(&task, config, &mut storages, &mut Silent);
            assert_eq!(
                outcome.steps(),
                vec!["look_1", "open_1", "save_princess_1"]
            );
            assert!(
                planner::validate(&task, outcome.plan.as_deref().unwrap(), &mut storages).unwrap()
            );
        }
    }

    #[test]
    fn saving_blind_is_not_allowed() {
        let (task, mut storages) = build();
        let open_1 = task.actions()[DOORS].clone();
        let save_1 = task.actions()[2 * DOORS].clone();
        // without looking first the rescuer does not know where she is
        let opened_up =
            crate::kripke::updater::apply(task.initial(), &open_1, &mut storages.labels).unwrap();
        assert!(!crate::kripke::updater::is_applicable(&opened_up, &save_1));
    }

    #[test]
    fn looking_at_the_wrong_door_is_not_possible() {
        let (task, _) = build();
        let look_2 = task.actions()[1].clone();
        // the designated outcome event requires the princess there
        assert!(!crate::kripke::updater::is_applicable(task.initial(), &look_2));
    }

    #[test]
    fn listening_narrows_the_arrangements() {
        let (task, mut storages) = build();
        let look_1 = task.actions()[0].clone();
        let after =
            crate::kripke::updater::apply(task.initial(), &look_1, &mut storages.labels).unwrap();
        assert_eq!(after.worlds(), 2);
        assert!(after.satisfies(&Formula::believes(0, Formula::atom(princess_at(0)))));
    }
}
