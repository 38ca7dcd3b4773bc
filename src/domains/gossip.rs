use super::events;
use crate::bisim::Storages;
use crate::kripke::action::Postconditions;
use crate::kripke::relations;
use crate::kripke::Action;
use crate::kripke::State;
use crate::language::Label;
use crate::language::Language;
use crate::logic::Form;
use crate::logic::Formula;
use crate::search::Task;
use crate::util::SparseSet;
use std::sync::Arc;

const AGENTS: [&str; 3] = ["a", "b", "c"];

/// index of the atom "agent i holds agent j's secret"
fn holds(i: usize, j: usize) -> usize {
    i * AGENTS.len() + j
}

/// Telephone gossip: three friends each start with their own secret and
/// a call pools everything both callers hold. Who-called-whom is common
/// knowledge, so a single world tracks the spread.
pub fn build() -> (Task, Storages) {
    let atom_names: Vec<String> = AGENTS
        .iter()
        .flat_map(|i| AGENTS.iter().map(move |j| format!("k_{}{}", i, j)))
        .collect();
    let atom_refs: Vec<&str> = atom_names.iter().map(|s| s.as_str()).collect();
    let language = Arc::new(Language::new(&atom_refs, &AGENTS));
    let mut storages = Storages::new(language.atoms());

    let mut start = Label::new(language.atoms());
    for i in 0..AGENTS.len() {
        start.assign(holds(i, i), true);
    }
    let start = storages.labels.emplace(start);
    let mut r = relations(language.agents(), 1);
    for ag in 0..language.agents() {
        r[ag][0].insert(0);
    }
    let initial = State::new(language.clone(), 1, r, vec![start], SparseSet::from((1, vec![0])));

    let mut actions: Vec<Arc<Action>> = Vec::new();
    for i in 0..AGENTS.len() {
        for j in i + 1..AGENTS.len() {
            let mut pooled = Postconditions::new();
            for x in 0..AGENTS.len() {
                let either: Form = Formula::or(vec![
                    Formula::atom(holds(i, x)),
                    Formula::atom(holds(j, x)),
                ]);
                pooled.insert(holds(i, x), either.clone());
                pooled.insert(holds(j, x), either);
            }
            actions.push(Arc::new(events::public_ontic(
                format!("call_{}_{}", AGENTS[i], AGENTS[j]),
                language.clone(),
                Formula::top(),
                pooled,
            )));
        }
    }

    let goal = Formula::and(
        (0..language.atoms()).map(Formula::atom).collect(),
    );
    let task = Task::new(
        "gossip".to_string(),
        "3_agents_3_secrets".to_string(),
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
    fn three_calls_spread_every_secret() {
        for config in [
            Config::unbounded(),
            Config::iterative(Contraction::Canonical),
        ] {
            let (task, mut storages) = build();
            let outcome = Planner::search(&task, config, &mut storages, &mut Silent);
            let plan = outcome.plan.as_deref().expect("gossip is solvable");
            assert_eq!(plan.len(), 3);
            assert!(planner::validate(&task, plan, &mut storages).unwrap());
        }
    }

    #[test]
    fn calls_pool_both_sides() {
        let (task, mut storages) = build();
        let call_ab = task.actions()[0].clone();
        let after = crate::kripke::updater::apply(task.initial(), &call_ab, &mut storages.labels)
            .unwrap();
        for atom in [holds(0, 0), holds(0, 1), holds(1, 0), holds(1, 1)] {
            assert!(after.satisfies(&Formula::atom(atom)));
        }
        assert!(!after.satisfies(&Formula::atom(holds(2, 0))));
    }

    #[test]
    fn two_calls_are_never_enough() {
        let (task, mut storages) = build();
        for first in task.actions() {
            for second in task.actions() {
                let after = crate::kripke::updater::execute(
                    task.initial(),
                    &[first.clone(), second.clone()],
                    None,
                    &mut storages,
                )
                .unwrap();
                assert!(!after.satisfies(task.goal()));
            }
        }
    }
}
