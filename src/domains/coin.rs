use super::events;
use crate::bisim::Storages;
use crate::kripke::action::Postconditions;
use crate::kripke::relations;
use crate::kripke::Action;
use crate::language::Label;
use crate::language::Language;
use crate::logic::Formula;
use crate::search::Task;
use crate::util::SparseSet;
use std::sync::Arc;

/// A coin lies in a box, heads up. Agent a looks at the box; b and c
/// see a peeking without seeing the coin. Two worlds, heads and tails,
/// all three agents initially undecided between them.
pub fn build() -> (Task, Storages) {
    let language = Arc::new(Language::new(
        &["heads", "opened", "looking_a", "looking_b", "looking_c"],
        &["a", "b", "c"],
    ));
    let mut storages = Storages::new(language.atoms());

    let mut heads = Label::new(language.atoms());
    heads.assign(0, true);
    heads.assign(2, true);
    let heads = storages.labels.emplace(heads);
    let mut tails = Label::new(language.atoms());
    tails.assign(2, true);
    let tails = storages.labels.emplace(tails);

    let mut r = relations(language.agents(), 2);
    for ag in 0..language.agents() {
        for w in 0..2 {
            r[ag][w].insert(0);
            r[ag][w].insert(1);
        }
    }
    let initial = crate::kripke::State::new(
        language.clone(),
        2,
        r,
        vec![heads, tails],
        SparseSet::from((2, vec![0])),
    );

    let peek = |observer: usize, looking: usize, others: [usize; 2]| {
        events::semi_private_sensing(
            format!("peek_{}", language.agent_name(observer)),
            language.clone(),
            Formula::atom(looking),
            Formula::atom(0),
            &[observer],
            &others,
        )
    };
    let mut opened = Postconditions::new();
    opened.insert(1, Formula::top());
    let open_a = events::public_ontic(
        "open_a".to_string(),
        language.clone(),
        Formula::not(Formula::atom(1)),
        opened,
    );
    let actions: Vec<Arc<Action>> = vec![
        Arc::new(peek(0, 2, [1, 2])),
        Arc::new(open_a),
        Arc::new(peek(1, 3, [0, 2])),
    ];

    let goal = Formula::believes(0, Formula::atom(0));
    let task = Task::new(
        "coin_in_the_box".to_string(),
        "3".to_string(),
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
    use crate::error::Error;
    use crate::kripke::updater;
    use crate::search::planner;
    use crate::search::Config;
    use crate::search::Planner;
    use crate::search::trace::Silent;

    #[test]
    fn one_peek_settles_the_believer() {
        for config in [
            Config::unbounded(),
            Config::iterative(Contraction::Rooted),
            Config::iterative(Contraction::Canonical),
        ] {
            let (task, mut storages) = build();
            let outcome = Planner::search(&task, config, &mut storages, &mut Silent);
            assert_eq!(outcome.steps(), vec!["peek_a"]);
            assert!(planner::validate(&task, outcome.plan.as_deref().unwrap(), &mut storages).unwrap());
        }
    }

    #[test]
    fn opening_twice_is_rejected() {
        let (task, mut storages) = build();
        let open_a = task.actions()[1].clone();
        let once = updater::apply(task.initial(), &open_a, &mut storages.labels).unwrap();
        assert!(once.satisfies(&Formula::atom(1)));
        assert_eq!(
            updater::apply(&once, &open_a, &mut storages.labels),
            Err(Error::NotApplicable("open_a".to_string()))
        );
    }

    #[test]
    fn outsiders_stay_undecided_after_the_peek() {
        let (task, mut storages) = build();
        let peek_a = task.actions()[0].clone();
        let after = updater::apply(task.initial(), &peek_a, &mut storages.labels).unwrap();
        assert!(after.satisfies(&Formula::believes(0, Formula::atom(0))));
        for outsider in [1, 2] {
            assert!(after.satisfies(&Formula::considers(outsider, Formula::atom(0))));
            assert!(after.satisfies(&Formula::considers(outsider, Formula::not(Formula::atom(0)))));
        }
    }

    #[test]
    fn composed_updates_match_step_by_step() {
        let (task, mut storages) = build();
        let plan: Vec<Arc<Action>> = vec![task.actions()[1].clone(), task.actions()[0].clone()];
        let composed =
            updater::execute(task.initial(), &plan, Some((Contraction::Rooted, 2)), &mut storages)
                .unwrap();
        assert!(composed.satisfies(&Formula::believes(0, Formula::atom(0))));
        assert!(composed.satisfies(&Formula::atom(1)));
    }
}
