use super::state::State;
use crate::logic::Formula;
use crate::logic::Kind;
use crate::World;

/// Does `f` hold at world `w` of `s`? Structural recursion, no side
/// effects; boolean connectives evaluate left to right.
pub fn holds_in(s: &State, w: World, f: &Formula) -> bool {
    match f.kind() {
        Kind::Top => true,
        Kind::Bottom => false,
        Kind::Atom(p) => s.label(w).get(*p),
        Kind::Not(g) => !holds_in(s, w, g),
        Kind::And(gs) => gs.iter().all(|g| holds_in(s, w, g)),
        Kind::Or(gs) => gs.iter().any(|g| holds_in(s, w, g)),
        Kind::Imply(g, h) => !holds_in(s, w, g) || holds_in(s, w, h),
        Kind::Believes(ag, g) => s.accessible(*ag, w).iter().all(|v| holds_in(s, v, g)),
        Kind::Considers(ag, g) => s.accessible(*ag, w).iter().any(|v| holds_in(s, v, g)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kripke::relations;
    use crate::language::Label;
    use crate::language::Language;
    use crate::language::LabelStore;
    use crate::util::SparseSet;
    use std::sync::Arc;

    /// two worlds, both considered possible by agent 0 from either side;
    /// p holds only at world 0, which is designated
    fn coin() -> State {
        let language = Arc::new(Language::new(&["p"], &["a"]));
        let mut store = LabelStore::new(1);
        let mut heads = Label::new(1);
        heads.assign(0, true);
        let heads = store.emplace(heads);
        let tails = store.emplace(Label::new(1));
        let mut r = relations(1, 2);
        for w in 0..2 {
            r[0][w].insert(0);
            r[0][w].insert(1);
        }
        State::new(language, 2, r, vec![heads, tails], SparseSet::from((2, vec![0])))
    }

    #[test]
    fn atoms_read_the_label() {
        let s = coin();
        assert!(holds_in(&s, 0, &Formula::atom(0)));
        assert!(!holds_in(&s, 1, &Formula::atom(0)));
    }

    #[test]
    fn boolean_connectives() {
        let s = coin();
        let p = Formula::atom(0);
        assert!(holds_in(&s, 0, &Formula::or(vec![p.clone(), Formula::bottom()])));
        assert!(!holds_in(&s, 0, &Formula::and(vec![p.clone(), Formula::not(p.clone())])));
        assert!(holds_in(&s, 1, &Formula::imply(p.clone(), Formula::bottom())));
        assert!(holds_in(&s, 0, &Formula::imply(Formula::bottom(), p)));
    }

    #[test]
    fn universal_modality_needs_all_accessible_worlds() {
        let s = coin();
        let p = Formula::atom(0);
        assert!(!holds_in(&s, 0, &Formula::believes(0, p.clone())));
        assert!(holds_in(&s, 0, &Formula::considers(0, p.clone())));
        assert!(holds_in(&s, 0, &Formula::considers(0, Formula::not(p))));
    }

    #[test]
    fn modalities_over_empty_access_are_vacuous() {
        let language = Arc::new(Language::new(&["p"], &["a"]));
        let mut store = LabelStore::new(1);
        let label = store.emplace(Label::new(1));
        let s = State::new(
            language,
            1,
            relations(1, 1),
            vec![label],
            SparseSet::from((1, vec![0])),
        );
        assert!(holds_in(&s, 0, &Formula::believes(0, Formula::bottom())));
        assert!(!holds_in(&s, 0, &Formula::considers(0, Formula::top())));
    }
}
