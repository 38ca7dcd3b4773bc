use crate::kripke::action::Postconditions;
use crate::kripke::relations;
use crate::kripke::Action;
use crate::kripke::ActionKind;
use crate::language::Language;
use crate::logic::Form;
use crate::logic::Formula;
use crate::util::SparseSet;
use crate::Agent;
use fixedbitset::FixedBitSet;
use std::sync::Arc;

/// Event-model templates for the usual action shapes. Designated event
/// 0 always carries the "what actually happens" precondition; where an
/// action is only partly observed, trailing events model the observers
/// who think nothing happened or cannot tell the outcomes apart.

/// one event everybody sees: pre announced truthfully
pub fn public_announcement(name: String, language: Arc<Language>, pre: Form) -> Action {
    let mut q = relations(language.agents(), 1);
    for ag in 0..language.agents() {
        q[ag][0].insert(0);
    }
    Action::new(
        language,
        ActionKind::PublicAnnouncement,
        name,
        1,
        q,
        vec![pre],
        vec![Postconditions::new()],
        FixedBitSet::with_capacity(1),
        SparseSet::from((1, vec![0])),
    )
}

/// one event everybody sees, rewriting atoms
pub fn public_ontic(
    name: String,
    language: Arc<Language>,
    pre: Form,
    post: Postconditions,
) -> Action {
    let mut q = relations(language.agents(), 1);
    for ag in 0..language.agents() {
        q[ag][0].insert(0);
    }
    let mut ontic = FixedBitSet::with_capacity(1);
    ontic.insert(0);
    Action::new(
        language,
        ActionKind::PublicOntic,
        name,
        1,
        q,
        vec![pre],
        vec![post],
        ontic,
        SparseSet::from((1, vec![0])),
    )
}

/// everybody watches the test come out one way or the other
pub fn public_sensing(name: String, language: Arc<Language>, pre: Form, sensed: Form) -> Action {
    let mut q = relations(language.agents(), 2);
    for ag in 0..language.agents() {
        q[ag][0].insert(0);
        q[ag][1].insert(1);
    }
    let positive = Formula::and(vec![pre.clone(), sensed.clone()]);
    let negative = Formula::and(vec![pre, Formula::not(sensed)]);
    Action::new(
        language,
        ActionKind::PublicSensing,
        name,
        2,
        q,
        vec![positive, negative],
        vec![Postconditions::new(), Postconditions::new()],
        FixedBitSet::with_capacity(2),
        SparseSet::from((2, vec![0])),
    )
}

/// the `fo` agents see the test happen; everyone else sees nothing
pub fn private_sensing(name: String, language: Arc<Language>, pre: Form, fo: &[Agent]) -> Action {
    let mut q = relations(language.agents(), 2);
    for ag in 0..language.agents() {
        q[ag][1].insert(1);
        match fo.contains(&ag) {
            true => q[ag][0].insert(0),
            false => q[ag][0].insert(1),
        }
    }
    Action::new(
        language,
        ActionKind::SemiPrivateSensing,
        name,
        2,
        q,
        vec![pre, Formula::top()],
        vec![Postconditions::new(), Postconditions::new()],
        FixedBitSet::with_capacity(2),
        SparseSet::from((2, vec![0])),
    )
}

/// the `fo` agents learn the outcome, the `po` agents see the test but
/// not its outcome, everyone else sees nothing at all
pub fn semi_private_sensing(
    name: String,
    language: Arc<Language>,
    pre: Form,
    sensed: Form,
    fo: &[Agent],
    po: &[Agent],
) -> Action {
    let mut q = relations(language.agents(), 3);
    for ag in 0..language.agents() {
        q[ag][2].insert(2);
        if fo.contains(&ag) {
            q[ag][0].insert(0);
            q[ag][1].insert(1);
        } else if po.contains(&ag) {
            q[ag][0].insert(0);
            q[ag][0].insert(1);
            q[ag][1].insert(0);
            q[ag][1].insert(1);
        } else {
            q[ag][0].insert(2);
            q[ag][1].insert(2);
        }
    }
    let positive = Formula::and(vec![pre.clone(), sensed.clone()]);
    let negative = Formula::and(vec![pre.clone(), Formula::not(sensed)]);
    Action::new(
        language,
        ActionKind::SemiPrivateSensing,
        name,
        3,
        q,
        vec![positive, negative, Formula::top()],
        vec![
            Postconditions::new(),
            Postconditions::new(),
            Postconditions::new(),
        ],
        FixedBitSet::with_capacity(3),
        SparseSet::from((3, vec![0])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn templates_point_at_the_positive_event() {
        let language = Arc::new(Language::new(&["p"], &["a", "b"]));
        let peek = semi_private_sensing(
            "peek".to_string(),
            language.clone(),
            Formula::top(),
            Formula::atom(0),
            &[0],
            &[],
        );
        assert_eq!(peek.events(), 3);
        assert!(peek.is_designated(0));
        assert!(!peek.is_designated(1));
        // the observer tells outcomes apart, the outsider sees nothing
        assert!(peek.has_edge(0, 0, 0));
        assert!(!peek.has_edge(0, 0, 1));
        assert!(peek.has_edge(1, 0, 2));
        assert!(peek.is_purely_epistemic());
    }

    #[test]
    fn announcements_have_no_rewrites() {
        let language = Arc::new(Language::new(&["p"], &["a"]));
        let shout = public_announcement("shout".to_string(), language, Formula::atom(0));
        assert!(shout.is_purely_epistemic());
        assert_eq!(shout.max_depth(), 0);
        assert!(shout.has_edge(0, 0, 0));
    }
}
