use super::Relations;
use crate::language::Language;
use crate::logic::Form;
use crate::util::SparseSet;
use crate::Agent;
use crate::Atom;
use crate::Depth;
use crate::Event;
use fixedbitset::FixedBitSet;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Advisory classification of an event model. The product updater only
/// looks at the structural fields; the tag exists for reporting and for
/// alternative update semantics layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    PublicOntic,
    PrivateOntic,
    SemiPrivateSensing,
    PublicSensing,
    PrivateAnnouncement,
    SemiPrivateAnnouncement,
    PublicAnnouncement,
}

/// atom rewrites applied by an ontic event, keyed for stable iteration
pub type Postconditions = BTreeMap<Atom, Form>;

/// A finite event model: events with preconditions, optional ontic
/// postconditions, per-agent accessibility over events and a designated
/// event set. Immutable once built.
#[derive(Debug, PartialEq)]
pub struct Action {
    language: Arc<Language>,
    kind: ActionKind,
    name: String,
    events: usize,
    relations: Relations,
    pre: Vec<Form>,
    post: Vec<Postconditions>,
    ontic: FixedBitSet,
    designated: SparseSet,
    max_depth: Depth,
}

impl Action {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        language: Arc<Language>,
        kind: ActionKind,
        name: String,
        events: usize,
        relations: Relations,
        pre: Vec<Form>,
        post: Vec<Postconditions>,
        ontic: FixedBitSet,
        designated: SparseSet,
    ) -> Self {
        assert_eq!(pre.len(), events);
        assert_eq!(post.len(), events);
        assert!(!designated.is_empty(), "a pointed action has a designated event");
        let max_depth = pre
            .iter()
            .map(|f| f.depth())
            .chain(post.iter().flat_map(|ep| ep.values().map(|f| f.depth())))
            .max()
            .unwrap_or(0);
        Self {
            language,
            kind,
            name,
            events,
            relations,
            pre,
            post,
            ontic,
            designated,
            max_depth,
        }
    }

    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn events(&self) -> usize {
        self.events
    }

    pub fn accessible(&self, ag: Agent, e: Event) -> &SparseSet {
        &self.relations[ag][e]
    }

    pub fn has_edge(&self, ag: Agent, e: Event, f: Event) -> bool {
        self.relations[ag][e].contains(f)
    }

    pub fn pre(&self, e: Event) -> &Form {
        &self.pre[e]
    }

    pub fn post(&self, e: Event) -> &Postconditions {
        &self.post[e]
    }

    pub fn designated(&self) -> &SparseSet {
        &self.designated
    }

    pub fn is_designated(&self, e: Event) -> bool {
        self.designated.contains(e)
    }

    pub fn is_ontic(&self, e: Event) -> bool {
        self.ontic.contains(e)
    }

    pub fn is_purely_epistemic(&self) -> bool {
        self.ontic.count_ones(..) == 0
    }

    /// greatest modal depth across preconditions and postconditions
    pub fn max_depth(&self) -> Depth {
        self.max_depth
    }
}

/// DOT rendering: designated events box3d, edges annotated with agents,
/// each event listed with its precondition and rewrites.
impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "digraph {{")?;
        writeln!(f, "\trankdir=BT;")?;
        write!(f, "\t{{ node [shape=box] ")?;
        for e in (0..self.events).filter(|&e| !self.is_designated(e)) {
            write!(f, "e{}; ", e)?;
        }
        writeln!(f, "}}")?;
        write!(f, "\t{{ node [shape=box3d] ")?;
        for ed in self.designated.iter() {
            write!(f, "e{}; ", ed)?;
        }
        writeln!(f, "}}")?;
        for e in 0..self.events {
            let post = if self.is_ontic(e) {
                self.post[e]
                    .iter()
                    .map(|(p, g)| format!("{} := {}", self.language.atom_name(*p), g))
                    .collect::<Vec<String>>()
                    .join(", ")
            } else {
                "-".to_string()
            };
            writeln!(f, "\te{} [label=\"e{}: pre {} | {}\"];", e, e, self.pre[e], post)?;
        }
        let mut edges: BTreeMap<(Event, Event), Vec<Agent>> = BTreeMap::new();
        for ag in 0..self.language.agents() {
            for e in 0..self.events {
                for g in self.relations[ag][e].iter() {
                    edges.entry((e, g)).or_default().push(ag);
                }
            }
        }
        for ((from, to), ags) in edges {
            let names: Vec<&str> = ags.iter().map(|&ag| self.language.agent_name(ag)).collect();
            writeln!(f, "\te{} -> e{} [label=\"{}\"];", from, to, names.join(", "))?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kripke::relations;
    use crate::logic::Formula;

    #[test]
    fn max_depth_spans_pre_and_post() {
        let language = Arc::new(Language::new(&["p", "q"], &["a"]));
        let mut post = Postconditions::new();
        post.insert(1, Formula::believes(0, Formula::atom(0)));
        let mut ontic = FixedBitSet::with_capacity(1);
        ontic.insert(0);
        let action = Action::new(
            language,
            ActionKind::PublicOntic,
            "flip".to_string(),
            1,
            relations(1, 1),
            vec![Formula::atom(0)],
            vec![post],
            ontic,
            SparseSet::from((1, vec![0])),
        );
        assert_eq!(action.max_depth(), 1);
        assert!(!action.is_purely_epistemic());
    }
}
