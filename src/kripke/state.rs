use super::checker;
use super::Relations;
use crate::language::Label;
use crate::language::Language;
use crate::logic::Formula;
use crate::util::SparseSet;
use crate::Agent;
use crate::Depth;
use crate::LabelId;
use crate::StateId;
use crate::World;
use crate::UNREACHABLE;
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::sync::Arc;

/// A finite pointed Kripke structure.
///
/// Worlds are dense ids `0..worlds`; every mutation happens by building
/// a new state, so states can be shared freely between search nodes.
/// Each world's distance from the designated set is computed once at
/// construction and drives the stratified refinement budget.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    language: Arc<Language>,
    worlds: usize,
    relations: Relations,
    labels: Vec<Label>,
    designated: SparseSet,
    depths: Vec<Depth>,
    max_depth: Depth,
    id: StateId,
}

impl State {
    pub fn new(
        language: Arc<Language>,
        worlds: usize,
        relations: Relations,
        labels: Vec<Label>,
        designated: SparseSet,
    ) -> Self {
        assert!(!designated.is_empty(), "a pointed model has a designated world");
        assert_eq!(labels.len(), worlds);
        let (depths, max_depth) = Self::measure(&language, worlds, &relations, &designated);
        Self {
            language,
            worlds,
            relations,
            labels,
            designated,
            depths,
            max_depth,
            id: 0,
        }
    }

    /// attach a canonical fingerprint to a freshly built quotient
    pub fn tag(mut self, id: StateId) -> Self {
        self.id = id;
        self
    }

    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    pub fn worlds(&self) -> usize {
        self.worlds
    }

    pub fn accessible(&self, ag: Agent, w: World) -> &SparseSet {
        &self.relations[ag][w]
    }

    pub fn has_edge(&self, ag: Agent, w: World, v: World) -> bool {
        self.relations[ag][w].contains(v)
    }

    pub fn label(&self, w: World) -> &Label {
        &self.labels[w]
    }

    pub fn label_id(&self, w: World) -> LabelId {
        self.labels[w].id()
    }

    pub fn designated(&self) -> &SparseSet {
        &self.designated
    }

    pub fn is_designated(&self, w: World) -> bool {
        self.designated.contains(w)
    }

    pub fn depth(&self, w: World) -> Depth {
        self.depths[w]
    }

    pub fn max_depth(&self) -> Depth {
        self.max_depth
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    /// a pointed model satisfies a formula iff every designated world does
    pub fn satisfies(&self, f: &Formula) -> bool {
        self.designated.iter().all(|wd| checker::holds_in(self, wd, f))
    }

    /// BFS from the designated set along every agent's relation
    fn measure(
        language: &Language,
        worlds: usize,
        relations: &Relations,
        designated: &SparseSet,
    ) -> (Vec<Depth>, Depth) {
        let mut depths = vec![UNREACHABLE; worlds];
        let mut max_depth = 0;
        let mut queue: VecDeque<World> = VecDeque::new();
        for wd in designated.iter() {
            depths[wd] = 0;
            queue.push_back(wd);
        }
        while let Some(current) = queue.pop_front() {
            if depths[current] > max_depth {
                max_depth = depths[current];
            }
            for ag in 0..language.agents() {
                for v in relations[ag][current].iter() {
                    if depths[v] == UNREACHABLE {
                        depths[v] = depths[current] + 1;
                        queue.push_back(v);
                    }
                }
            }
        }
        (depths, max_depth)
    }
}

/// DOT rendering of the structure: worlds labeled with their true atoms
/// and depth, one edge per (from, to) pair annotated with the agents
/// that share it, designated worlds double-circled.
impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "digraph {{")?;
        writeln!(f, "\trankdir=BT;")?;
        write!(f, "\t{{ node [shape=doublecircle] ")?;
        for wd in self.designated.iter() {
            write!(f, "w{}; ", wd)?;
        }
        writeln!(f, "}}")?;
        for w in 0..self.worlds {
            let atoms: Vec<&str> = (0..self.language.atoms())
                .filter(|&p| self.label(w).get(p))
                .map(|p| self.language.atom_name(p))
                .collect();
            writeln!(
                f,
                "\tw{} [label=\"w{} ({}): {}\"];",
                w,
                w,
                self.depth(w),
                atoms.join(" ")
            )?;
        }
        let mut edges: BTreeMap<(World, World), Vec<Agent>> = BTreeMap::new();
        for ag in 0..self.language.agents() {
            for w in 0..self.worlds {
                for v in self.relations[ag][w].iter() {
                    edges.entry((w, v)).or_default().push(ag);
                }
            }
        }
        for ((from, to), ags) in edges {
            let names: Vec<&str> = ags.iter().map(|&ag| self.language.agent_name(ag)).collect();
            writeln!(f, "\tw{} -> w{} [label=\"{}\"];", from, to, names.join(", "))?;
        }
        write!(f, "}}")
    }
}
