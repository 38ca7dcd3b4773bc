use crate::kripke::Action;
use crate::kripke::State;
use crate::Depth;
use petgraph::stable_graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use petgraph::Direction::Incoming;
use petgraph::Direction::Outgoing;
use std::sync::Arc;

/// One point of the search: a contracted state, how it was reached, and
/// the bookkeeping the iterative strategy needs to revisit it.
///
/// `original` keeps the uncontracted state only while the contraction
/// at the node's bound is not yet a true bisimulation; it is dropped
/// the moment the flag flips, after which the contracted state is
/// exact and re-refinement has nothing left to see.
#[derive(Debug)]
pub struct Node {
    pub id: u64,
    pub state: Arc<State>,
    pub original: Option<Arc<State>>,
    pub action: Option<Arc<Action>>,
    pub bound: Depth,
    pub is_bisim: bool,
    pub revisited: bool,
    pub depth: u64,
    pub to_apply: Vec<Arc<Action>>,
}

/// The search tree, a stable graph so node handles survive the pruning
/// of non-bisimilar children between iterations.
#[derive(Debug, Default)]
pub struct Tree {
    graph: StableDiGraph<Node, ()>,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::new(),
        }
    }

    pub fn insert(&mut self, node: Node, parent: Option<NodeIndex>) -> NodeIndex {
        let index = self.graph.add_node(node);
        if let Some(parent) = parent {
            self.graph.add_edge(parent, index, ());
        }
        index
    }

    pub fn node(&self, index: NodeIndex) -> &Node {
        self.graph.node_weight(index).expect("live node handle")
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> &mut Node {
        self.graph.node_weight_mut(index).expect("live node handle")
    }

    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(index, Incoming).next()
    }

    pub fn children(&self, index: NodeIndex) -> Vec<NodeIndex> {
        self.graph.neighbors_directed(index, Outgoing).collect()
    }

    /// root-to-node handle sequence
    pub fn path(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![index];
        let mut current = index;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// the action sequence that reached this node
    pub fn plan(&self, index: NodeIndex) -> Vec<Arc<Action>> {
        self.path(index)
            .into_iter()
            .filter_map(|i| self.node(i).action.clone())
            .collect()
    }

    /// drop every non-bisimilar child of `index`, subtrees included
    pub fn prune_non_bisim_children(&mut self, index: NodeIndex) {
        let doomed: Vec<NodeIndex> = self
            .children(index)
            .into_iter()
            .filter(|&c| !self.node(c).is_bisim)
            .collect();
        for child in doomed {
            self.prune(child);
        }
    }

    pub fn prune(&mut self, index: NodeIndex) {
        for child in self.children(index) {
            self.prune(child);
        }
        self.graph.remove_node(index);
    }

    /// does this handle still point at a live node?
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.graph.node_weight(index).is_some()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
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

    fn leaf(id: u64, depth: u64, is_bisim: bool) -> Node {
        let language = Arc::new(Language::new(&["p"], &["a"]));
        let mut store = LabelStore::new(1);
        let label = store.emplace(Label::new(1));
        let state = State::new(
            language,
            1,
            relations(1, 1),
            vec![label],
            SparseSet::from((1, vec![0])),
        );
        Node {
            id,
            state: Arc::new(state),
            original: None,
            action: None,
            bound: 0,
            is_bisim,
            revisited: false,
            depth,
            to_apply: Vec::new(),
        }
    }

    #[test]
    fn paths_run_root_to_leaf() {
        let mut tree = Tree::new();
        let root = tree.insert(leaf(0, 0, true), None);
        let a = tree.insert(leaf(1, 1, true), Some(root));
        let b = tree.insert(leaf(2, 2, true), Some(a));
        assert_eq!(tree.path(b), vec![root, a, b]);
        assert_eq!(tree.parent(root), None);
    }

    #[test]
    fn pruning_removes_whole_subtrees() {
        let mut tree = Tree::new();
        let root = tree.insert(leaf(0, 0, true), None);
        let keep = tree.insert(leaf(1, 1, true), Some(root));
        let drop = tree.insert(leaf(2, 1, false), Some(root));
        let below = tree.insert(leaf(3, 2, true), Some(drop));
        tree.prune_non_bisim_children(root);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.children(root), vec![keep]);
        assert!(tree.graph.node_weight(below).is_none());
        assert!(tree.graph.node_weight(drop).is_none());
    }
}
