use super::frontier::Frontier;
use super::node::Node;
use super::node::Tree;
use super::outcome::Outcome;
use super::outcome::Statistics;
use super::task::Task;
use super::trace::Tracer;
use crate::bisim;
use crate::bisim::Contraction;
use crate::bisim::Storages;
use crate::error::Result;
use crate::kripke::updater;
use crate::kripke::Action;
use crate::kripke::State;
use crate::Depth;
use crate::StateId;
use petgraph::stable_graph::NodeIndex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// How the state space is walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// plain BFS over fully contracted states
    Unbounded,
    /// BFS over k-contracted states with a monotonically growing bound
    IterativeBounded,
}

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub strategy: Strategy,
    pub contraction: Contraction,
    /// optional cap on generated states; hitting it ends the search
    /// with a partial result rather than an error
    pub node_limit: Option<u64>,
}

impl Config {
    pub fn unbounded() -> Self {
        Self {
            strategy: Strategy::Unbounded,
            contraction: Contraction::Full,
            node_limit: None,
        }
    }

    pub fn iterative(contraction: Contraction) -> Self {
        Self {
            strategy: Strategy::IterativeBounded,
            contraction,
            node_limit: None,
        }
    }

    /// unbounded search always contracts fully
    fn normalized(mut self) -> Self {
        if self.strategy == Strategy::Unbounded {
            self.contraction = Contraction::Full;
        }
        self
    }
}

/// Replay a plan from the task's initial state, checking applicability
/// at every step, and report whether the end state satisfies the goal.
pub fn validate(task: &Task, plan: &[Arc<Action>], storages: &mut Storages) -> Result<bool> {
    let mut state = (**task.initial()).clone();
    for action in plan {
        state = updater::apply(&state, action, &mut storages.labels)?;
    }
    Ok(state.satisfies(task.goal()))
}

/// The search driver. One instance runs one task to completion; all
/// shared stores live in the caller's `Storages` bundle.
pub struct Planner<'a> {
    task: &'a Task,
    config: Config,
    storages: &'a mut Storages,
    tracer: &'a mut dyn Tracer,
    tree: Tree,
    frontier: Frontier,
    seeds: Vec<NodeIndex>,
    visited: HashSet<StateId>,
    goal_depth: Depth,
    next_id: u64,
    stats: Statistics,
    exhausted: bool,
}

impl<'a> Planner<'a> {
    pub fn search(
        task: &'a Task,
        config: Config,
        storages: &'a mut Storages,
        tracer: &'a mut dyn Tracer,
    ) -> Outcome {
        let goal_depth = task.goal().depth();
        Self {
            task,
            config: config.normalized(),
            storages,
            tracer,
            tree: Tree::new(),
            frontier: Frontier::new(),
            seeds: Vec::new(),
            visited: HashSet::new(),
            goal_depth,
            next_id: 0,
            stats: Statistics::default(),
            exhausted: false,
        }
        .run()
    }

    fn run(mut self) -> Outcome {
        log::info!("{:<24}{}", "domain", self.task.domain());
        log::info!("{:<24}{}", "problem", self.task.problem());
        log::info!("{:<24}{}", "strategy", match self.config.strategy {
            Strategy::Unbounded => "unbounded",
            Strategy::IterativeBounded => "iterative bounded",
        });
        log::info!("{:<24}{}", "contraction", self.config.contraction);

        let start = Instant::now();
        let plan = match self.task.initial().satisfies(self.task.goal()) {
            true => {
                log::info!("goal holds in the initial state");
                Some(Vec::new())
            }
            false => match self.config.strategy {
                Strategy::Unbounded => self.bfs(0),
                Strategy::IterativeBounded => self.iterate(),
            },
        };
        self.stats.seconds = start.elapsed().as_secs_f64();
        if let Some(plan) = &plan {
            self.stats.plan_length = plan.len();
            log::info!("plan found, length {}", plan.len());
        } else {
            log::info!("no plan found");
        }
        Outcome {
            plan,
            stats: self.stats,
        }
    }

    /// grow the bound from the goal's modal depth until a plan appears,
    /// the space is exhausted, or the node budget runs out
    fn iterate(&mut self) -> Option<Vec<Arc<Action>>> {
        let mut bound = self.goal_depth;
        loop {
            if let Some(plan) = self.bfs(bound) {
                self.stats.plan_bound = bound;
                return Some(plan);
            }
            if self.exhausted {
                return None;
            }
            if self.seeds.is_empty() {
                // every contraction was exact, so the whole reachable
                // space has been searched; a larger bound sees nothing new
                log::info!("search space exhausted at bound {}", bound);
                return None;
            }
            log::info!("no plan within bound {}, escalating", bound);
            bound += 1;
        }
    }

    /// one breadth-first sweep at the given bound
    fn bfs(&mut self, bound: Depth) -> Option<Vec<Arc<Action>>> {
        self.stats.iterations += 1;
        self.tracer.iteration(bound);
        self.seed_frontier(bound);

        let mut max_depth: Option<u64> = None;
        while let Some(index) = self.frontier.front() {
            if let Some(limit) = self.config.node_limit {
                if self.stats.visited_states >= limit {
                    log::warn!("node limit {} reached, giving up", limit);
                    self.exhausted = true;
                    self.frontier.clear();
                    return None;
                }
            }
            let depth = self.tree.node(index).depth;
            if max_depth.is_none_or(|d| depth > d) {
                max_depth = Some(depth);
                self.stats.max_tree_depth = self.stats.max_tree_depth.max(depth);
                self.tracer.max_depth(depth);
            }
            self.tracer.expand_begin(self.tree.node(index));
            self.stats.expanded_nodes += 1;
            if let Some(goal) = self.expand(index) {
                let plan = self.tree.plan(goal);
                self.frontier.clear();
                return Some(plan);
            }
            if self.config.strategy == Strategy::IterativeBounded
                && !self.tree.node(index).to_apply.is_empty()
            {
                self.seeds.push(index);
            }
            self.frontier.pop_front();
        }
        None
    }

    /// First iteration: a single root node. Later iterations: refresh
    /// last round's leftover nodes, shallowest first so a parent prunes
    /// its discarded children before they are looked at.
    fn seed_frontier(&mut self, bound: Depth) {
        if self.tree.is_empty() {
            let root = self.make_node((**self.task.initial()).clone(), None, true, bound, 0);
            self.stats.visited_states += 1;
            self.stats.visited_worlds += root.state.worlds() as u64;
            let index = self.tree.insert(root, None);
            self.frontier.push(0, index);
            return;
        }
        let seeds = std::mem::take(&mut self.seeds);
        let mut ordered: Vec<(u64, NodeIndex)> = seeds
            .into_iter()
            .filter(|&i| self.tree.contains(i))
            .map(|i| (self.tree.node(i).depth, i))
            .collect();
        ordered.sort_by_key(|&(depth, _)| depth);
        for (depth, index) in ordered {
            if !self.tree.contains(index) {
                continue; // discarded by a shallower seed's refresh
            }
            self.refresh(index);
            self.frontier.push(depth, index);
        }
    }

    /// Bump a leftover node to the next bound: discard its non-bisim
    /// children, and while its own contraction is still inexact, redo
    /// it from the retained original state.
    fn refresh(&mut self, index: NodeIndex) {
        self.tree.node_mut(index).bound += 1;
        self.tree.prune_non_bisim_children(index);
        let (inexact, bound, original) = {
            let node = self.tree.node(index);
            (!node.is_bisim, node.bound, node.original.clone())
        };
        if inexact {
            let original = original.expect("original kept while the contraction is inexact");
            let (is_bisim, contracted) =
                bisim::contract(self.config.contraction, &original, bound, self.storages);
            let node = self.tree.node_mut(index);
            node.is_bisim = is_bisim;
            node.state = Arc::new(contracted);
            if is_bisim {
                node.original = None;
            }
        }
    }

    /// Apply every pending action to a node. Returns a goal node as
    /// soon as one is generated; otherwise records which actions must
    /// be re-applied at the next bound.
    fn expand(&mut self, index: NodeIndex) -> Option<NodeIndex> {
        let actions: Vec<Arc<Action>> = match self.tree.node(index).to_apply.is_empty() {
            true => self.task.actions().to_vec(),
            false => self.tree.node(index).to_apply.clone(),
        };
        let iterative = self.config.strategy == Strategy::IterativeBounded;
        let mut to_reapply: Vec<Arc<Action>> = Vec::new();
        let mut dead = true;

        for action in &actions {
            let state = self.tree.node(index).state.clone();
            if !updater::is_applicable(&state, action) {
                self.tracer.apply(action, None);
                continue;
            }
            match self.child(index, action) {
                Some(child) if !child.revisited => {
                    dead = false;
                    let is_goal = child.state.satisfies(self.task.goal());
                    let inexact = !child.is_bisim;
                    let depth = child.depth;
                    self.stats.visited_states += 1;
                    self.stats.visited_worlds += child.state.worlds() as u64;
                    let child_index = self.tree.insert(child, Some(index));
                    self.tracer.apply(action, Some(self.tree.node(child_index)));
                    if is_goal {
                        self.tracer.goal(self.tree.node(child_index));
                        return Some(child_index);
                    }
                    if inexact {
                        to_reapply.push(action.clone());
                    }
                    self.frontier.push(depth, child_index);
                }
                Some(_) => {
                    self.stats.revisits_discarded += 1;
                    self.tracer.apply(action, None);
                    if iterative {
                        to_reapply.push(action.clone());
                    }
                }
                None => {
                    self.tracer.apply(action, None);
                    if iterative {
                        to_reapply.push(action.clone());
                    }
                }
            }
        }

        let complete = to_reapply.is_empty();
        self.tree.node_mut(index).to_apply = to_reapply;
        self.tracer.expand_end(self.tree.node(index), dead, complete);
        None
    }

    /// Produce the child of `index` under `action`, or nothing when the
    /// node's remaining bound cannot absorb the action's modal depth.
    fn child(&mut self, index: NodeIndex, action: &Arc<Action>) -> Option<Node> {
        let (bisimilar, bound, depth) = {
            let node = self.tree.node(index);
            (node.is_bisim, node.bound, node.depth)
        };
        let state = self.tree.node(index).state.clone();
        match self.config.strategy {
            Strategy::Unbounded => {
                let updated = updater::product_update(&state, action, &mut self.storages.labels);
                Some(self.make_node(updated, Some(action.clone()), true, 0, depth + 1))
            }
            Strategy::IterativeBounded if bisimilar => {
                let updated = updater::product_update(&state, action, &mut self.storages.labels);
                Some(self.make_node(updated, Some(action.clone()), true, bound, depth + 1))
            }
            Strategy::IterativeBounded => match bound.checked_sub(action.max_depth()) {
                Some(reduced) if reduced >= self.goal_depth => {
                    let updated =
                        updater::product_update(&state, action, &mut self.storages.labels);
                    Some(self.make_node(updated, Some(action.clone()), false, reduced, depth + 1))
                }
                _ => None,
            },
        }
    }

    /// Contract a fresh state and wrap it into a node. The original is
    /// retained exactly while the contraction is not a bisimulation; in
    /// canonical mode the fingerprint feeds duplicate detection.
    fn make_node(
        &mut self,
        state: State,
        action: Option<Arc<Action>>,
        was_bisim: bool,
        bound: Depth,
        depth: u64,
    ) -> Node {
        let (contraction_exact, contracted) =
            bisim::contract(self.config.contraction, &state, bound, self.storages);
        let revisited = self.config.contraction == Contraction::Canonical
            && !self.visited.insert(contracted.id());
        let is_bisim = contraction_exact && was_bisim;
        let id = self.next_id;
        self.next_id += 1;
        Node {
            id,
            state: Arc::new(contracted),
            original: match is_bisim {
                true => None,
                false => Some(Arc::new(state)),
            },
            action,
            bound,
            is_bisim,
            revisited,
            depth,
            to_apply: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::coin;
    use crate::domains::gossip;
    use crate::domains::muddy;
    use crate::domains::tiger;
    use crate::logic::Formula;
    use crate::search::trace::Silent;

    #[test]
    fn satisfied_goals_need_no_actions() {
        let (task, mut storages) = coin::build();
        // looking_a is true in both initial worlds
        let trivial = Task::new(
            task.domain().to_string(),
            task.problem().to_string(),
            task.language().clone(),
            (**task.initial()).clone(),
            task.actions().to_vec(),
            Formula::believes(1, Formula::atom(2)),
        );
        let outcome = Planner::search(
            &trivial,
            Config::iterative(Contraction::Canonical),
            &mut storages,
            &mut Silent,
        );
        assert_eq!(outcome.plan, Some(Vec::new()));
        assert!(outcome.found());
        assert_eq!(outcome.stats.plan_length, 0);
    }

    #[test]
    fn iterative_plans_are_never_shorter_than_unbounded() {
        for build in [coin::build, gossip::build, muddy::build, tiger::build] {
            let (task, mut storages) = build();
            let bounded = Planner::search(
                &task,
                Config::iterative(Contraction::Canonical),
                &mut storages,
                &mut Silent,
            );
            let (task, mut storages) = build();
            let unbounded =
                Planner::search(&task, Config::unbounded(), &mut storages, &mut Silent);
            let bounded_len = bounded.plan.as_ref().expect("solvable").len();
            let unbounded_len = unbounded.plan.as_ref().expect("solvable").len();
            assert!(unbounded_len <= bounded_len, "{}", task.domain());
        }
    }

    #[test]
    fn node_budget_yields_a_partial_result() {
        let (task, mut storages) = tiger::build();
        let mut config = Config::iterative(Contraction::Canonical);
        config.node_limit = Some(2);
        let outcome = Planner::search(&task, config, &mut storages, &mut Silent);
        assert!(!outcome.found());
        assert!(outcome.stats.visited_states >= 2);
    }

    #[test]
    fn statistics_track_the_search() {
        let (task, mut storages) = coin::build();
        let outcome = Planner::search(
            &task,
            Config::iterative(Contraction::Canonical),
            &mut storages,
            &mut Silent,
        );
        assert!(outcome.found());
        assert_eq!(outcome.stats.plan_length, 1);
        assert!(outcome.stats.iterations >= 1);
        assert!(outcome.stats.expanded_nodes >= 1);
        assert!(outcome.stats.visited_states > outcome.stats.revisits_discarded);
        assert_eq!(outcome.stats.max_tree_depth, 0);
    }
}
