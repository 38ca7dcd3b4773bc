use super::node::Node;
use crate::kripke::Action;

/// Hooks the planner fires at its milestones. All methods default to
/// no-ops, so a tracer implements only what it cares about; the planner
/// itself stays silent apart from `log` macros.
pub trait Tracer {
    fn iteration(&mut self, _bound: usize) {}
    fn max_depth(&mut self, _depth: u64) {}
    fn expand_begin(&mut self, _node: &Node) {}
    /// one application attempt; `child` is absent when the action was
    /// skipped or its product discarded
    fn apply(&mut self, _action: &Action, _child: Option<&Node>) {}
    fn expand_end(&mut self, _node: &Node, _dead: bool, _complete: bool) {}
    fn goal(&mut self, _node: &Node) {}
}

/// the absent printer
#[derive(Debug, Default)]
pub struct Silent;

impl Tracer for Silent {}

/// narrates the search through the `log` facade
#[derive(Debug, Default)]
pub struct Narrator;

impl Tracer for Narrator {
    fn iteration(&mut self, bound: usize) {
        log::info!("{:<24}{}", "entering iteration", bound);
    }

    fn max_depth(&mut self, depth: u64) {
        log::info!("{:<24}{}", "search tree depth", depth);
    }

    fn expand_begin(&mut self, node: &Node) {
        log::debug!(
            "expanding node {} at depth {} (bound {}, {})",
            node.id,
            node.depth,
            node.bound,
            if node.is_bisim { "bisimilar" } else { "not bisimilar" },
        );
    }

    fn apply(&mut self, action: &Action, child: Option<&Node>) {
        match child {
            Some(child) => log::debug!("  applied {} -> node {}", action.name(), child.id),
            None => log::debug!("  skipped {}", action.name()),
        }
    }

    fn expand_end(&mut self, node: &Node, dead: bool, complete: bool) {
        log::debug!(
            "expanded node {}: {}",
            node.id,
            if dead {
                "dead"
            } else if complete {
                "fully expanded"
            } else {
                "partially expanded"
            },
        );
    }

    fn goal(&mut self, node: &Node) {
        log::info!("goal found in node {} at depth {}", node.id, node.depth);
    }
}
