use crate::kripke::Action;
use std::sync::Arc;

/// Counters accumulated over one search.
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct Statistics {
    pub plan_length: usize,
    pub plan_bound: usize,
    pub iterations: usize,
    pub expanded_nodes: u64,
    pub visited_states: u64,
    pub visited_worlds: u64,
    pub revisits_discarded: u64,
    pub max_tree_depth: u64,
    pub seconds: f64,
}

/// What a search run hands back: the plan if one was found (possibly
/// empty, when the initial state already satisfies the goal) plus the
/// run's statistics. An exhausted search is not an error.
#[derive(Debug)]
pub struct Outcome {
    pub plan: Option<Vec<Arc<Action>>>,
    pub stats: Statistics,
}

impl Outcome {
    pub fn found(&self) -> bool {
        self.plan.is_some()
    }

    /// action names along the plan, for reports and assertions
    pub fn steps(&self) -> Vec<String> {
        self.plan
            .iter()
            .flatten()
            .map(|a| a.name().to_string())
            .collect()
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.plan {
            None => write!(f, "no plan found"),
            Some(plan) if plan.is_empty() => write!(f, "goal holds in the initial state"),
            Some(plan) => {
                writeln!(f, "plan of length {}:", plan.len())?;
                for (i, action) in plan.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, action.name())?;
                }
                Ok(())
            }
        }
    }
}
