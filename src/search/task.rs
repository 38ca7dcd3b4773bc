use crate::kripke::Action;
use crate::kripke::State;
use crate::language::Language;
use crate::logic::Form;
use std::sync::Arc;

/// Everything the planner needs, bundled once by a problem builder and
/// treated as read-only from then on.
#[derive(Debug)]
pub struct Task {
    domain: String,
    problem: String,
    language: Arc<Language>,
    initial: Arc<State>,
    actions: Vec<Arc<Action>>,
    goal: Form,
}

impl Task {
    pub fn new(
        domain: String,
        problem: String,
        language: Arc<Language>,
        initial: State,
        actions: Vec<Arc<Action>>,
        goal: Form,
    ) -> Self {
        Self {
            domain,
            problem,
            language,
            initial: Arc::new(initial),
            actions,
            goal,
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn problem(&self) -> &str {
        &self.problem
    }

    pub fn language(&self) -> &Arc<Language> {
        &self.language
    }

    pub fn initial(&self) -> &Arc<State> {
        &self.initial
    }

    pub fn actions(&self) -> &[Arc<Action>] {
        &self.actions
    }

    pub fn goal(&self) -> &Form {
        &self.goal
    }
}
