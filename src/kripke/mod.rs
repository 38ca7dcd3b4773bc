pub mod action;
pub mod checker;
pub mod state;
pub mod updater;

pub use action::Action;
pub use action::ActionKind;
pub use state::State;

use crate::util::SparseSet;

/// per-agent accessibility, indexed `[agent][source]`
pub type Relations = Vec<Vec<SparseSet>>;

/// empty relations over `sources` points for each of `agents` agents
pub fn relations(agents: usize, sources: usize) -> Relations {
    (0..agents)
        .map(|_| (0..sources).map(|_| SparseSet::with_universe(sources)).collect())
        .collect()
}
