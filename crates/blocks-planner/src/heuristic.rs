//! Goal-distance estimates for the informed strategies.
//!
//! Neither supplied function is proven admissible or consistent, so A*
//! run with them is not guaranteed to return a shortest plan.

use crate::state::{Configuration, Location};

/// Scores a configuration against the goal; lower is closer.
pub trait Heuristic: Send + Sync {
    fn estimate(&self, state: &Configuration, goal: &Configuration) -> u32;
}

impl<F> Heuristic for F
where
    F: Fn(&Configuration, &Configuration) -> u32 + Send + Sync,
{
    fn estimate(&self, state: &Configuration, goal: &Configuration) -> u32 {
        self(state, goal)
    }
}

/// Where the goal wants `block`; blocks the goal does not stack belong on the table
fn goal_support(goal: &Configuration, block: &str) -> Location {
    match goal.on.get(block) {
        Some(support) => Location::Block(support.clone()),
        None => Location::Table,
    }
}

/// Count the blocks of `state` whose support differs from the goal's.
pub fn misplaced_blocks(state: &Configuration, goal: &Configuration) -> u32 {
    let mut count = 0;
    for block in state.on_table.iter().chain(state.on.keys()) {
        let current = state.location_of(block).unwrap_or(Location::Table);
        if current != goal_support(goal, block) {
            count += 1;
        }
    }
    count
}

/// Count, over every block named by either configuration, the blocks
/// resting somewhere other than where the goal puts them.
pub fn distance_to_goal(state: &Configuration, goal: &Configuration) -> u32 {
    let mut blocks = state.blocks();
    blocks.extend(goal.on.keys());

    blocks
        .into_iter()
        .filter(|block| {
            let current = state.location_of(block).unwrap_or(Location::Table);
            current != goal_support(goal, block)
        })
        .count() as u32
}
