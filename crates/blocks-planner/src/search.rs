//! Breadth-first, depth-first, best-first and A* search over configurations.
//!
//! All four strategies run the same exploration loop and differ only in the
//! frontier they use and how they rank newly discovered configurations.
//! Goal matching uses configuration equality, i.e. the `on` mapping alone.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::frontier::{FifoFrontier, Frontier, LifoFrontier, PriorityFrontier};
use crate::heuristic::{distance_to_goal, misplaced_blocks, Heuristic};
use crate::neighbors::successors;
use crate::path::{reconstruct, Moves, Predecessors};
use crate::state::Configuration;

/// Search strategy selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    #[serde(rename = "bfs")]
    BreadthFirst,
    #[serde(rename = "dfs")]
    DepthFirst,
    #[serde(rename = "best")]
    BestFirst,
    #[serde(rename = "astar")]
    AStar,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::BreadthFirst,
        Strategy::DepthFirst,
        Strategy::BestFirst,
        Strategy::AStar,
    ];

    /// Short name accepted by [`FromStr`]
    pub fn name(self) -> &'static str {
        match self {
            Strategy::BreadthFirst => "bfs",
            Strategy::DepthFirst => "dfs",
            Strategy::BestFirst => "best",
            Strategy::AStar => "astar",
        }
    }

    /// Whether the strategy consults a heuristic
    pub fn is_informed(self) -> bool {
        matches!(self, Strategy::BestFirst | Strategy::AStar)
    }

    /// Heuristic used when the caller does not supply one
    pub fn default_heuristic(self) -> Arc<dyn Heuristic> {
        match self {
            Strategy::AStar => Arc::new(distance_to_goal),
            _ => Arc::new(misplaced_blocks),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name() == lowered)
            .ok_or_else(|| PlannerError::UnknownStrategy(s.to_string()))
    }
}

/// Outcome of one search run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// Move labels from start to goal; `None` when the frontier ran dry
    pub plan: Option<Vec<String>>,
    /// Configurations taken off the frontier and goal-tested
    pub nodes_explored: usize,
}

impl SearchResult {
    pub fn is_solved(&self) -> bool {
        self.plan.is_some()
    }
}

/// Per-configuration records kept while exploring.
///
/// All three maps key on the same shared configuration, so recording a
/// state costs reference-count bumps rather than copies of its block sets.
#[derive(Debug, Default)]
pub(crate) struct SearchTree {
    pub predecessor: Predecessors,
    pub move_taken: Moves,
    /// Moves from the start; the A* path cost
    pub depth: HashMap<Arc<Configuration>, u32>,
}

impl SearchTree {
    fn rooted_at(start: &Arc<Configuration>) -> Self {
        let mut tree = Self::default();
        tree.predecessor.insert(Arc::clone(start), None);
        tree.depth.insert(Arc::clone(start), 0);
        tree
    }

    fn depth_of(&self, state: &Configuration) -> Result<u32> {
        self.depth.get(state).copied().ok_or_else(|| {
            PlannerError::InconsistentBookkeeping(format!(
                "no depth recorded for {:?}",
                state.on
            ))
        })
    }

    fn record(&mut self, state: &Arc<Configuration>, parent: &Arc<Configuration>, depth: u32) {
        self.predecessor
            .insert(Arc::clone(state), Some(Arc::clone(parent)));
        if let Some(action) = &state.last_action {
            self.move_taken.insert(Arc::clone(state), action.clone());
        }
        self.depth.insert(Arc::clone(state), depth);
    }
}

/// Everything an exploration produced, kept together so the plan can be
/// checked against the records it came from
#[derive(Debug)]
pub(crate) struct Exploration {
    pub nodes_explored: usize,
    pub reached: Option<Arc<Configuration>>,
    pub tree: SearchTree,
}

/// How newly discovered configurations are ranked and re-queued
struct Policy<'a> {
    heuristic: Option<&'a dyn Heuristic>,
    /// Add the path cost to the heuristic (A*)
    path_cost: bool,
    /// Re-queue a queued configuration when a cheaper route to it appears
    reopen: bool,
}

impl Policy<'_> {
    fn priority(&self, state: &Configuration, goal: &Configuration, depth: u32) -> u64 {
        let h = self
            .heuristic
            .map_or(0, |heuristic| u64::from(heuristic.estimate(state, goal)));
        if self.path_cost {
            u64::from(depth) + h
        } else {
            h
        }
    }
}

/// The shared exploration loop.
///
/// `cancel` is checked on every pop and again for every generated
/// successor, so even a very wide expansion stops promptly. When set the
/// loop returns [`PlannerError::Cancelled`] and everything it allocated is
/// dropped.
fn explore<F: Frontier>(
    initial: &Configuration,
    goal: &Configuration,
    mut frontier: F,
    policy: &Policy<'_>,
    cancel: &AtomicBool,
) -> Result<Exploration> {
    let initial = Arc::new(initial.clone());
    let mut tree = SearchTree::rooted_at(&initial);
    let mut visited: HashSet<Arc<Configuration>> = HashSet::new();
    let mut nodes_explored = 0;

    frontier.push(Arc::clone(&initial), policy.priority(&initial, goal, 0));

    while let Some(current) = frontier.pop() {
        if cancel.load(Ordering::Relaxed) {
            return Err(PlannerError::Cancelled);
        }

        // Superseded A* entries; the cheaper copy was already expanded.
        if visited.contains(&current) {
            continue;
        }

        nodes_explored += 1;

        if *current == *goal {
            return Ok(Exploration {
                nodes_explored,
                reached: Some(current),
                tree,
            });
        }

        let next_depth = tree.depth_of(&current)? + 1;

        for neighbor in successors(&current) {
            if cancel.load(Ordering::Relaxed) {
                return Err(PlannerError::Cancelled);
            }
            if visited.contains(&neighbor) {
                continue;
            }
            if frontier.contains(&neighbor) {
                let improves = policy.reopen
                    && tree
                        .depth
                        .get(&neighbor)
                        .map_or(true, |&known| next_depth < known);
                if !improves {
                    continue;
                }
            }

            let priority = policy.priority(&neighbor, goal, next_depth);
            let neighbor = Arc::new(neighbor);
            tree.record(&neighbor, &current, next_depth);
            frontier.push(neighbor, priority);
        }

        visited.insert(current);
    }

    Ok(Exploration {
        nodes_explored,
        reached: None,
        tree,
    })
}

/// Run `strategy` to completion or until `cancel` is raised.
///
/// `heuristic` is consulted only by the informed strategies.
pub(crate) fn explore_with(
    strategy: Strategy,
    initial: &Configuration,
    goal: &Configuration,
    heuristic: &dyn Heuristic,
    cancel: &AtomicBool,
) -> Result<Exploration> {
    log::debug!("starting {strategy} search over {} blocks", initial.blocks().len());

    let policy = Policy {
        heuristic: strategy.is_informed().then_some(heuristic),
        path_cost: strategy == Strategy::AStar,
        reopen: strategy == Strategy::AStar,
    };

    match strategy {
        Strategy::BreadthFirst => explore(initial, goal, FifoFrontier::new(), &policy, cancel),
        Strategy::DepthFirst => explore(initial, goal, LifoFrontier::new(), &policy, cancel),
        Strategy::BestFirst | Strategy::AStar => {
            explore(initial, goal, PriorityFrontier::new(), &policy, cancel)
        }
    }
}

/// Run `strategy` and turn its exploration into a [`SearchResult`].
pub fn search(
    strategy: Strategy,
    initial: &Configuration,
    goal: &Configuration,
    heuristic: &dyn Heuristic,
    cancel: &AtomicBool,
) -> Result<SearchResult> {
    let exploration = explore_with(strategy, initial, goal, heuristic, cancel)?;

    let plan = match &exploration.reached {
        Some(reached) => {
            let moves = reconstruct(
                &exploration.tree.predecessor,
                &exploration.tree.move_taken,
                initial,
                reached,
            )?;
            log::debug!(
                "{strategy}: goal matched after {} nodes, {} moves",
                exploration.nodes_explored,
                moves.len()
            );
            Some(moves)
        }
        None => {
            log::debug!(
                "{strategy}: frontier exhausted after {} nodes",
                exploration.nodes_explored
            );
            None
        }
    };

    Ok(SearchResult {
        plan,
        nodes_explored: exploration.nodes_explored,
    })
}

/// Breadth-first search. Returns a plan with the fewest moves.
pub fn breadth_first(initial: &Configuration, goal: &Configuration) -> Result<SearchResult> {
    search(
        Strategy::BreadthFirst,
        initial,
        goal,
        &misplaced_blocks,
        &AtomicBool::new(false),
    )
}

/// Depth-first search. Plans are valid but usually not shortest.
pub fn depth_first(initial: &Configuration, goal: &Configuration) -> Result<SearchResult> {
    search(
        Strategy::DepthFirst,
        initial,
        goal,
        &misplaced_blocks,
        &AtomicBool::new(false),
    )
}

/// Greedy best-first search ordered by `heuristic` alone.
pub fn best_first(
    initial: &Configuration,
    goal: &Configuration,
    heuristic: &dyn Heuristic,
) -> Result<SearchResult> {
    search(
        Strategy::BestFirst,
        initial,
        goal,
        heuristic,
        &AtomicBool::new(false),
    )
}

/// A* ordered by moves so far plus `heuristic`.
pub fn a_star(
    initial: &Configuration,
    goal: &Configuration,
    heuristic: &dyn Heuristic,
) -> Result<SearchResult> {
    search(Strategy::AStar, initial, goal, heuristic, &AtomicBool::new(false))
}
