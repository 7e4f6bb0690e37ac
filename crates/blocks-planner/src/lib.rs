//! Blocks-world planner library.
//!
//! This crate searches the space of block-stacking configurations for a
//! sequence of moves from an initial configuration to a goal. Four
//! strategies share one exploration loop (breadth-first, depth-first,
//! greedy best-first and A*), and every run happens under a hard
//! wall-clock deadline on a dedicated worker thread.

pub mod error;
pub mod executor;
pub mod frontier;
pub mod heuristic;
pub mod neighbors;
pub mod output;
pub mod path;
pub mod planner;
pub mod problem;
pub mod search;
pub mod state;

// Re-export main types
pub use error::{PlannerError, Result};
pub use executor::{run_bounded, run_with_deadline, DEFAULT_DEADLINE};
pub use heuristic::{distance_to_goal, misplaced_blocks, Heuristic};
pub use neighbors::{neighbors, reachable_states, successors};
pub use output::save_solution;
pub use path::reconstruct;
pub use planner::{plan, PlanReport, PlannerConfig};
pub use problem::ParsedProblem;
pub use search::{a_star, best_first, breadth_first, depth_first, search, SearchResult, Strategy};
pub use state::{Block, Configuration, Location, TABLE};
