//! Error types for the planner.

use std::time::Duration;

use thiserror::Error;

/// Main error type for planner operations
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Requested algorithm name is not one of `bfs`, `dfs`, `best`, `astar`
    #[error("unknown search strategy: {0}")]
    UnknownStrategy(String),

    /// Facts do not describe a well-formed configuration
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Predecessor/move records are missing an entry on the path back to the start
    #[error("inconsistent search bookkeeping: {0}")]
    InconsistentBookkeeping(String),

    /// The search did not finish within its deadline
    #[error("search exceeded its deadline of {:.3}s", .limit.as_secs_f64())]
    TimeoutExceeded { limit: Duration },

    /// The search observed its cancellation flag and stopped
    #[error("search was cancelled")]
    Cancelled,

    /// The worker running the search panicked
    #[error("search worker panicked: {0}")]
    WorkerPanicked(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for planner operations
pub type Result<T> = std::result::Result<T, PlannerError>;
