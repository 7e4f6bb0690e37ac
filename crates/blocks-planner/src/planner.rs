//! Problem-in, report-out entry point tying parsing, validation and the
//! deadline-bounded search together.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::error::Result;
use crate::executor::{run_with_deadline, DEFAULT_DEADLINE};
use crate::heuristic::Heuristic;
use crate::problem::ParsedProblem;
use crate::search::Strategy;

/// Configuration for one planning run
#[derive(Clone)]
pub struct PlannerConfig {
    pub strategy: Strategy,
    /// Wall-clock limit for the search
    pub timeout: Duration,
    /// Overrides the strategy's default heuristic
    pub heuristic: Option<Arc<dyn Heuristic>>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::BreadthFirst,
            timeout: DEFAULT_DEADLINE,
            heuristic: None,
        }
    }
}

impl std::fmt::Debug for PlannerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlannerConfig")
            .field("strategy", &self.strategy)
            .field("timeout", &self.timeout)
            .field("custom_heuristic", &self.heuristic.is_some())
            .finish()
    }
}

impl PlannerConfig {
    /// Config for the strategy named `algorithm` (`bfs`, `dfs`, `best`, `astar`).
    pub fn for_algorithm(algorithm: &str) -> Result<Self> {
        Ok(Self {
            strategy: algorithm.parse()?,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_heuristic(mut self, heuristic: Arc<dyn Heuristic>) -> Self {
        self.heuristic = Some(heuristic);
        self
    }
}

/// Result of a planning run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub strategy: Strategy,
    pub solved: bool,
    /// Move labels from start to goal; `None` when no plan exists
    pub plan: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution_length: Option<usize>,
    pub nodes_explored: usize,
    pub time_elapsed_ms: u64,
}

impl PlanReport {
    /// The moves to write out; empty when unsolved
    pub fn moves(&self) -> &[String] {
        self.plan.as_deref().unwrap_or(&[])
    }
}

/// Solve `problem` with `config`.
///
/// Both configurations are extracted and validated before any search work
/// starts, so malformed input never reaches the worker.
pub fn plan(problem: &ParsedProblem, config: &PlannerConfig) -> Result<PlanReport> {
    let initial = problem.initial_configuration()?;
    let goal = problem.goal_configuration()?;

    let heuristic = config
        .heuristic
        .clone()
        .unwrap_or_else(|| config.strategy.default_heuristic());

    log::info!(
        "Planning with {} over {} blocks (deadline {:.1}s)",
        config.strategy,
        initial.blocks().len(),
        config.timeout.as_secs_f64()
    );

    let start_time = Instant::now();
    let result = run_with_deadline(config.strategy, heuristic, initial, goal, config.timeout)?;

    Ok(PlanReport {
        strategy: config.strategy,
        solved: result.is_solved(),
        solution_length: result.plan.as_ref().map(Vec::len),
        plan: result.plan,
        nodes_explored: result.nodes_explored,
        time_elapsed_ms: start_time.elapsed().as_millis() as u64,
    })
}
