//! Deadline-bounded execution of a search.
//!
//! The search runs on its own worker thread while the caller waits on a
//! one-shot channel. On overrun the worker's cancellation flag is raised
//! and the worker is joined, so its frontier and visited set are released
//! before the caller sees [`PlannerError::TimeoutExceeded`]. The search
//! polls the flag for every successor it generates, which bounds that join
//! to roughly one configuration's worth of work. No partial result survives
//! a timeout and nothing is retried.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{PlannerError, Result};
use crate::heuristic::Heuristic;
use crate::search::{search, SearchResult, Strategy};
use crate::state::Configuration;

/// Deadline applied when the caller does not pick one
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Run `work` on a dedicated thread and wait at most `max_duration` for it.
///
/// `work` receives the cancellation flag it must observe. Its own error is
/// returned unchanged; a panic becomes [`PlannerError::WorkerPanicked`].
pub fn run_bounded<T, F>(max_duration: Duration, work: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&AtomicBool) -> Result<T> + Send + 'static,
{
    let cancel = Arc::new(AtomicBool::new(false));
    let worker_cancel = Arc::clone(&cancel);
    let (sender, receiver) = mpsc::channel();

    let handle = thread::Builder::new()
        .name("search-worker".to_string())
        .spawn(move || {
            let outcome = work(&worker_cancel);
            // The receiver is gone only after a timeout, when the outcome is unwanted.
            let _ = sender.send(outcome);
        })?;

    match receiver.recv_timeout(max_duration) {
        Ok(outcome) => {
            let _ = handle.join();
            outcome
        }
        Err(mpsc::RecvTimeoutError::Timeout) => {
            cancel.store(true, Ordering::Relaxed);
            if let Err(payload) = handle.join() {
                log::warn!(
                    "search worker panicked while being cancelled: {}",
                    panic_message(payload.as_ref())
                );
            }
            Err(PlannerError::TimeoutExceeded {
                limit: max_duration,
            })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => match handle.join() {
            Err(payload) => Err(PlannerError::WorkerPanicked(panic_message(payload.as_ref()))),
            Ok(()) => Err(PlannerError::WorkerPanicked(
                "worker exited without reporting a result".to_string(),
            )),
        },
    }
}

/// Run one search under a hard deadline.
pub fn run_with_deadline(
    strategy: Strategy,
    heuristic: Arc<dyn Heuristic>,
    initial: Configuration,
    goal: Configuration,
    max_duration: Duration,
) -> Result<SearchResult> {
    let started = Instant::now();

    let outcome = run_bounded(max_duration, move |cancel| {
        search(strategy, &initial, &goal, heuristic.as_ref(), cancel)
    });

    match &outcome {
        Ok(result) => log::info!(
            "{strategy} finished in {:.4}s: {} nodes explored, {}",
            started.elapsed().as_secs_f64(),
            result.nodes_explored,
            match &result.plan {
                Some(plan) => format!("{} moves", plan.len()),
                None => "no solution".to_string(),
            }
        ),
        Err(PlannerError::TimeoutExceeded { limit }) => log::warn!(
            "{strategy} gave up after the {:.3}s deadline",
            limit.as_secs_f64()
        ),
        Err(e) => log::error!("{strategy} failed: {e}"),
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::misplaced_blocks;

    fn reversed_tower(size: usize) -> (Configuration, Configuration) {
        let names: Vec<String> = (0..size).map(|i| format!("B{i}")).collect();
        let up: Vec<&str> = names.iter().map(String::as_str).collect();
        let down: Vec<&str> = up.iter().rev().copied().collect();
        (
            Configuration::from_towers(&[up.as_slice()]),
            Configuration::from_towers(&[down.as_slice()]),
        )
    }

    #[test]
    fn test_completes_within_deadline() {
        let initial = Configuration::from_towers(&[&["A"], &["B"]]);
        let goal = Configuration::from_facts(&["ON A B"]).unwrap();

        let result = run_with_deadline(
            Strategy::BreadthFirst,
            Arc::new(misplaced_blocks),
            initial,
            goal,
            Duration::from_secs(10),
        )
        .unwrap();

        assert_eq!(result.plan, Some(vec!["Move A from TABLE to B".to_string()]));
        assert_eq!(result.nodes_explored, 2);
    }

    #[test]
    fn test_large_instance_times_out() {
        let (initial, goal) = reversed_tower(12);

        let outcome = run_with_deadline(
            Strategy::BreadthFirst,
            Arc::new(misplaced_blocks),
            initial,
            goal,
            Duration::from_millis(1),
        );

        assert!(matches!(
            outcome,
            Err(PlannerError::TimeoutExceeded { limit }) if limit == Duration::from_millis(1)
        ));
    }

    #[test]
    fn test_wide_instance_stops_near_deadline() {
        // 120 loose blocks: a single expansion yields 14,280 successors.
        let names: Vec<String> = (0..120).map(|i| format!("B{i:03}")).collect();
        let blocks: Vec<&str> = names.iter().map(String::as_str).collect();
        let loose: Vec<&[&str]> = blocks.chunks(1).collect();
        let initial = Configuration::from_towers(&loose);
        let goal = Configuration::from_towers(&[blocks.as_slice()]);
        let deadline = Duration::from_millis(50);

        let started = Instant::now();
        let outcome = run_with_deadline(
            Strategy::BreadthFirst,
            Arc::new(misplaced_blocks),
            initial,
            goal,
            deadline,
        );
        let elapsed = started.elapsed();

        assert!(matches!(outcome, Err(PlannerError::TimeoutExceeded { .. })));
        assert!(elapsed < deadline * 20, "returned after {elapsed:?}");
    }

    #[test]
    fn test_timed_out_worker_is_reclaimed() {
        let exited = Arc::new(AtomicBool::new(false));
        let worker_exited = Arc::clone(&exited);

        let outcome: Result<()> = run_bounded(Duration::from_millis(20), move |cancel| {
            while !cancel.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(1));
            }
            worker_exited.store(true, Ordering::Relaxed);
            Err(PlannerError::Cancelled)
        });

        assert!(matches!(outcome, Err(PlannerError::TimeoutExceeded { .. })));
        // The worker was joined before returning.
        assert!(exited.load(Ordering::Relaxed));
    }

    #[test]
    fn test_worker_error_is_propagated() {
        let outcome: Result<()> = run_bounded(Duration::from_secs(5), |_| {
            Err(PlannerError::InconsistentBookkeeping("lost a record".to_string()))
        });
        assert!(matches!(
            outcome,
            Err(PlannerError::InconsistentBookkeeping(msg)) if msg == "lost a record"
        ));
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let outcome: Result<()> = run_bounded(Duration::from_secs(5), |_| panic!("frontier exploded"));
        match outcome {
            Err(PlannerError::WorkerPanicked(msg)) => assert!(msg.contains("frontier exploded")),
            other => panic!("expected WorkerPanicked, got {other:?}"),
        }
    }

    #[test]
    fn test_value_passes_through_unchanged() {
        let outcome = run_bounded(Duration::from_secs(5), |_| Ok(42usize));
        assert_eq!(outcome.unwrap(), 42);
    }
}
