//! Frontier disciplines for the search loop.
//!
//! Each frontier keeps a membership index next to its container so the
//! "already queued?" check is a hash lookup rather than a scan. Both hold
//! the same shared configuration, never a deep copy.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use crate::state::Configuration;

/// Pending configurations awaiting expansion
pub trait Frontier {
    /// Queue a configuration. `priority` is ignored by the uninformed
    /// frontiers; lower values pop first in [`PriorityFrontier`].
    fn push(&mut self, state: Arc<Configuration>, priority: u64);

    fn pop(&mut self) -> Option<Arc<Configuration>>;

    /// Whether an equal configuration is currently queued
    fn contains(&self, state: &Configuration) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First in, first out: breadth-first order
#[derive(Debug, Default)]
pub struct FifoFrontier {
    queue: VecDeque<Arc<Configuration>>,
    members: HashSet<Arc<Configuration>>,
}

impl FifoFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for FifoFrontier {
    fn push(&mut self, state: Arc<Configuration>, _priority: u64) {
        self.members.insert(Arc::clone(&state));
        self.queue.push_back(state);
    }

    fn pop(&mut self) -> Option<Arc<Configuration>> {
        let state = self.queue.pop_front()?;
        self.members.remove(&state);
        Some(state)
    }

    fn contains(&self, state: &Configuration) -> bool {
        self.members.contains(state)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }
}

/// Last in, first out: depth-first order
#[derive(Debug, Default)]
pub struct LifoFrontier {
    stack: Vec<Arc<Configuration>>,
    members: HashSet<Arc<Configuration>>,
}

impl LifoFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for LifoFrontier {
    fn push(&mut self, state: Arc<Configuration>, _priority: u64) {
        self.members.insert(Arc::clone(&state));
        self.stack.push(state);
    }

    fn pop(&mut self) -> Option<Arc<Configuration>> {
        let state = self.stack.pop()?;
        self.members.remove(&state);
        Some(state)
    }

    fn contains(&self, state: &Configuration) -> bool {
        self.members.contains(state)
    }

    fn len(&self) -> usize {
        self.stack.len()
    }
}

/// A heap entry. Ordered by `(priority, sequence)` so equal priorities pop
/// in insertion order.
#[derive(Debug)]
struct FrontierEntry {
    key: Reverse<(u64, u64)>,
    state: Arc<Configuration>,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}

/// Lowest priority first, ties broken by insertion order.
///
/// The same configuration may be queued more than once (A* re-queues a
/// configuration when it finds a cheaper route); membership counts entries.
#[derive(Debug, Default)]
pub struct PriorityFrontier {
    heap: BinaryHeap<FrontierEntry>,
    members: HashMap<Arc<Configuration>, usize>,
    sequence: u64,
}

impl PriorityFrontier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Frontier for PriorityFrontier {
    fn push(&mut self, state: Arc<Configuration>, priority: u64) {
        *self.members.entry(Arc::clone(&state)).or_insert(0) += 1;
        self.heap.push(FrontierEntry {
            key: Reverse((priority, self.sequence)),
            state,
        });
        self.sequence += 1;
    }

    fn pop(&mut self) -> Option<Arc<Configuration>> {
        let entry = self.heap.pop()?;
        if let Some(count) = self.members.get_mut(&entry.state) {
            *count -= 1;
            if *count == 0 {
                self.members.remove(&entry.state);
            }
        }
        Some(entry.state)
    }

    fn contains(&self, state: &Configuration) -> bool {
        self.members.contains_key(state)
    }

    fn len(&self) -> usize {
        self.heap.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tower(blocks: &[&str]) -> Arc<Configuration> {
        Arc::new(Configuration::from_towers(&[blocks]))
    }

    #[test]
    fn fifo_pops_in_insertion_order() {
        let mut frontier = FifoFrontier::new();
        frontier.push(tower(&["A"]), 0);
        frontier.push(tower(&["A", "B"]), 0);
        frontier.push(tower(&["B", "A"]), 0);

        assert_eq!(frontier.pop().unwrap(), tower(&["A"]));
        assert_eq!(frontier.pop().unwrap(), tower(&["A", "B"]));
        assert_eq!(frontier.len(), 1);
    }

    #[test]
    fn lifo_pops_most_recent_first() {
        let mut frontier = LifoFrontier::new();
        frontier.push(tower(&["A"]), 0);
        frontier.push(tower(&["A", "B"]), 0);

        assert_eq!(frontier.pop().unwrap(), tower(&["A", "B"]));
        assert_eq!(frontier.pop().unwrap(), tower(&["A"]));
        assert!(frontier.pop().is_none());
    }

    #[test]
    fn membership_tracks_queue_contents() {
        let mut frontier = FifoFrontier::new();
        let state = tower(&["B", "A"]);
        assert!(!frontier.contains(&state));
        frontier.push(state.clone(), 0);
        assert!(frontier.contains(&state));
        let _ = frontier.pop();
        assert!(!frontier.contains(&state));
        assert!(frontier.is_empty());
    }

    #[test]
    fn priority_pops_lowest_first_with_fifo_ties() {
        let mut frontier = PriorityFrontier::new();
        frontier.push(tower(&["A"]), 5);
        frontier.push(tower(&["A", "B"]), 1);
        frontier.push(tower(&["B", "A"]), 1);
        frontier.push(tower(&["A", "C"]), 3);

        assert_eq!(frontier.pop().unwrap(), tower(&["A", "B"]));
        assert_eq!(frontier.pop().unwrap(), tower(&["B", "A"]));
        assert_eq!(frontier.pop().unwrap(), tower(&["A", "C"]));
        assert_eq!(frontier.pop().unwrap(), tower(&["A"]));
    }

    #[test]
    fn priority_membership_counts_duplicates() {
        let mut frontier = PriorityFrontier::new();
        let state = tower(&["B", "A"]);
        frontier.push(state.clone(), 4);
        frontier.push(state.clone(), 2);
        assert_eq!(frontier.len(), 2);

        let _ = frontier.pop();
        assert!(frontier.contains(&state));
        let _ = frontier.pop();
        assert!(!frontier.contains(&state));
    }

    #[test]
    fn queued_state_is_shared_not_copied() {
        let mut frontier = PriorityFrontier::new();
        let state = tower(&["A", "B"]);
        frontier.push(Arc::clone(&state), 0);
        // The caller, the heap entry and the membership index.
        assert_eq!(Arc::strong_count(&state), 3);

        let popped = frontier.pop().unwrap();
        assert!(Arc::ptr_eq(&popped, &state));
        assert_eq!(Arc::strong_count(&state), 2);
    }
}
