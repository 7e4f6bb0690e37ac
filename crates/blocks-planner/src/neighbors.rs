//! Legal single-block moves out of a configuration.
//!
//! Every clear block may go onto every other clear block, and onto the
//! table unless it is already there. A block's own support is never clear,
//! so no generated move leaves the configuration unchanged.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use smallvec::SmallVec;

use crate::error::{PlannerError, Result};
use crate::state::{Configuration, Location};

/// Destinations available to `block`, in `clear` order with the table last
fn destinations_for(state: &Configuration, block: &str, from: &Location) -> SmallVec<[Location; 8]> {
    let mut destinations: SmallVec<[Location; 8]> = state
        .clear
        .iter()
        .filter(|other| other.as_str() != block)
        .map(|other| Location::Block(other.clone()))
        .collect();

    if !from.is_table() {
        destinations.push(Location::Table);
    }

    destinations
}

/// Lazily yield every configuration reachable from `state` in one move.
///
/// Order follows the iteration order of `state.clear`, so it is stable for
/// a given configuration. Each successor is built only when requested, which
/// lets a caller stop partway through a wide expansion.
pub fn successors(state: &Configuration) -> impl Iterator<Item = Configuration> + '_ {
    state
        .clear
        .iter()
        // A clear block with no support is outside the model; nothing can move it.
        .filter_map(move |block| state.location_of(block).map(|from| (block, from)))
        .flat_map(move |(block, from)| {
            let destinations = destinations_for(state, block, &from);
            destinations
                .into_iter()
                .map(move |to| state.apply(block, &from, &to))
        })
}

/// Every configuration reachable from `state` in one move, collected.
pub fn neighbors(state: &Configuration) -> Vec<Configuration> {
    successors(state).collect()
}

/// Enumerate the whole state space reachable from `initial`, breadth first.
///
/// The space grows super-exponentially with the number of blocks, so the
/// walk polls `cancel` once per generated configuration.
pub fn reachable_states(
    initial: &Configuration,
    cancel: &AtomicBool,
) -> Result<HashSet<Configuration>> {
    let mut seen: HashSet<Configuration> = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(initial.clone());
    queue.push_back(initial.clone());

    while let Some(current) = queue.pop_front() {
        for next in successors(&current) {
            if cancel.load(Ordering::Relaxed) {
                return Err(PlannerError::Cancelled);
            }
            if !seen.contains(&next) {
                seen.insert(next.clone());
                queue.push_back(next);
            }
        }
    }

    log::debug!("{} configurations reachable", seen.len());
    Ok(seen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(states: &[Configuration]) -> Vec<String> {
        states
            .iter()
            .map(|s| s.last_action.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_two_blocks_on_table() {
        let state = Configuration::from_towers(&[&["A"], &["B"]]);
        let next = neighbors(&state);
        assert_eq!(
            labels(&next),
            vec!["Move A from TABLE to B", "Move B from TABLE to A"]
        );
    }

    #[test]
    fn test_stacked_block_can_only_go_to_table() {
        let state = Configuration::from_towers(&[&["B", "A"]]);
        let next = neighbors(&state);
        assert_eq!(labels(&next), vec!["Move A from B to TABLE"]);
    }

    #[test]
    fn test_branching_factor() {
        // Three clear blocks, one of them stacked: 3 * 2 block moves + 1 table move
        let state = Configuration::from_towers(&[&["D", "A"], &["B"], &["C"]]);
        assert_eq!(neighbors(&state).len(), 7);
    }

    #[test]
    fn test_neighbors_are_well_formed_and_distinct_from_parent() {
        let state = Configuration::from_towers(&[&["D", "A"], &["B", "E"], &["C"]]);
        let next = neighbors(&state);
        assert!(!next.is_empty());
        for neighbor in &next {
            neighbor.validate(&[]).unwrap();
            assert_ne!(neighbor, &state);
            assert_eq!(neighbor.blocks(), state.blocks());
        }
    }

    #[test]
    fn test_neighbors_do_not_mutate_input() {
        let state = Configuration::from_towers(&[&["A"], &["B"], &["C"]]);
        let before = state.clone();
        let _ = neighbors(&state);
        assert_eq!(state.clear, before.clear);
        assert_eq!(state.on_table, before.on_table);
        assert_eq!(state.on, before.on);
    }

    #[test]
    fn test_single_block_has_no_moves() {
        let state = Configuration::from_towers(&[&["A"]]);
        assert!(neighbors(&state).is_empty());
    }

    #[test]
    fn test_successors_are_lazy_and_ordered() {
        let state = Configuration::from_towers(&[&["A"], &["B"], &["C"]]);
        let first: Vec<Configuration> = successors(&state).take(2).collect();
        assert_eq!(
            labels(&first),
            vec!["Move A from TABLE to B", "Move A from TABLE to C"]
        );
        assert_eq!(successors(&state).count(), neighbors(&state).len());
    }

    #[test]
    fn test_reachable_state_counts() {
        let never = AtomicBool::new(false);
        let one = Configuration::from_towers(&[&["A"]]);
        assert_eq!(reachable_states(&one, &never).unwrap().len(), 1);

        let two = Configuration::from_towers(&[&["A"], &["B"]]);
        assert_eq!(reachable_states(&two, &never).unwrap().len(), 3);

        // Any starting arrangement of the same blocks reaches the same space.
        let three = Configuration::from_towers(&[&["C", "A", "B"]]);
        assert_eq!(reachable_states(&three, &never).unwrap().len(), 13);

        let four = Configuration::from_towers(&[&["A"], &["B"], &["C"], &["D"]]);
        let space = reachable_states(&four, &never).unwrap();
        assert_eq!(space.len(), 73);
        assert!(space.contains(&Configuration::from_towers(&[&["D", "C", "B", "A"]])));
    }

    #[test]
    fn test_reachable_states_honours_cancel() {
        let state = Configuration::from_towers(&[&["A"], &["B"]]);
        assert!(matches!(
            reachable_states(&state, &AtomicBool::new(true)),
            Err(PlannerError::Cancelled)
        ));
    }
}
