//! Rebuilding the move sequence from predecessor records.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{PlannerError, Result};
use crate::state::Configuration;

/// Configuration -> the configuration it was reached from (`None` for the start).
///
/// States are shared so every record about one configuration points at a
/// single allocation.
pub type Predecessors = HashMap<Arc<Configuration>, Option<Arc<Configuration>>>;

/// Configuration -> label of the move that reached it
pub type Moves = HashMap<Arc<Configuration>, String>;

/// Walk back from `reached` to `start` and return the move labels in
/// start-to-goal order.
///
/// Any missing record means the caller's bookkeeping is broken and is
/// reported as [`PlannerError::InconsistentBookkeeping`].
pub fn reconstruct(
    predecessor: &Predecessors,
    move_taken: &Moves,
    start: &Configuration,
    reached: &Configuration,
) -> Result<Vec<String>> {
    let mut path = Vec::new();
    let mut at = reached;

    while at != start {
        // Every step consumes a distinct predecessor record unless they loop.
        if path.len() > predecessor.len() {
            return Err(PlannerError::InconsistentBookkeeping(
                "predecessor records form a cycle".to_string(),
            ));
        }

        let label = move_taken.get(at).ok_or_else(|| {
            PlannerError::InconsistentBookkeeping(format!("no move recorded for {:?}", at.on))
        })?;
        path.push(label.clone());

        at = match predecessor.get(at) {
            Some(Some(parent)) => &**parent,
            Some(None) => {
                return Err(PlannerError::InconsistentBookkeeping(
                    "reached a root that is not the start configuration".to_string(),
                ))
            }
            None => {
                return Err(PlannerError::InconsistentBookkeeping(format!(
                    "no predecessor recorded for {:?}",
                    at.on
                )))
            }
        };
    }

    path.reverse();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Location;

    fn chain() -> (
        Arc<Configuration>,
        Arc<Configuration>,
        Arc<Configuration>,
        Predecessors,
        Moves,
    ) {
        let start = Configuration::from_towers(&[&["A"], &["B"], &["C"]]);
        let middle = start.apply("B", &Location::Table, &Location::Block("C".to_string()));
        let end = middle.apply("A", &Location::Table, &Location::Block("B".to_string()));
        let (start, middle, end) = (Arc::new(start), Arc::new(middle), Arc::new(end));

        let mut predecessor = Predecessors::new();
        predecessor.insert(Arc::clone(&start), None);
        predecessor.insert(Arc::clone(&middle), Some(Arc::clone(&start)));
        predecessor.insert(Arc::clone(&end), Some(Arc::clone(&middle)));

        let mut moves = Moves::new();
        moves.insert(Arc::clone(&middle), middle.last_action.clone().unwrap());
        moves.insert(Arc::clone(&end), end.last_action.clone().unwrap());

        (start, middle, end, predecessor, moves)
    }

    #[test]
    fn test_reconstruct_in_forward_order() {
        let (start, _, end, predecessor, moves) = chain();
        let path = reconstruct(&predecessor, &moves, &start, &end).unwrap();
        assert_eq!(path, vec!["Move B from TABLE to C", "Move A from TABLE to B"]);
    }

    #[test]
    fn test_reconstruct_start_is_empty() {
        let (start, _, _, predecessor, moves) = chain();
        assert!(reconstruct(&predecessor, &moves, &start, &start)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_missing_move_is_inconsistent() {
        let (start, middle, end, predecessor, mut moves) = chain();
        moves.remove(&*middle);
        assert!(matches!(
            reconstruct(&predecessor, &moves, &start, &end),
            Err(PlannerError::InconsistentBookkeeping(_))
        ));
    }

    #[test]
    fn test_missing_predecessor_is_inconsistent() {
        let (start, middle, end, mut predecessor, moves) = chain();
        predecessor.remove(&*middle);
        assert!(matches!(
            reconstruct(&predecessor, &moves, &start, &end),
            Err(PlannerError::InconsistentBookkeeping(_))
        ));
    }

    #[test]
    fn test_foreign_root_is_inconsistent() {
        let (_, _, end, predecessor, moves) = chain();
        let elsewhere = Configuration::from_towers(&[&["C", "A"], &["B"]]);
        assert!(matches!(
            reconstruct(&predecessor, &moves, &elsewhere, &end),
            Err(PlannerError::InconsistentBookkeeping(_))
        ));
    }

    #[test]
    fn test_cycle_is_inconsistent() {
        let (start, middle, end, mut predecessor, moves) = chain();
        predecessor.insert(Arc::clone(&middle), Some(Arc::clone(&end)));
        assert!(matches!(
            reconstruct(&predecessor, &moves, &start, &end),
            Err(PlannerError::InconsistentBookkeeping(_))
        ));
    }
}
