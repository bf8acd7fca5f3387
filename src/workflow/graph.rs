//! Transition graph built from stored edge rows.

use std::collections::HashSet;

use crate::model::{Status, TransitionEdge};

/// Directed graph of allowed status transitions. Only active edges are
/// kept; inactive rows are configuration that is currently switched off.
#[derive(Debug, Clone, Default)]
pub struct TransitionGraph {
    active: HashSet<(Status, Status)>,
}

impl TransitionGraph {
    /// Build a graph from edge rows, skipping inactive ones.
    pub fn from_edges<I>(edges: I) -> Self
    where
        I: IntoIterator<Item = TransitionEdge>,
    {
        let active = edges
            .into_iter()
            .filter(|e| e.is_active)
            .map(|e| (e.from_status, e.to_status))
            .collect();
        Self { active }
    }

    /// The authoritative default seed: every ordered pair of distinct
    /// statuses is an active edge.
    pub fn permissive() -> Self {
        let mut active = HashSet::new();
        for from in Status::ALL {
            for to in Status::ALL {
                if from != to {
                    active.insert((from, to));
                }
            }
        }
        Self { active }
    }

    /// `from == to` is trivially valid (a no-op, not a real transition);
    /// otherwise an active edge must exist.
    pub fn is_valid(&self, from: Status, to: Status) -> bool {
        from == to || self.active.contains(&(from, to))
    }

    pub fn edge_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
