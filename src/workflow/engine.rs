//! Transition validation against the graph plus the parent-done guard.

use crate::error::{TrackError, TrackResult};
use crate::model::{Issue, Status};
use crate::store::TrackStore;

use super::TransitionGraph;

/// Validates status transitions. Holds the loaded graph; the guard query
/// goes through the store at validation time so it always sees current
/// children.
#[derive(Debug, Clone, Default)]
pub struct WorkflowEngine {
    graph: TransitionGraph,
}

impl WorkflowEngine {
    pub fn new(graph: TransitionGraph) -> Self {
        Self { graph }
    }

    pub fn graph(&self) -> &TransitionGraph {
        &self.graph
    }

    /// Replace the graph after a reseed.
    pub fn set_graph(&mut self, graph: TransitionGraph) {
        self.graph = graph;
    }

    /// Edge-only check: no-op transitions are trivially valid, anything
    /// else needs an active edge.
    pub fn check_edge(&self, from: Status, to: Status) -> TrackResult<()> {
        if self.graph.is_valid(from, to) {
            Ok(())
        } else {
            Err(TrackError::InvalidTransition { from, to })
        }
    }

    /// Full transition check for `issue` moving to `to`: edge validity,
    /// then the parent-done guard for real transitions into `done`.
    ///
    /// The guard rejects while any direct child is not `done`, independent
    /// of edge validity. Issue *type* is never consulted here.
    pub async fn check_transition<S: TrackStore + ?Sized>(
        &self,
        store: &S,
        issue: &Issue,
        to: Status,
    ) -> TrackResult<()> {
        self.check_edge(issue.status, to)?;

        if to == Status::Done && issue.status != Status::Done {
            let children = store.children_of(issue.id).await?;
            if children.iter().any(|c| c.status != Status::Done) {
                return Err(TrackError::ParentHasOpenChildren { issue_id: issue.id });
            }
        }
        Ok(())
    }
}
