//! Transaction coordinator.
//!
//! Sequences every issue mutation: resolve role → evaluate capability →
//! structural validation (hierarchy or workflow) → compute diff → apply
//! mutation and append the audit record in one atomic store call. Any
//! error aborts the sequence with nothing written.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::access::{is_owner, resolve_role, Capability};
use crate::audit::{creation_changes, ChangeSet};
use crate::error::{EntityKind, TrackError, TrackResult};
use crate::hierarchy;
use crate::model::{
    ActivityAction, ActivityRecord, Issue, IssuePatch, IssueType, NewIssue, Principal,
    ProjectRole, Status,
};
use crate::store::TrackStore;
use crate::workflow::{TransitionGraph, WorkflowEngine};

/// Core service coordinating access control, validation and audit for
/// every issue mutation.
pub struct IssueService<S: TrackStore + ?Sized> {
    store: Arc<S>,
    engine: RwLock<WorkflowEngine>,
}

impl<S: TrackStore + ?Sized> IssueService<S> {
    /// Build the service, loading the transition graph from the store.
    /// Run the seeding step first on a fresh deployment, otherwise the
    /// graph is empty and only no-op transitions validate.
    pub async fn connect(store: Arc<S>) -> TrackResult<Self> {
        let edges = store.transition_edges().await?;
        let graph = TransitionGraph::from_edges(edges);
        debug!(edges = graph.edge_count(), "transition graph loaded");
        Ok(Self {
            store,
            engine: RwLock::new(WorkflowEngine::new(graph)),
        })
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Refresh the in-memory graph after the edge rows were reseeded.
    pub async fn reload_transitions(&self) -> TrackResult<()> {
        let edges = self.store.transition_edges().await?;
        let graph = TransitionGraph::from_edges(edges);
        info!(edges = graph.edge_count(), "transition graph reloaded");
        self.engine.write().await.set_graph(graph);
        Ok(())
    }

    /// Resolve the principal's role on the project and require
    /// `capability`. The error distinguishes "not a member" (`role:
    /// None`) from "member without the capability".
    pub async fn evaluate_permission(
        &self,
        principal: &Principal,
        project_id: Uuid,
        capability: Capability,
    ) -> TrackResult<ProjectRole> {
        let role = resolve_role(self.store.as_ref(), principal, project_id).await?;
        match role {
            Some(role) if capability.allows(role) => Ok(role),
            other => Err(TrackError::PermissionDenied {
                required: capability,
                role: other,
            }),
        }
    }

    /// Create an issue: permission gate, hierarchy validation, code
    /// generation, then insert + CREATED record atomically.
    pub async fn apply_create(
        &self,
        principal: &Principal,
        input: NewIssue,
    ) -> TrackResult<(Issue, ActivityRecord)> {
        let project = self
            .store
            .get_project(input.project_id)
            .await?
            .ok_or(TrackError::NotFound {
                kind: EntityKind::Project,
                id: input.project_id,
            })?;

        self.evaluate_permission(principal, input.project_id, Capability::CreateIssue)
            .await?;

        if input.title.trim().is_empty() {
            return Err(TrackError::Validation {
                field: "title".into(),
                reason: "must not be empty".into(),
            });
        }

        // Fetch the declared parent at most once, then validate.
        let parent = match input.parent_issue_id {
            Some(parent_id) => self.store.get_issue(parent_id).await?,
            None => None,
        };
        hierarchy::validate_parent(
            input.issue_type,
            input.project_id,
            input.parent_issue_id,
            parent.as_ref(),
        )?;

        let code = self.next_issue_code(&project).await?;
        let now = Utc::now();
        let issue = Issue {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            code,
            issue_type: input.issue_type,
            parent_issue_id: input.parent_issue_id,
            status: input.status,
            title: input.title,
            description: input.description,
            assignee: input.assignee,
            reviewer: input.reviewer,
            release_number: input.release_number,
            sprint_number: input.sprint_number,
            start_date: input.start_date,
            end_date: input.end_date,
            created_by: principal.id,
            created_at: now,
            updated_at: now,
            version: 0,
        };

        let changes = creation_changes(issue.status.as_str(), &issue.title);
        let record = changes
            .into_record(issue.id, Some(principal.id), ActivityAction::Created, now)
            .ok_or_else(|| TrackError::Storage("creation diff cannot be empty".into()))?;

        self.store.insert_issue_with_activity(&issue, &record).await?;
        info!(issue = %issue.code, project = %project.name, "issue created");
        Ok((issue, record))
    }

    /// Multi-field update. Edit access is edit-all, or edit-own plus
    /// ownership (creator or name-matched assignee). A status change
    /// inside the patch goes through full workflow validation. Zero
    /// actual changes means nothing is written at all.
    pub async fn apply_update(
        &self,
        principal: &Principal,
        issue_id: Uuid,
        patch: IssuePatch,
    ) -> TrackResult<(Issue, Option<ActivityRecord>)> {
        let before = self.require_issue(issue_id).await?;
        self.ensure_can_edit(principal, &before).await?;

        if let Some(title) = patch.title.as_deref() {
            if title.trim().is_empty() {
                return Err(TrackError::Validation {
                    field: "title".into(),
                    reason: "must not be empty".into(),
                });
            }
        }

        let mut after = before.clone();
        let mut changes = ChangeSet::new();

        if let Some(title) = patch.title {
            changes.record_str("Title", &before.title, &title);
            after.title = title;
        }
        if let Some(description) = patch.description {
            changes.record_str("Description", &before.description, &description);
            after.description = description;
        }
        if let Some(assignee) = patch.assignee {
            changes.record_str("Assignee", &before.assignee, &assignee);
            after.assignee = assignee;
        }
        if let Some(reviewer) = patch.reviewer {
            changes.record_str("Reviewer", &before.reviewer, &reviewer);
            after.reviewer = reviewer;
        }
        if let Some(release_number) = patch.release_number {
            changes.record_str("Release Number", &before.release_number, &release_number);
            after.release_number = release_number;
        }
        if let Some(sprint_number) = patch.sprint_number {
            changes.record_str("Sprint Number", &before.sprint_number, &sprint_number);
            after.sprint_number = sprint_number;
        }
        if let Some(start_date) = patch.start_date {
            changes.record_date("Start Date", before.start_date, Some(start_date));
            after.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            changes.record_date("End Date", before.end_date, Some(end_date));
            after.end_date = Some(end_date);
        }

        let mut to_done = false;
        if let Some(status) = patch.status {
            if status != before.status {
                let engine = self.engine.read().await;
                engine
                    .check_transition(self.store.as_ref(), &before, status)
                    .await?;
                to_done = status == Status::Done;
                changes.record_str("Status", before.status.as_str(), status.as_str());
                after.status = status;
            }
        }

        if changes.is_empty() {
            debug!(issue = %before.code, "update was a no-op; nothing written");
            return Ok((before, None));
        }

        after.updated_at = Utc::now();
        let record = changes
            .into_record(
                before.id,
                Some(principal.id),
                ActivityAction::Updated,
                after.updated_at,
            )
            .ok_or_else(|| TrackError::Storage("non-empty diff produced no record".into()))?;

        let stored = self
            .store
            .update_issue_with_activity(&after, before.version, to_done, &record)
            .await?;
        info!(issue = %stored.code, changes = record.change_count, "issue updated");
        Ok((stored, Some(record)))
    }

    /// Status-only endpoint. Requires the change-status capability; a
    /// same-status submission is a valid no-op that writes nothing.
    pub async fn apply_status_change(
        &self,
        principal: &Principal,
        issue_id: Uuid,
        new_status: Status,
    ) -> TrackResult<(Issue, Option<ActivityRecord>)> {
        let before = self.require_issue(issue_id).await?;
        self.evaluate_permission(principal, before.project_id, Capability::ChangeStatus)
            .await?;

        if new_status == before.status {
            return Ok((before, None));
        }

        {
            let engine = self.engine.read().await;
            engine
                .check_transition(self.store.as_ref(), &before, new_status)
                .await?;
        }

        let mut after = before.clone();
        after.status = new_status;
        after.updated_at = Utc::now();

        let mut changes = ChangeSet::new();
        changes.record_str("Status", before.status.as_str(), new_status.as_str());
        let record = changes
            .into_record(
                before.id,
                Some(principal.id),
                ActivityAction::StatusChanged,
                after.updated_at,
            )
            .ok_or_else(|| TrackError::Storage("status diff produced no record".into()))?;

        let stored = self
            .store
            .update_issue_with_activity(
                &after,
                before.version,
                new_status == Status::Done,
                &record,
            )
            .await?;
        info!(issue = %stored.code, from = %before.status, to = %new_status, "status changed");
        Ok((stored, Some(record)))
    }

    /// ADMIN-only delete; cascades to descendants and their activity.
    pub async fn delete_issue(&self, principal: &Principal, issue_id: Uuid) -> TrackResult<u64> {
        let issue = self.require_issue(issue_id).await?;
        self.evaluate_permission(principal, issue.project_id, Capability::DeleteIssue)
            .await?;
        let removed = self.store.delete_issue(issue_id).await?;
        info!(issue = %issue.code, removed, "issue deleted with descendants");
        Ok(removed)
    }

    /// View-gated read.
    pub async fn get_issue(&self, principal: &Principal, issue_id: Uuid) -> TrackResult<Issue> {
        let issue = self.require_issue(issue_id).await?;
        self.evaluate_permission(principal, issue.project_id, Capability::ViewProject)
            .await?;
        Ok(issue)
    }

    /// View-gated project listing, creation order.
    pub async fn list_project_issues(
        &self,
        principal: &Principal,
        project_id: Uuid,
    ) -> TrackResult<Vec<Issue>> {
        self.evaluate_permission(principal, project_id, Capability::ViewProject)
            .await?;
        self.store.list_issues(project_id).await
    }

    /// View-gated audit trail, newest first.
    pub async fn list_activity(
        &self,
        principal: &Principal,
        issue_id: Uuid,
    ) -> TrackResult<Vec<ActivityRecord>> {
        let issue = self.require_issue(issue_id).await?;
        self.evaluate_permission(principal, issue.project_id, Capability::ViewProject)
            .await?;
        self.store.list_activity(issue_id).await
    }

    /// Standalone hierarchy check for the API layer: fetches the
    /// declared parent (at most once) and validates it for `issue_type`.
    pub async fn validate_hierarchy(
        &self,
        project_id: Uuid,
        issue_type: IssueType,
        parent_id: Option<Uuid>,
    ) -> TrackResult<()> {
        let parent = match parent_id {
            Some(id) => self.store.get_issue(id).await?,
            None => None,
        };
        hierarchy::validate_parent(issue_type, project_id, parent_id, parent.as_ref())
    }

    /// Standalone transition check for the API layer: edge validity plus
    /// the parent-done guard for the issue's current children.
    pub async fn validate_transition(&self, issue_id: Uuid, to: Status) -> TrackResult<()> {
        let issue = self.require_issue(issue_id).await?;
        let engine = self.engine.read().await;
        engine
            .check_transition(self.store.as_ref(), &issue, to)
            .await
    }

    async fn require_issue(&self, issue_id: Uuid) -> TrackResult<Issue> {
        self.store
            .get_issue(issue_id)
            .await?
            .ok_or(TrackError::NotFound {
                kind: EntityKind::Issue,
                id: issue_id,
            })
    }

    /// Edit-all roles pass outright; edit-own roles additionally need
    /// ownership. Everything else is denied, ownership notwithstanding.
    async fn ensure_can_edit(&self, principal: &Principal, issue: &Issue) -> TrackResult<()> {
        let role = resolve_role(self.store.as_ref(), principal, issue.project_id).await?;
        let Some(role) = role else {
            return Err(TrackError::PermissionDenied {
                required: Capability::EditAllIssues,
                role: None,
            });
        };
        if Capability::EditAllIssues.allows(role) {
            return Ok(());
        }
        if Capability::EditOwnIssues.allows(role) && is_owner(issue, principal) {
            return Ok(());
        }
        Err(TrackError::PermissionDenied {
            required: Capability::EditAllIssues,
            role: Some(role),
        })
    }

    /// Next code for the project: parse the number out of the most
    /// recent code, fall back to count+1 on a malformed one. Prefix
    /// falls back to the first two letters of the project name.
    async fn next_issue_code(&self, project: &crate::model::Project) -> TrackResult<String> {
        let next = match self.store.latest_issue_code(project.id).await? {
            Some(code) => match parse_code_number(&code) {
                Some(n) => n + 1,
                None => self.store.count_issues(project.id).await? + 1,
            },
            None => 1,
        };
        let prefix = if project.prefix.is_empty() {
            project.name.chars().take(2).collect::<String>().to_uppercase()
        } else {
            project.prefix.clone()
        };
        Ok(format!("{prefix}-{next:04}"))
    }
}

fn parse_code_number(code: &str) -> Option<u64> {
    code.rsplit('-').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_number_parses_trailing_segment() {
        assert_eq!(parse_code_number("TP-0007"), Some(7));
        assert_eq!(parse_code_number("LONG-NAME-0123"), Some(123));
        assert_eq!(parse_code_number("garbled"), None);
        assert_eq!(parse_code_number("TP-"), None);
    }
}
