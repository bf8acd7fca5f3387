//! In-memory store.
//!
//! Backs tests and short-lived deployments. One `RwLock` over all tables
//! makes every trait method atomic; the compound mutation methods do
//! their version check and guard re-check inside a single write lock, so
//! the discipline matches the Postgres implementation's row locking.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{EntityKind, TrackError, TrackResult};
use crate::model::{
    ActivityRecord, GlobalRole, Issue, Membership, Principal, Project, Status, TransitionEdge,
};

use super::TrackStore;

#[derive(Default)]
struct Inner {
    projects: HashMap<Uuid, Project>,
    issues: HashMap<Uuid, Issue>,
    /// Creation order, for "latest issue" queries.
    issue_order: Vec<Uuid>,
    memberships: HashMap<(Uuid, Uuid), Membership>,
    principals: HashMap<Uuid, Principal>,
    edges: HashMap<(Status, Status), bool>,
    activity: Vec<ActivityRecord>,
}

/// Thread-safe in-memory implementation of [`TrackStore`].
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn collect_descendants(inner: &Inner, root: Uuid) -> Vec<Uuid> {
    let mut out = vec![root];
    let mut cursor = 0;
    while cursor < out.len() {
        let current = out[cursor];
        cursor += 1;
        for issue in inner.issues.values() {
            if issue.parent_issue_id == Some(current) {
                out.push(issue.id);
            }
        }
    }
    out
}

#[async_trait]
impl TrackStore for MemoryStore {
    async fn get_project(&self, id: Uuid) -> TrackResult<Option<Project>> {
        Ok(self.inner.read().await.projects.get(&id).cloned())
    }

    async fn insert_project(&self, project: &Project) -> TrackResult<()> {
        self.inner
            .write()
            .await
            .projects
            .insert(project.id, project.clone());
        Ok(())
    }

    async fn get_issue(&self, id: Uuid) -> TrackResult<Option<Issue>> {
        Ok(self.inner.read().await.issues.get(&id).cloned())
    }

    async fn list_issues(&self, project_id: Uuid) -> TrackResult<Vec<Issue>> {
        let inner = self.inner.read().await;
        Ok(inner
            .issue_order
            .iter()
            .filter_map(|id| inner.issues.get(id))
            .filter(|i| i.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn children_of(&self, parent_id: Uuid) -> TrackResult<Vec<Issue>> {
        let inner = self.inner.read().await;
        Ok(inner
            .issues
            .values()
            .filter(|i| i.parent_issue_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn latest_issue_code(&self, project_id: Uuid) -> TrackResult<Option<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .issue_order
            .iter()
            .rev()
            .filter_map(|id| inner.issues.get(id))
            .find(|i| i.project_id == project_id)
            .map(|i| i.code.clone()))
    }

    async fn count_issues(&self, project_id: Uuid) -> TrackResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner
            .issues
            .values()
            .filter(|i| i.project_id == project_id)
            .count() as u64)
    }

    async fn insert_issue_with_activity(
        &self,
        issue: &Issue,
        activity: &ActivityRecord,
    ) -> TrackResult<()> {
        let mut inner = self.inner.write().await;
        inner.issues.insert(issue.id, issue.clone());
        inner.issue_order.push(issue.id);
        inner.activity.push(activity.clone());
        Ok(())
    }

    async fn update_issue_with_activity(
        &self,
        issue: &Issue,
        expected_version: i64,
        enforce_children_done: bool,
        activity: &ActivityRecord,
    ) -> TrackResult<Issue> {
        let mut inner = self.inner.write().await;

        let current = inner
            .issues
            .get(&issue.id)
            .ok_or(TrackError::NotFound {
                kind: EntityKind::Issue,
                id: issue.id,
            })?
            .clone();
        if current.version != expected_version {
            return Err(TrackError::VersionConflict { issue_id: issue.id });
        }
        if enforce_children_done {
            let open = inner
                .issues
                .values()
                .any(|i| i.parent_issue_id == Some(issue.id) && i.status != Status::Done);
            if open {
                return Err(TrackError::ParentHasOpenChildren { issue_id: issue.id });
            }
        }

        let mut stored = issue.clone();
        stored.version = expected_version + 1;
        inner.issues.insert(stored.id, stored.clone());
        inner.activity.push(activity.clone());
        Ok(stored)
    }

    async fn delete_issue(&self, id: Uuid) -> TrackResult<u64> {
        let mut inner = self.inner.write().await;
        if !inner.issues.contains_key(&id) {
            return Ok(0);
        }
        let doomed = collect_descendants(&inner, id);
        for issue_id in &doomed {
            inner.issues.remove(issue_id);
        }
        inner.issue_order.retain(|i| !doomed.contains(i));
        inner.activity.retain(|a| !doomed.contains(&a.issue_id));
        Ok(doomed.len() as u64)
    }

    async fn get_membership(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> TrackResult<Option<Membership>> {
        Ok(self
            .inner
            .read()
            .await
            .memberships
            .get(&(user_id, project_id))
            .cloned())
    }

    async fn upsert_membership(&self, membership: &Membership) -> TrackResult<()> {
        self.inner.write().await.memberships.insert(
            (membership.user_id, membership.project_id),
            membership.clone(),
        );
        Ok(())
    }

    async fn get_principal(&self, id: Uuid) -> TrackResult<Option<Principal>> {
        Ok(self.inner.read().await.principals.get(&id).cloned())
    }

    async fn find_principal_by_email(&self, email: &str) -> TrackResult<Option<Principal>> {
        let inner = self.inner.read().await;
        Ok(inner
            .principals
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn insert_principal(&self, principal: &Principal) -> TrackResult<()> {
        self.inner
            .write()
            .await
            .principals
            .insert(principal.id, principal.clone());
        Ok(())
    }

    async fn set_global_role(&self, principal_id: Uuid, role: GlobalRole) -> TrackResult<()> {
        let mut inner = self.inner.write().await;
        let principal = inner
            .principals
            .get_mut(&principal_id)
            .ok_or(TrackError::NotFound {
                kind: EntityKind::Principal,
                id: principal_id,
            })?;
        principal.global_role = role;
        Ok(())
    }

    async fn transition_edges(&self) -> TrackResult<Vec<TransitionEdge>> {
        let inner = self.inner.read().await;
        Ok(inner
            .edges
            .iter()
            .map(|(&(from_status, to_status), &is_active)| TransitionEdge {
                from_status,
                to_status,
                is_active,
            })
            .collect())
    }

    async fn upsert_transition_edge(&self, edge: &TransitionEdge) -> TrackResult<()> {
        self.inner
            .write()
            .await
            .edges
            .insert((edge.from_status, edge.to_status), edge.is_active);
        Ok(())
    }

    async fn list_activity(&self, issue_id: Uuid) -> TrackResult<Vec<ActivityRecord>> {
        let inner = self.inner.read().await;
        // Appended in order; newest first for callers.
        Ok(inner
            .activity
            .iter()
            .filter(|a| a.issue_id == issue_id)
            .rev()
            .cloned()
            .collect())
    }
}
