//! Persistence seam.
//!
//! The core talks to storage through [`TrackStore`]; the in-memory
//! implementation is always available, the Postgres one sits behind the
//! `database` feature.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::TrackResult;
use crate::model::{
    ActivityRecord, GlobalRole, Issue, Membership, Principal, Project, TransitionEdge,
};

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "database")]
pub use postgres::{DatabaseConfig, PgStore};

/// Storage operations consumed by the core.
///
/// The two `*_with_activity` methods are the transaction boundary: the
/// issue write and its audit record commit together or not at all, and
/// updates are compare-and-swap on the issue `version`.
#[async_trait]
pub trait TrackStore: Send + Sync {
    async fn get_project(&self, id: Uuid) -> TrackResult<Option<Project>>;
    async fn insert_project(&self, project: &Project) -> TrackResult<()>;

    async fn get_issue(&self, id: Uuid) -> TrackResult<Option<Issue>>;
    async fn list_issues(&self, project_id: Uuid) -> TrackResult<Vec<Issue>>;
    /// Direct children only.
    async fn children_of(&self, parent_id: Uuid) -> TrackResult<Vec<Issue>>;
    /// Code of the most recently created issue in the project, if any.
    async fn latest_issue_code(&self, project_id: Uuid) -> TrackResult<Option<String>>;
    async fn count_issues(&self, project_id: Uuid) -> TrackResult<u64>;

    /// Insert an issue and its CREATED activity record atomically.
    async fn insert_issue_with_activity(
        &self,
        issue: &Issue,
        activity: &ActivityRecord,
    ) -> TrackResult<()>;

    /// Apply an update and append its activity record atomically.
    ///
    /// Fails with `VersionConflict` when the stored version differs from
    /// `expected_version`. With `enforce_children_done` set, the store
    /// re-verifies inside the same atomic unit that every direct child is
    /// `done`, closing the guard's read-then-write window. Returns the
    /// stored issue with its bumped version.
    async fn update_issue_with_activity(
        &self,
        issue: &Issue,
        expected_version: i64,
        enforce_children_done: bool,
        activity: &ActivityRecord,
    ) -> TrackResult<Issue>;

    /// Delete an issue, its descendants, and all their activity records.
    /// Returns the number of issues removed.
    async fn delete_issue(&self, id: Uuid) -> TrackResult<u64>;

    async fn get_membership(
        &self,
        user_id: Uuid,
        project_id: Uuid,
    ) -> TrackResult<Option<Membership>>;
    /// At most one membership per (user, project): replace, never append.
    async fn upsert_membership(&self, membership: &Membership) -> TrackResult<()>;

    async fn get_principal(&self, id: Uuid) -> TrackResult<Option<Principal>>;
    async fn find_principal_by_email(&self, email: &str) -> TrackResult<Option<Principal>>;
    async fn insert_principal(&self, principal: &Principal) -> TrackResult<()>;
    async fn set_global_role(&self, principal_id: Uuid, role: GlobalRole) -> TrackResult<()>;

    async fn transition_edges(&self) -> TrackResult<Vec<TransitionEdge>>;
    async fn upsert_transition_edge(&self, edge: &TransitionEdge) -> TrackResult<()>;

    /// Activity for an issue, newest first.
    async fn list_activity(&self, issue_id: Uuid) -> TrackResult<Vec<ActivityRecord>>;
}
