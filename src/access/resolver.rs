//! Role resolution.
//!
//! Maps (principal, project) to an effective project role. Global ADMIN
//! pre-empts unconditionally and is never stored as a membership row.

use uuid::Uuid;

use crate::error::TrackResult;
use crate::model::{GlobalRole, Principal, ProjectRole};
use crate::store::TrackStore;

/// Resolve the effective role of `principal` on `project_id`.
///
/// Returns `None` when the principal is neither a global admin nor a
/// member of the project; callers deny all project-scoped capabilities
/// in that case. Read-only, no side effects.
pub async fn resolve_role<S: TrackStore + ?Sized>(
    store: &S,
    principal: &Principal,
    project_id: Uuid,
) -> TrackResult<Option<ProjectRole>> {
    if principal.global_role == GlobalRole::Admin {
        return Ok(Some(ProjectRole::Admin));
    }
    let membership = store.get_membership(principal.id, project_id).await?;
    Ok(membership.map(|m| m.role))
}
