//! Error taxonomy for the issue-tracking core.
//!
//! Every validator returns a typed error; none are swallowed. The
//! transaction coordinator lets any of these abort the whole unit of work.

use thiserror::Error;
use uuid::Uuid;

use crate::access::Capability;
use crate::model::{IssueType, ProjectRole, Status};

/// Entity kinds referenced by [`TrackError::NotFound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Issue,
    Principal,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityKind::Project => "project",
            EntityKind::Issue => "issue",
            EntityKind::Principal => "principal",
        };
        f.write_str(s)
    }
}

/// Main error type for the tracking core.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The principal holds no role, or a role outside the capability's set.
    /// `role == None` means no membership (and no global-admin override).
    #[error("permission denied: '{required}' requires one of {:?}; actual role: {}",
            .required.allowed_roles(),
            .role.map(|r| r.as_str()).unwrap_or("none (not a project member)"))]
    PermissionDenied {
        required: Capability,
        role: Option<ProjectRole>,
    },

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: Uuid },

    /// Parent/child structure violation at creation time. The reason
    /// carries the case-specific wording.
    #[error("{reason}")]
    InvalidHierarchy { issue_type: IssueType, reason: String },

    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[error("Cannot complete parent issue with open children")]
    ParentHasOpenChildren { issue_id: Uuid },

    #[error("validation failed for '{field}': {reason}")]
    Validation { field: String, reason: String },

    /// The compare-and-swap on the issue version lost a race.
    #[error("issue {issue_id} was modified concurrently; reload and retry")]
    VersionConflict { issue_id: Uuid },

    #[error("storage error: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type TrackResult<T> = Result<T, TrackError>;

#[cfg(feature = "database")]
impl From<sqlx::Error> for TrackError {
    fn from(e: sqlx::Error) -> Self {
        TrackError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message_names_both_statuses() {
        let err = TrackError::InvalidTransition {
            from: Status::Backlog,
            to: Status::Done,
        };
        assert_eq!(err.to_string(), "Invalid transition from backlog to done");
    }

    #[test]
    fn permission_denied_message_for_missing_membership() {
        let err = TrackError::PermissionDenied {
            required: Capability::CreateIssue,
            role: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("create issue"), "{msg}");
        assert!(msg.contains("not a project member"), "{msg}");
    }

    #[test]
    fn parent_guard_message_matches_endpoint_wording() {
        let err = TrackError::ParentHasOpenChildren {
            issue_id: Uuid::new_v4(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot complete parent issue with open children"
        );
    }
}
