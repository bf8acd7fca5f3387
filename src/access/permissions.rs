//! Capability evaluation.
//!
//! A fixed table maps each capability to the set of roles that hold it.
//! Evaluation is a pure function; absence of a role is always denied
//! before the table is ever consulted.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::{Issue, Principal, ProjectRole};

/// Project-scoped capabilities gated by the role table.
///
/// `DeleteIssue` is the lifecycle rule "deleted by ADMIN-only action"
/// expressed through the same table as everything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewProject,
    CreateIssue,
    ManageMembers,
    ChangeStatus,
    EditAllIssues,
    EditOwnIssues,
    DeleteIssue,
}

impl Capability {
    /// The roles holding this capability. Keyed by variant; an
    /// unrecognized role string never reaches this table.
    pub fn allowed_roles(&self) -> &'static [ProjectRole] {
        use ProjectRole::*;
        match self {
            Capability::ViewProject => &[Admin, ScrumMaster, Developer, Tester, Viewer],
            Capability::CreateIssue => &[Admin, ScrumMaster, Developer, Tester],
            Capability::ManageMembers => &[Admin, ScrumMaster],
            Capability::ChangeStatus => &[Admin, ScrumMaster, Developer, Tester],
            Capability::EditAllIssues => &[Admin, ScrumMaster],
            Capability::EditOwnIssues => &[Developer],
            Capability::DeleteIssue => &[Admin],
        }
    }

    /// Pure allow/deny lookup, no I/O.
    pub fn allows(&self, role: ProjectRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Capability::ViewProject => "view project",
            Capability::CreateIssue => "create issue",
            Capability::ManageMembers => "manage members",
            Capability::ChangeStatus => "change status",
            Capability::EditAllIssues => "edit all issues",
            Capability::EditOwnIssues => "edit own issues",
            Capability::DeleteIssue => "delete issue",
        };
        f.write_str(s)
    }
}

/// Ownership test backing `EditOwnIssues`.
///
/// The assignee match is name-based, not identity-based: a principal whose
/// display name happens to equal the free-text assignee field counts as
/// owner. Kept for compatibility with the existing data; assignment by
/// stable identity would need a data migration first.
pub fn is_owner(issue: &Issue, principal: &Principal) -> bool {
    issue.created_by == principal.id || issue.assignee == principal.name
}
