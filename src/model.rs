//! Domain types for the issue-tracking core.
//!
//! Role, issue-type and status enums are closed variants with explicit
//! string renderings; an unrecognized string never silently maps to a
//! variant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Process-wide role. `Admin` pre-empts every per-project role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalRole {
    Admin,
    User,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Admin => "ADMIN",
            GlobalRole::User => "USER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(GlobalRole::Admin),
            "USER" => Some(GlobalRole::User),
            _ => None,
        }
    }
}

impl fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-project role, scoped to one (user, project) membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    Admin,
    ScrumMaster,
    Developer,
    Tester,
    Viewer,
}

impl ProjectRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectRole::Admin => "ADMIN",
            ProjectRole::ScrumMaster => "SCRUM_MASTER",
            ProjectRole::Developer => "DEVELOPER",
            ProjectRole::Tester => "TESTER",
            ProjectRole::Viewer => "VIEWER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(ProjectRole::Admin),
            "SCRUM_MASTER" => Some(ProjectRole::ScrumMaster),
            "DEVELOPER" => Some(ProjectRole::Developer),
            "TESTER" => Some(ProjectRole::Tester),
            "VIEWER" => Some(ProjectRole::Viewer),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Issue type. Each type constrains its allowed parent type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Epic,
    Story,
    Task,
    Subtask,
    Bug,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::Epic => "epic",
            IssueType::Story => "story",
            IssueType::Task => "task",
            IssueType::Subtask => "subtask",
            IssueType::Bug => "bug",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "epic" => Some(IssueType::Epic),
            "story" => Some(IssueType::Story),
            "task" => Some(IssueType::Task),
            "subtask" => Some(IssueType::Subtask),
            "bug" => Some(IssueType::Bug),
            _ => None,
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Workflow status. `done` is ordinary except for the parent-done guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Backlog,
    Todo,
    InProgress,
    Testing,
    Done,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Backlog,
        Status::Todo,
        Status::InProgress,
        Status::Testing,
        Status::Done,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Backlog => "backlog",
            Status::Todo => "todo",
            Status::InProgress => "in_progress",
            Status::Testing => "testing",
            Status::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "backlog" => Some(Status::Backlog),
            "todo" => Some(Status::Todo),
            "in_progress" => Some(Status::InProgress),
            "testing" => Some(Status::Testing),
            "done" => Some(Status::Done),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated actor. Credential handling lives in the identity
/// collaborator; the core only ever sees the resolved principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub global_role: GlobalRole,
}

/// A project, consumed at the interface level for existence checks and
/// issue-code generation. Project CRUD is a collaborator concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// Short code prefix for generated issue codes, e.g. "BA" in BA-0001.
    pub prefix: String,
    pub created_at: DateTime<Utc>,
}

/// One (user, project) membership row. At most one per pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role: ProjectRole,
}

/// A tracked issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    pub project_id: Uuid,
    /// Generated per-project code, e.g. "TP-0001".
    pub code: String,
    pub issue_type: IssueType,
    pub parent_issue_id: Option<Uuid>,
    pub status: Status,
    pub title: String,
    pub description: String,
    /// Free-text assignee name. Ownership matching against this field is
    /// name-based, not identity-based.
    pub assignee: String,
    pub reviewer: String,
    pub release_number: String,
    pub sprint_number: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter; bumped by every successful mutation.
    pub version: i64,
}

/// Input for issue creation. The code, id, timestamps and version are
/// assigned by the creation pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIssue {
    pub project_id: Uuid,
    pub issue_type: IssueType,
    #[serde(default)]
    pub parent_issue_id: Option<Uuid>,
    pub status: Status,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: String,
    #[serde(default)]
    pub reviewer: String,
    #[serde(default)]
    pub release_number: String,
    #[serde(default)]
    pub sprint_number: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Partial update for the multi-field update endpoint. `None` means
/// "leave unchanged"; fields cannot be cleared through this path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssuePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub reviewer: Option<String>,
    pub release_number: Option<String>,
    pub sprint_number: Option<String>,
    pub status: Option<Status>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// One allowed (from, to) pair in the workflow graph. Rows are data and
/// can be reseeded without recompiling validation logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEdge {
    pub from_status: Status,
    pub to_status: Status,
    pub is_active: bool,
}

/// Audit action recorded with each aggregated activity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    Created,
    Updated,
    StatusChanged,
}

impl ActivityAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityAction::Created => "CREATED",
            ActivityAction::Updated => "UPDATED",
            ActivityAction::StatusChanged => "STATUS_CHANGED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CREATED" => Some(ActivityAction::Created),
            "UPDATED" => Some(ActivityAction::Updated),
            "STATUS_CHANGED" => Some(ActivityAction::StatusChanged),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One aggregated audit entry per successful save. Append-only; removed
/// only when the owning issue is cascade-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub actor_id: Option<Uuid>,
    pub action: ActivityAction,
    /// Rendered diff lines, one per changed field, joined with '\n'.
    pub details: String,
    pub change_count: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in Status::ALL {
            assert_eq!(Status::parse(status.as_str()), Some(status));
        }
        assert_eq!(Status::parse("nonsense"), None);
    }

    #[test]
    fn role_parse_rejects_unknown() {
        assert_eq!(ProjectRole::parse("SCRUM_MASTER"), Some(ProjectRole::ScrumMaster));
        assert_eq!(ProjectRole::parse("scrum_master"), None);
        assert_eq!(GlobalRole::parse("ROOT"), None);
    }

    #[test]
    fn issue_type_serde_uses_snake_case() {
        let json = serde_json::to_string(&IssueType::Subtask).unwrap();
        assert_eq!(json, "\"subtask\"");
        let back: IssueType = serde_json::from_str("\"in_progress\"").unwrap_or(IssueType::Bug);
        // "in_progress" is not an issue type; deserialization must fail.
        assert_eq!(back, IssueType::Bug);
    }

    #[test]
    fn activity_action_rendering() {
        assert_eq!(ActivityAction::StatusChanged.to_string(), "STATUS_CHANGED");
        assert_eq!(ActivityAction::parse("UPDATED"), Some(ActivityAction::Updated));
    }
}
